//! Connection identities and the handle trait the store resolves against.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::host::HostId;

/// Unique identifier for a connection (UUID v7, time-ordered).
///
/// Allocated when a connection is created and stable for its whole
/// lifetime. It never derives from an address, so a closed connection's id
/// cannot alias a newer one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Allocate a fresh connection id.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Leading 8 hex digits, enough to tell connections apart in logs.
    pub fn short_id(&self) -> String {
        let mut hex = self.0.simple().to_string();
        hex.truncate(8);
        hex
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionId({})", self.short_id())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the config store needs to know about a caller's connection.
///
/// Connection types of the client library implement this so the store can
/// find the host and connection namespaces that belong to them. Both values
/// must stay the same for the connection's whole lifetime.
pub trait ConnectionHandle {
    /// The connection's unique id.
    fn connection_id(&self) -> ConnectionId;

    /// The canonical identity of the host the connection targets.
    fn host_id(&self) -> &HostId;
}

/// A plain connection record: an id plus its target host.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionInfo {
    id: ConnectionId,
    host: HostId,
}

impl ConnectionInfo {
    /// A new connection to `host` with a freshly allocated id.
    pub fn new(host: HostId) -> Self {
        Self {
            id: ConnectionId::new(),
            host,
        }
    }

    /// A new connection to the host named by `url`.
    pub fn parse(url: &str) -> Result<Self> {
        Ok(Self::new(HostId::parse(url)?))
    }

    /// Rebuild a record for an existing connection id.
    pub fn with_id(id: ConnectionId, host: HostId) -> Self {
        Self { id, host }
    }
}

impl ConnectionHandle for ConnectionInfo {
    fn connection_id(&self) -> ConnectionId {
        self.id
    }

    fn host_id(&self) -> &HostId {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn same_host_different_connections() {
        let a = ConnectionInfo::parse("http://x:80").unwrap();
        let b = ConnectionInfo::parse("http://x").unwrap();
        assert_eq!(a.host_id(), b.host_id());
        assert_ne!(a.connection_id(), b.connection_id());
    }

    #[test]
    fn with_id_preserves_identity() {
        let original = ConnectionInfo::parse("https://svc.local").unwrap();
        let rebuilt = ConnectionInfo::with_id(original.connection_id(), original.host_id().clone());
        assert_eq!(original, rebuilt);
    }

    #[test]
    fn short_id_length() {
        assert_eq!(ConnectionId::new().short_id().len(), 8);
    }

    #[test]
    fn short_id_prefixes_full_id() {
        let id = ConnectionId::new();
        assert!(id.to_string().starts_with(&id.short_id()));
        assert_eq!(format!("{id:?}"), format!("ConnectionId({})", id.short_id()));
    }
}
