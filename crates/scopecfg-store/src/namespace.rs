//! Namespaces: the settings of one scope instance.
//!
//! A [`Namespace`] maps key descriptors to values for exactly one scope
//! instance: the session, one host, or one connection. Namespaces are owned
//! by the [`crate::ConfigStore`]; views only hold weak references to them.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use scopecfg_types::{ConnectionId, HostId, KeyDescriptor, ScopeTag};

use crate::error::{ConfigError, Result};
use crate::value::Value;

/// Which scope instance a namespace belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NamespaceOwner {
    /// The store's single session-wide namespace.
    Context,
    /// The namespace shared by every connection to one host.
    Host(HostId),
    /// The namespace of a single connection.
    Connection(ConnectionId),
}

impl NamespaceOwner {
    /// The scope of keys this namespace accepts.
    pub fn scope(&self) -> ScopeTag {
        match self {
            NamespaceOwner::Context => ScopeTag::Context,
            NamespaceOwner::Host(_) => ScopeTag::PerHost,
            NamespaceOwner::Connection(_) => ScopeTag::PerConnection,
        }
    }
}

impl fmt::Display for NamespaceOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceOwner::Context => f.write_str("context"),
            NamespaceOwner::Host(host) => write!(f, "host {host}"),
            NamespaceOwner::Connection(id) => write!(f, "connection {}", id.short_id()),
        }
    }
}

/// The settings of one scope instance.
pub struct Namespace<'v> {
    owner: NamespaceOwner,
    entries: RwLock<HashMap<KeyDescriptor, Value<'v>>>,
}

impl<'v> Namespace<'v> {
    pub(crate) fn new(owner: NamespaceOwner) -> Self {
        Self {
            owner,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn owner(&self) -> &NamespaceOwner {
        &self.owner
    }

    pub fn scope(&self) -> ScopeTag {
        self.owner.scope()
    }

    /// Number of entries currently set.
    pub fn len(&self) -> Result<usize> {
        Ok(self.entries.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.entries.read()?.is_empty())
    }

    /// Returns `true` if `key` has an entry here.
    pub fn contains(&self, key: KeyDescriptor) -> Result<bool> {
        Ok(self.entries.read()?.contains_key(&key))
    }

    /// The keys that currently have entries, sorted.
    pub fn keys(&self) -> Result<Vec<KeyDescriptor>> {
        let entries = self.entries.read()?;
        let mut keys: Vec<KeyDescriptor> = entries.keys().copied().collect();
        keys.sort();
        Ok(keys)
    }

    pub(crate) fn get(&self, key: KeyDescriptor) -> Result<Option<Value<'v>>> {
        Ok(self.entries.read()?.get(&key).cloned())
    }

    /// Insert or overwrite the entry for `key`, returning the previous value.
    pub(crate) fn insert(&self, key: KeyDescriptor, value: Value<'v>) -> Result<Option<Value<'v>>> {
        debug_assert_eq!(key.scope(), self.scope(), "key routed to wrong namespace");
        let mut entries = self.entries.write()?;
        entries
            .try_reserve(1)
            .map_err(|e| ConfigError::allocation(format!("growing {} namespace", self.owner), e))?;
        Ok(entries.insert(key, value))
    }

    /// Remove the entry for `key`, returning it if it existed.
    pub(crate) fn remove(&self, key: KeyDescriptor) -> Result<Option<Value<'v>>> {
        Ok(self.entries.write()?.remove(&key))
    }
}

impl fmt::Debug for Namespace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.entries.read().map(|e| e.len()).unwrap_or(0);
        f.debug_struct("Namespace")
            .field("owner", &self.owner)
            .field("entry_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Stored;
    use scopecfg_types::keys::{HOST_NAME, HOST_PORT};

    fn host_ns() -> Namespace<'static> {
        Namespace::new(NamespaceOwner::Host(HostId::parse("http://x:80").unwrap()))
    }

    #[test]
    fn owner_determines_scope() {
        assert_eq!(Namespace::new(NamespaceOwner::Context).scope(), ScopeTag::Context);
        assert_eq!(host_ns().scope(), ScopeTag::PerHost);
        let conn = Namespace::new(NamespaceOwner::Connection(ConnectionId::new()));
        assert_eq!(conn.scope(), ScopeTag::PerConnection);
    }

    #[test]
    fn insert_get_remove() {
        let ns = host_ns();
        assert!(ns.is_empty().unwrap());

        let prev = ns.insert(HOST_NAME, Value::String(Stored::Borrowed("x"))).unwrap();
        assert!(prev.is_none());
        assert_eq!(ns.len().unwrap(), 1);
        assert_eq!(ns.get(HOST_NAME).unwrap(), Some(Value::String(Stored::Borrowed("x"))));

        let removed = ns.remove(HOST_NAME).unwrap();
        assert!(removed.is_some());
        assert!(ns.get(HOST_NAME).unwrap().is_none());
        assert!(ns.remove(HOST_NAME).unwrap().is_none());
    }

    #[test]
    fn overwrite_returns_previous_value() {
        let ns = host_ns();
        ns.insert(HOST_PORT, Value::String(Stored::Borrowed("80"))).unwrap();
        let prev = ns.insert(HOST_PORT, Value::String(Stored::Borrowed("8080"))).unwrap();
        assert_eq!(prev, Some(Value::String(Stored::Borrowed("80"))));
        assert_eq!(ns.len().unwrap(), 1);
    }

    #[test]
    fn keys_are_sorted() {
        let ns = host_ns();
        ns.insert(HOST_PORT, Value::String(Stored::Borrowed("1"))).unwrap();
        ns.insert(HOST_NAME, Value::String(Stored::Borrowed("h"))).unwrap();
        assert_eq!(ns.keys().unwrap(), vec![HOST_NAME, HOST_PORT]);
        assert!(ns.contains(HOST_NAME).unwrap());
    }

    #[test]
    fn owner_display() {
        let ns = host_ns();
        assert_eq!(ns.owner().to_string(), "host http://x:80");
        assert_eq!(NamespaceOwner::Context.to_string(), "context");
    }
}
