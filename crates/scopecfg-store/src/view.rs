//! Config views: short-lived handles over the namespaces of one request.
//!
//! A [`ConfigView`] is resolved from a [`ConfigStore`] for an optional
//! connection. It borrows the store and holds weak references to the host
//! and connection namespaces, so it never keeps a namespace alive on its
//! own. Every get/set picks its namespace from the key's scope tag.

use std::sync::{Arc, Weak};

use scopecfg_types::{ConnectionId, HostId, KeyDescriptor, ScopeTag};
use tracing::trace;

use crate::error::{ConfigError, Result};
use crate::namespace::Namespace;
use crate::store::ConfigStore;
use crate::traits::ConfigAccess;
use crate::value::{Stored, Value, ValueKind, ValueSource};

/// The host and connection a view was resolved for.
pub(crate) struct ResolvedTarget<'v> {
    pub(crate) host_id: HostId,
    pub(crate) connection_id: ConnectionId,
    pub(crate) host: Weak<Namespace<'v>>,
    pub(crate) connection: Weak<Namespace<'v>>,
}

/// Per-request access to the context namespace and, when resolved for a
/// connection, that connection's host and connection namespaces.
pub struct ConfigView<'s, 'v> {
    store: &'s ConfigStore<'v>,
    target: Option<ResolvedTarget<'v>>,
}

impl<'s, 'v> ConfigView<'s, 'v> {
    pub(crate) fn new(store: &'s ConfigStore<'v>, target: Option<ResolvedTarget<'v>>) -> Self {
        Self { store, target }
    }

    /// Returns `true` if the view was resolved for a connection.
    pub fn has_connection(&self) -> bool {
        self.target.is_some()
    }

    /// The host this view was resolved for.
    pub fn host_id(&self) -> Option<&HostId> {
        self.target.as_ref().map(|t| &t.host_id)
    }

    /// The connection this view was resolved for.
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.target.as_ref().map(|t| t.connection_id)
    }

    /// The namespace this view uses for `scope`.
    ///
    /// Returns `Ok(None)` if the view has no namespace for that scope, and
    /// [`ConfigError::NamespaceEvicted`] if it had one that has since been
    /// evicted.
    pub fn namespace(&self, scope: ScopeTag) -> Result<Option<Arc<Namespace<'v>>>> {
        let weak = match (scope, &self.target) {
            (ScopeTag::Context, _) => return Ok(Some(Arc::clone(self.store.context()))),
            (_, None) => return Ok(None),
            (ScopeTag::PerHost, Some(target)) => &target.host,
            (ScopeTag::PerConnection, Some(target)) => &target.connection,
        };
        weak.upgrade()
            .map(Some)
            .ok_or(ConfigError::NamespaceEvicted { scope })
    }

    /// Pick the namespace `key` routes to.
    fn route(&self, key: KeyDescriptor) -> Result<Arc<Namespace<'v>>> {
        if !self.store.registry().contains(key) {
            return Err(ConfigError::UnknownKey { key });
        }
        let scope = key.scope();
        self.namespace(scope)?
            .ok_or(ConfigError::InvalidScope { key, scope })
    }

    fn put(&self, namespace: &Namespace<'v>, key: KeyDescriptor, value: Value<'v>) -> Result<()> {
        let kind = value.kind();
        namespace.insert(key, value)?;
        trace!(key = %key, scope = %key.scope(), %kind, "config value set");
        Ok(())
    }
}

impl<'v> ConfigAccess<'v> for ConfigView<'_, 'v> {
    fn set_string(&self, key: KeyDescriptor, value: ValueSource<'_, 'v, str>) -> Result<()> {
        // Route first so a rejected write never copies.
        let namespace = self.route(key)?;
        self.put(&namespace, key, Value::String(value.into_stored()?))
    }

    fn get_string(&self, key: KeyDescriptor) -> Result<Option<Stored<'v, str>>> {
        match self.route(key)?.get(key)? {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(ConfigError::TypeMismatch {
                key,
                expected: ValueKind::String,
                found: other.kind(),
            }),
        }
    }

    fn set_object(&self, key: KeyDescriptor, value: ValueSource<'_, 'v, [u8]>) -> Result<()> {
        let namespace = self.route(key)?;
        self.put(&namespace, key, Value::Object(value.into_stored()?))
    }

    fn get_object(&self, key: KeyDescriptor) -> Result<Option<Stored<'v, [u8]>>> {
        match self.route(key)?.get(key)? {
            None => Ok(None),
            Some(Value::Object(b)) => Ok(Some(b)),
            Some(other) => Err(ConfigError::TypeMismatch {
                key,
                expected: ValueKind::Object,
                found: other.kind(),
            }),
        }
    }

    fn remove(&self, key: KeyDescriptor) -> Result<bool> {
        let removed = self.route(key)?.remove(key)?.is_some();
        if removed {
            trace!(key = %key, scope = %key.scope(), "config value removed");
        }
        Ok(removed)
    }

    fn contains(&self, key: KeyDescriptor) -> Result<bool> {
        self.route(key)?.contains(key)
    }
}

impl std::fmt::Debug for ConfigView<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigView")
            .field("host", &self.host_id())
            .field("connection", &self.connection_id())
            .finish()
    }
}
