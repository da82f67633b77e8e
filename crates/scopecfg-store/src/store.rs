//! The config store: owner of every namespace of a session.
//!
//! [`ConfigStore`] holds the context namespace plus two indices, host
//! identity → namespace and connection identity → namespace. Host and
//! connection namespaces are created lazily by [`ConfigStore::resolve_view`]
//! and released by the eviction calls. The store is the only owner of its
//! namespaces: views hold weak references, so an evicted namespace is freed
//! immediately even if stale views still exist.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use scopecfg_types::{ConnectionHandle, ConnectionId, HostId, KeyRegistry};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{ConfigError, Result};
use crate::namespace::{Namespace, NamespaceOwner};
use crate::view::{ConfigView, ResolvedTarget};

/// The scoped configuration of one client session.
///
/// `'v` is the lifetime of caller data stored by reference
/// ([`crate::ValueSource::Borrow`]); such data must outlive the store.
pub struct ConfigStore<'v> {
    registry: Arc<KeyRegistry>,
    config: StoreConfig,
    context: Arc<Namespace<'v>>,
    inner: RwLock<StoreState<'v>>,
}

#[derive(Default)]
struct StoreState<'v> {
    hosts: HashMap<HostId, HostEntry<'v>>,
    connections: HashMap<ConnectionId, ConnectionEntry<'v>>,
}

struct HostEntry<'v> {
    namespace: Arc<Namespace<'v>>,
    /// Connections resolved through this host and not yet evicted.
    live: HashSet<ConnectionId>,
}

struct ConnectionEntry<'v> {
    namespace: Arc<Namespace<'v>>,
    host: HostId,
}

/// Namespaces resolved for one connection.
struct Resolved<'v> {
    host_id: HostId,
    host: Arc<Namespace<'v>>,
    connection: Arc<Namespace<'v>>,
}

impl<'v> ConfigStore<'v> {
    /// Create the store for a session, with its context namespace.
    ///
    /// Index capacity from `config` is reserved up front; failure to reserve
    /// it is reported as [`ConfigError::AllocationFailure`].
    pub fn initialize(registry: Arc<KeyRegistry>, config: StoreConfig) -> Result<Self> {
        let mut state = StoreState::default();
        state
            .hosts
            .try_reserve(config.initial_host_capacity)
            .map_err(|e| ConfigError::allocation("reserving the host index", e))?;
        state
            .connections
            .try_reserve(config.initial_connection_capacity)
            .map_err(|e| ConfigError::allocation("reserving the connection index", e))?;

        info!(
            keys = registry.len(),
            host_capacity = config.initial_host_capacity,
            connection_capacity = config.initial_connection_capacity,
            evict_idle_hosts = config.evict_idle_hosts,
            "config store initialized"
        );

        Ok(Self {
            registry,
            config,
            context: Arc::new(Namespace::new(NamespaceOwner::Context)),
            inner: RwLock::new(state),
        })
    }

    /// A store over `registry` with default configuration.
    pub fn new(registry: Arc<KeyRegistry>) -> Result<Self> {
        Self::initialize(registry, StoreConfig::default())
    }

    /// A store over the well-known keys with default configuration.
    pub fn standard() -> Result<Self> {
        Self::new(Arc::new(KeyRegistry::standard()))
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The session-wide namespace.
    pub fn context_namespace(&self) -> &Namespace<'v> {
        &self.context
    }

    pub(crate) fn context(&self) -> &Arc<Namespace<'v>> {
        &self.context
    }

    /// Resolve a view for `connection`, or a context-only view for `None`.
    ///
    /// For a connection, the host namespace of its [`HostId`] and its own
    /// connection namespace are looked up and created empty if missing.
    /// Existing namespaces are never modified.
    pub fn resolve_view(
        &self,
        connection: Option<&dyn ConnectionHandle>,
    ) -> Result<ConfigView<'_, 'v>> {
        let Some(connection) = connection else {
            return Ok(self.context_view());
        };

        let connection_id = connection.connection_id();
        let resolved = self
            .inner
            .write()?
            .resolve(connection_id, connection.host_id())?;

        Ok(ConfigView::new(
            self,
            Some(ResolvedTarget {
                host_id: resolved.host_id,
                connection_id,
                host: Arc::downgrade(&resolved.host),
                connection: Arc::downgrade(&resolved.connection),
            }),
        ))
    }

    /// A view that reaches context-scoped keys only.
    pub fn context_view(&self) -> ConfigView<'_, 'v> {
        ConfigView::new(self, None)
    }

    /// Resolve a view for a connection.
    pub fn view_for(&self, connection: &dyn ConnectionHandle) -> Result<ConfigView<'_, 'v>> {
        self.resolve_view(Some(connection))
    }

    /// Release the namespace of a closed connection.
    ///
    /// Returns `Ok(true)` if the connection had a namespace. When the store
    /// is configured with `evict_idle_hosts` and this was the last live
    /// connection to its host, the host namespace is released too.
    pub fn evict_connection(&self, connection: &dyn ConnectionHandle) -> Result<bool> {
        self.evict_connection_id(connection.connection_id())
    }

    /// [`ConfigStore::evict_connection`] by id.
    pub fn evict_connection_id(&self, id: ConnectionId) -> Result<bool> {
        let mut state = self.inner.write()?;
        let Some(entry) = state.connections.remove(&id) else {
            return Ok(false);
        };

        let mut host_evicted = false;
        if let Some(host) = state.hosts.get_mut(&entry.host) {
            host.live.remove(&id);
            if self.config.evict_idle_hosts && host.live.is_empty() {
                state.hosts.remove(&entry.host);
                host_evicted = true;
            }
        }

        debug!(
            connection = %id,
            host = %entry.host,
            entries = entry.namespace.len().unwrap_or(0),
            host_evicted,
            "connection namespace evicted"
        );
        Ok(true)
    }

    /// Release the namespace of a host no connection refers to any more.
    ///
    /// Returns `Ok(false)` if the host has no namespace, and
    /// [`ConfigError::HostInUse`] while connections to it are still live.
    pub fn evict_host(&self, host: &HostId) -> Result<bool> {
        let mut state = self.inner.write()?;
        let live = match state.hosts.get(host) {
            None => return Ok(false),
            Some(entry) => entry.live.len(),
        };
        if live > 0 {
            return Err(ConfigError::HostInUse {
                host: host.clone(),
                live,
            });
        }
        state.hosts.remove(host);
        debug!(host = %host, "host namespace evicted");
        Ok(true)
    }

    /// Number of host namespaces.
    pub fn host_count(&self) -> Result<usize> {
        Ok(self.inner.read()?.hosts.len())
    }

    /// Number of connection namespaces.
    pub fn connection_count(&self) -> Result<usize> {
        Ok(self.inner.read()?.connections.len())
    }

    /// All hosts with a namespace, sorted.
    pub fn hosts(&self) -> Result<Vec<HostId>> {
        let state = self.inner.read()?;
        let mut hosts: Vec<HostId> = state.hosts.keys().cloned().collect();
        hosts.sort();
        Ok(hosts)
    }

    /// The live connections of `host`, sorted. Empty for unknown hosts.
    pub fn live_connections(&self, host: &HostId) -> Result<Vec<ConnectionId>> {
        let state = self.inner.read()?;
        let mut live: Vec<ConnectionId> = state
            .hosts
            .get(host)
            .map(|entry| entry.live.iter().copied().collect())
            .unwrap_or_default();
        live.sort();
        Ok(live)
    }
}

impl<'v> StoreState<'v> {
    fn resolve(&mut self, connection_id: ConnectionId, host_id: &HostId) -> Result<Resolved<'v>> {
        // A connection keeps the host it was first resolved with.
        let host_id = match self.connections.get(&connection_id) {
            Some(entry) if &entry.host != host_id => {
                warn!(
                    connection = %connection_id,
                    recorded = %entry.host,
                    given = %host_id,
                    "connection changed target host; keeping recorded host"
                );
                entry.host.clone()
            }
            _ => host_id.clone(),
        };

        // Every fallible reservation happens before any index is touched, so
        // a failed resolve leaves no host entry pinned by a missing connection.
        let live = self.reserve(connection_id, &host_id)?;
        let host = self.host_namespace(&host_id, connection_id, live);
        let connection = self.connection_namespace(connection_id, &host_id);
        Ok(Resolved {
            host_id,
            host,
            connection,
        })
    }

    /// Reserve room for one connection of `host_id` in both indices and in
    /// the host's live set.
    ///
    /// Returns the live set for a host that has no entry yet.
    fn reserve(&mut self, connection_id: ConnectionId, host_id: &HostId) -> Result<Option<HashSet<ConnectionId>>> {
        if !self.connections.contains_key(&connection_id) {
            self.connections
                .try_reserve(1)
                .map_err(|e| ConfigError::allocation("growing the connection index", e))?;
        }

        match self.hosts.get_mut(host_id) {
            Some(entry) => {
                if !entry.live.contains(&connection_id) {
                    entry
                        .live
                        .try_reserve(1)
                        .map_err(|e| ConfigError::allocation("tracking a live connection", e))?;
                }
                Ok(None)
            }
            None => {
                self.hosts
                    .try_reserve(1)
                    .map_err(|e| ConfigError::allocation("growing the host index", e))?;
                let mut live = HashSet::new();
                live.try_reserve(1)
                    .map_err(|e| ConfigError::allocation("tracking a live connection", e))?;
                Ok(Some(live))
            }
        }
    }

    fn host_namespace(
        &mut self,
        host_id: &HostId,
        connection_id: ConnectionId,
        live: Option<HashSet<ConnectionId>>,
    ) -> Arc<Namespace<'v>> {
        let entry = match self.hosts.entry(host_id.clone()) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                debug!(host = %host_id, "host namespace created");
                vacant.insert(HostEntry {
                    namespace: Arc::new(Namespace::new(NamespaceOwner::Host(host_id.clone()))),
                    live: live.unwrap_or_default(),
                })
            }
        };
        entry.live.insert(connection_id);
        Arc::clone(&entry.namespace)
    }

    fn connection_namespace(&mut self, connection_id: ConnectionId, host_id: &HostId) -> Arc<Namespace<'v>> {
        match self.connections.entry(connection_id) {
            Entry::Occupied(occupied) => Arc::clone(&occupied.get().namespace),
            Entry::Vacant(vacant) => {
                let namespace = Arc::new(Namespace::new(NamespaceOwner::Connection(connection_id)));
                vacant.insert(ConnectionEntry {
                    namespace: Arc::clone(&namespace),
                    host: host_id.clone(),
                });
                debug!(connection = %connection_id, host = %host_id, "connection namespace created");
                namespace
            }
        }
    }
}

impl std::fmt::Debug for ConfigStore<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (hosts, connections) = self
            .inner
            .read()
            .map(|s| (s.hosts.len(), s.connections.len()))
            .unwrap_or((0, 0));
        f.debug_struct("ConfigStore")
            .field("keys", &self.registry.len())
            .field("hosts", &hosts)
            .field("connections", &connections)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ConfigAccess;
    use scopecfg_types::keys::{CONN_PIPELINING, HOST_NAME, HOST_PORT, PROXY_ADDRESS};
    use scopecfg_types::{ConnectionInfo, ScopeTag};

    fn store() -> ConfigStore<'static> {
        ConfigStore::standard().unwrap()
    }

    fn idle_evicting_store() -> ConfigStore<'static> {
        let config = StoreConfig {
            evict_idle_hosts: true,
            ..Default::default()
        };
        ConfigStore::initialize(Arc::new(KeyRegistry::standard()), config).unwrap()
    }

    fn conn(url: &str) -> ConnectionInfo {
        ConnectionInfo::parse(url).unwrap()
    }

    fn ns(view: &ConfigView<'_, 'static>, scope: ScopeTag) -> Arc<Namespace<'static>> {
        view.namespace(scope).unwrap().unwrap()
    }

    // per-host key on a context-only view
    #[test]
    fn host_key_without_connection_is_invalid_scope() {
        let store = store();
        let view = store.resolve_view(None).unwrap();
        let err = view.get_string(HOST_NAME).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidScope { key, scope: ScopeTag::PerHost } if key == HOST_NAME));
    }

    // values survive across views of one connection
    #[test]
    fn value_visible_through_second_view() {
        let store = store();
        let a = conn("http://localhost:12345");

        let view = store.resolve_view(Some(&a)).unwrap();
        view.copy_string(HOST_PORT, "443").unwrap();

        let view2 = store.resolve_view(Some(&a)).unwrap();
        assert_eq!(view2.get_string(HOST_PORT).unwrap().as_deref(), Some("443"));
    }

    // connections to one host share its namespace
    #[test]
    fn host_namespace_is_shared() {
        let store = store();
        let a = conn("http://x:80");
        let b = conn("http://x");

        store.view_for(&a).unwrap().copy_string(HOST_NAME, "v1").unwrap();
        let view_b = store.view_for(&b).unwrap();
        assert_eq!(view_b.get_string(HOST_NAME).unwrap().as_deref(), Some("v1"));
        assert_eq!(store.host_count().unwrap(), 1);
        assert_eq!(store.connection_count().unwrap(), 2);
    }

    // eviction yields a fresh connection namespace
    #[test]
    fn evicted_connection_starts_empty() {
        let store = store();
        let a = conn("http://x");

        store.view_for(&a).unwrap().copy_string(CONN_PIPELINING, "Y").unwrap();
        assert!(store.evict_connection(&a).unwrap());

        let view = store.view_for(&a).unwrap();
        assert!(view.get_string(CONN_PIPELINING).unwrap().is_none());
    }

    #[test]
    fn resolving_twice_yields_identical_namespaces() {
        let store = store();
        let a = conn("https://svc.example");
        let v1 = store.view_for(&a).unwrap();
        let v2 = store.view_for(&a).unwrap();

        for scope in ScopeTag::ALL {
            assert!(Arc::ptr_eq(&ns(&v1, scope), &ns(&v2, scope)), "{scope} namespace duplicated");
        }
        assert_eq!(store.host_count().unwrap(), 1);
        assert_eq!(store.connection_count().unwrap(), 1);
    }

    #[test]
    fn connections_are_isolated() {
        let store = store();
        let a = conn("http://x");
        let b = conn("http://x");
        let va = store.view_for(&a).unwrap();
        let vb = store.view_for(&b).unwrap();

        va.copy_string(CONN_PIPELINING, "Y").unwrap();
        assert!(vb.get_string(CONN_PIPELINING).unwrap().is_none());
        assert!(!Arc::ptr_eq(&ns(&va, ScopeTag::PerConnection), &ns(&vb, ScopeTag::PerConnection)));
        assert!(Arc::ptr_eq(&ns(&va, ScopeTag::PerHost), &ns(&vb, ScopeTag::PerHost)));
    }

    #[test]
    fn different_hosts_get_different_namespaces() {
        let store = store();
        let va = store.view_for(&conn("http://x")).unwrap();
        let vb = store.view_for(&conn("https://x")).unwrap();
        va.copy_string(HOST_NAME, "x").unwrap();
        assert!(vb.get_string(HOST_NAME).unwrap().is_none());
        assert_eq!(store.hosts().unwrap().len(), 2);
    }

    #[test]
    fn context_is_shared_by_all_views() {
        let store = store();
        store.context_view().copy_string(PROXY_ADDRESS, "10.0.0.1:8080").unwrap();
        let view = store.view_for(&conn("http://x")).unwrap();
        assert_eq!(view.get_string(PROXY_ADDRESS).unwrap().as_deref(), Some("10.0.0.1:8080"));
    }

    #[test]
    fn resolve_does_not_touch_existing_values() {
        let store = store();
        let a = conn("http://x");
        let view = store.view_for(&a).unwrap();
        view.copy_string(HOST_NAME, "x").unwrap();
        view.copy_string(CONN_PIPELINING, "N").unwrap();

        let _ = store.view_for(&a).unwrap();
        let _ = store.view_for(&conn("http://x")).unwrap();
        assert_eq!(ns(&view, ScopeTag::PerHost).len().unwrap(), 1);
        assert_eq!(ns(&view, ScopeTag::PerConnection).len().unwrap(), 1);
    }

    #[test]
    fn evicting_unknown_connection_returns_false() {
        let store = store();
        assert!(!store.evict_connection(&conn("http://x")).unwrap());
    }

    #[test]
    fn host_survives_connection_eviction_by_default() {
        let store = store();
        let a = conn("http://x");
        store.view_for(&a).unwrap().copy_string(HOST_NAME, "x").unwrap();
        store.evict_connection(&a).unwrap();

        assert_eq!(store.host_count().unwrap(), 1);
        assert!(store.live_connections(a.host_id()).unwrap().is_empty());
        let b = conn("http://x");
        assert_eq!(store.view_for(&b).unwrap().get_string(HOST_NAME).unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn evict_host_refuses_while_connections_live() {
        let store = store();
        let a = conn("http://x");
        store.view_for(&a).unwrap();

        let err = store.evict_host(a.host_id()).unwrap_err();
        assert!(matches!(err, ConfigError::HostInUse { live: 1, .. }));

        store.evict_connection(&a).unwrap();
        assert!(store.evict_host(a.host_id()).unwrap());
        assert_eq!(store.host_count().unwrap(), 0);
        assert!(!store.evict_host(a.host_id()).unwrap());
    }

    #[test]
    fn evicted_host_comes_back_empty() {
        let store = store();
        let a = conn("http://x");
        store.view_for(&a).unwrap().copy_string(HOST_NAME, "x").unwrap();
        store.evict_connection(&a).unwrap();
        store.evict_host(a.host_id()).unwrap();

        let view = store.view_for(&conn("http://x")).unwrap();
        assert!(view.get_string(HOST_NAME).unwrap().is_none());
    }

    #[test]
    fn idle_hosts_are_evicted_with_last_connection() {
        let store = idle_evicting_store();
        let a = conn("http://x");
        let b = conn("http://x");
        store.view_for(&a).unwrap();
        store.view_for(&b).unwrap();
        assert_eq!(store.live_connections(a.host_id()).unwrap().len(), 2);

        store.evict_connection(&a).unwrap();
        assert_eq!(store.host_count().unwrap(), 1);
        store.evict_connection(&b).unwrap();
        assert_eq!(store.host_count().unwrap(), 0);
        assert_eq!(store.connection_count().unwrap(), 0);
    }

    #[test]
    fn stale_view_does_not_keep_namespace_alive() {
        let store = idle_evicting_store();
        let a = conn("http://x");
        let view = store.view_for(&a).unwrap();
        store.evict_connection(&a).unwrap();
        assert!(matches!(
            view.namespace(ScopeTag::PerHost),
            Err(ConfigError::NamespaceEvicted { scope: ScopeTag::PerHost })
        ));
        assert!(view.namespace(ScopeTag::Context).unwrap().is_some());
    }

    #[test]
    fn connection_keeps_recorded_host() {
        let store = store();
        let a = conn("http://x");
        store.view_for(&a).unwrap();
        let moved = ConnectionInfo::with_id(a.connection_id(), HostId::parse("http://y").unwrap());
        let view = store.view_for(&moved).unwrap();
        assert_eq!(view.host_id(), Some(a.host_id()));
        assert_eq!(store.host_count().unwrap(), 1);
    }

    #[test]
    fn reserve_does_not_create_entries() {
        let mut state = StoreState::default();
        let host = HostId::parse("http://x").unwrap();
        let id = ConnectionId::new();

        let live = state.reserve(id, &host).unwrap();
        assert!(live.is_some_and(|l| l.is_empty() && l.capacity() >= 1));
        assert!(state.hosts.is_empty());
        assert!(state.connections.is_empty());
        assert!(state.connections.capacity() >= 1);
    }

    #[test]
    fn live_sets_match_connection_index() {
        let store = store();
        let conns: Vec<ConnectionInfo> = ["http://a", "http://a:80", "https://b", "http://c:81"]
            .iter()
            .map(|u| conn(u))
            .collect();
        for c in &conns {
            store.view_for(c).unwrap();
            store.view_for(c).unwrap();
        }
        store.evict_connection(&conns[1]).unwrap();

        let state = store.inner.read().unwrap();
        let live: usize = state.hosts.values().map(|h| h.live.len()).sum();
        assert_eq!(live, state.connections.len());
        for (id, entry) in &state.connections {
            assert!(state.hosts[&entry.host].live.contains(id));
        }
    }

    #[test]
    fn zero_capacity_config_is_accepted() {
        let config = StoreConfig {
            initial_host_capacity: 0,
            initial_connection_capacity: 0,
            evict_idle_hosts: false,
        };
        let store: ConfigStore<'static> =
            ConfigStore::initialize(Arc::new(KeyRegistry::standard()), config).unwrap();
        assert_eq!(store.host_count().unwrap(), 0);
        assert!(store.context_namespace().is_empty().unwrap());
    }
}
