use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Tuning for a [`crate::ConfigStore`].
///
/// Every field has a default, so a TOML document only needs the fields it
/// changes:
///
/// ```
/// use scopecfg_store::StoreConfig;
///
/// let config = StoreConfig::from_toml_str("evict_idle_hosts = true").unwrap();
/// assert!(config.evict_idle_hosts);
/// assert_eq!(config.initial_connection_capacity, 64);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Host namespaces to reserve room for at initialization.
    pub initial_host_capacity: usize,
    /// Connection namespaces to reserve room for at initialization.
    pub initial_connection_capacity: usize,
    /// When `true`, a host namespace is evicted together with the last live
    /// connection to that host. When `false`, per-host settings survive
    /// until [`crate::ConfigStore::evict_host`] is called.
    pub evict_idle_hosts: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_host_capacity: 16,
            initial_connection_capacity: 64,
            evict_idle_hosts: false,
        }
    }
}

impl StoreConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ConfigError::Config(e.to_string()))
    }

    /// Serialize the configuration as TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| ConfigError::Config(e.to_string()))
    }
}
