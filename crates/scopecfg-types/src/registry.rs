//! The key registry: the explicit, immutable set of keys a store accepts.
//!
//! A registry is built once at startup with [`KeyRegistryBuilder`] and then
//! shared (usually behind an `Arc`) with every store that uses it. Building
//! enforces the invariants that make key routing unambiguous:
//!
//! - every identity is used by exactly one key, whatever its scope
//! - every key has a unique, well-formed name
//!
//! Key names use lowercase ASCII letters, digits, `-`, `_` and `.` as a
//! separator, e.g. `host.name` or `conn.remote-ip`.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, TypeError};
use crate::key::KeyDescriptor;
use crate::keys;
use crate::scope::ScopeTag;

/// An immutable set of named key descriptors.
#[derive(Clone, Debug, Default)]
pub struct KeyRegistry {
    by_key: HashMap<KeyDescriptor, String>,
    by_name: BTreeMap<String, KeyDescriptor>,
}

impl KeyRegistry {
    /// Start building a registry.
    pub fn builder() -> KeyRegistryBuilder {
        KeyRegistryBuilder::default()
    }

    /// A registry holding the well-known keys from [`crate::keys`].
    pub fn standard() -> Self {
        Self::standard_builder().build()
    }

    /// A builder pre-populated with the well-known keys, for callers that
    /// add their own keys on top.
    pub fn standard_builder() -> KeyRegistryBuilder {
        let mut builder = KeyRegistryBuilder::default();
        for (name, key) in keys::WELL_KNOWN {
            let inserted = builder.insert(name, *key);
            debug_assert!(inserted.is_ok(), "well-known key catalog clash: {inserted:?}");
        }
        builder
    }

    /// Returns `true` if `key` belongs to this registry.
    pub fn contains(&self, key: KeyDescriptor) -> bool {
        self.by_key.contains_key(&key)
    }

    /// The registered name of `key`, if any.
    pub fn name_of(&self, key: KeyDescriptor) -> Option<&str> {
        self.by_key.get(&key).map(String::as_str)
    }

    /// Look up a key by its registered name.
    pub fn lookup(&self, name: &str) -> Option<KeyDescriptor> {
        self.by_name.get(name).copied()
    }

    /// All keys in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, KeyDescriptor)> + '_ {
        self.by_name.iter().map(|(name, key)| (name.as_str(), *key))
    }

    /// All keys routed to `scope`, in name order.
    pub fn keys_in_scope(&self, scope: ScopeTag) -> Vec<KeyDescriptor> {
        self.iter()
            .filter(|(_, key)| key.scope() == scope)
            .map(|(_, key)| key)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Builder for [`KeyRegistry`].
#[derive(Debug, Default)]
pub struct KeyRegistryBuilder {
    by_key: HashMap<KeyDescriptor, String>,
    by_name: BTreeMap<String, KeyDescriptor>,
    by_identity: HashMap<u32, String>,
}

impl KeyRegistryBuilder {
    /// Register `key` under `name`, consuming and returning the builder.
    pub fn register(mut self, name: &str, key: KeyDescriptor) -> Result<Self> {
        self.insert(name, key)?;
        Ok(self)
    }

    /// Register `key` under `name` in place.
    pub fn insert(&mut self, name: &str, key: KeyDescriptor) -> Result<()> {
        validate_key_name(name)?;

        if self.by_name.contains_key(name) {
            return Err(TypeError::DuplicateName {
                name: name.to_string(),
            });
        }
        if let Some(existing) = self.by_identity.get(&key.identity()) {
            return Err(TypeError::DuplicateKey {
                identity: key.identity(),
                existing: existing.clone(),
            });
        }

        self.by_identity.insert(key.identity(), name.to_string());
        self.by_key.insert(key, name.to_string());
        self.by_name.insert(name.to_string(), key);
        Ok(())
    }

    pub fn build(self) -> KeyRegistry {
        KeyRegistry {
            by_key: self.by_key,
            by_name: self.by_name,
        }
    }
}

/// Validate a key name.
///
/// # Examples
///
/// ```
/// use scopecfg_types::registry::validate_key_name;
///
/// assert!(validate_key_name("host.name").is_ok());
/// assert!(validate_key_name("Host").is_err());
/// assert!(validate_key_name("a..b").is_err());
/// ```
pub fn validate_key_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| TypeError::InvalidKeyName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("key name must not be empty"));
    }
    if let Some(ch) = name
        .chars()
        .find(|&c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.')))
    {
        return Err(invalid(&format!("contains forbidden character: {ch:?}")));
    }
    if name.split('.').any(str::is_empty) {
        return Err(invalid("segments between '.' must not be empty"));
    }
    Ok(())
}
