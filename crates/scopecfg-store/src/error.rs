//! Error types for config store operations.

use std::collections::TryReserveError;
use std::sync::PoisonError;

use scopecfg_types::{HostId, KeyDescriptor, ScopeTag, TypeError};
use thiserror::Error;

use crate::value::ValueKind;

/// Errors that can occur while resolving views or reading and writing
/// settings.
///
/// A missing entry is not an error: getters return `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The key routes to a namespace this view does not have, e.g. a
    /// per-host key on a view resolved without a connection.
    #[error("key {key} needs a {scope} namespace, which this view does not have")]
    InvalidScope { key: KeyDescriptor, scope: ScopeTag },

    /// The key is not part of the store's registry.
    #[error("key {key} is not registered with this store")]
    UnknownKey { key: KeyDescriptor },

    /// The entry exists but holds the other kind of value.
    #[error("key {key} holds a {found} value, expected {expected}")]
    TypeMismatch {
        key: KeyDescriptor,
        expected: ValueKind,
        found: ValueKind,
    },

    /// The namespace this view referenced was evicted after the view was
    /// resolved.
    #[error("the {scope} namespace of this view has been evicted")]
    NamespaceEvicted { scope: ScopeTag },

    /// A host namespace cannot be evicted while connections to it are live.
    #[error("cannot evict host {host}: {live} live connection(s)")]
    HostInUse { host: HostId, live: usize },

    /// A stored value could not be interpreted by a typed accessor.
    #[error("invalid value for key {key}: {reason}")]
    InvalidValue { key: KeyDescriptor, reason: String },

    /// Memory for a namespace or a value copy could not be reserved.
    #[error("allocation failed while {what}: {reason}")]
    AllocationFailure { what: String, reason: String },

    /// The store configuration could not be parsed.
    #[error("invalid store configuration: {0}")]
    Config(String),

    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl ConfigError {
    pub(crate) fn allocation(what: impl Into<String>, err: TryReserveError) -> Self {
        Self::AllocationFailure {
            what: what.into(),
            reason: err.to_string(),
        }
    }
}

impl<T> From<PoisonError<T>> for ConfigError {
    fn from(err: PoisonError<T>) -> Self {
        Self::LockPoisoned(err.to_string())
    }
}

/// Convenience type alias for config store operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
