//! Foundation types for scopecfg.
//!
//! This crate defines the vocabulary shared by the config store and its
//! callers: which scope a setting lives in, how keys are identified, and how
//! hosts and connections are named.
//!
//! # Key Types
//!
//! - [`ScopeTag`]: Context, per-host, or per-connection lifetime
//! - [`KeyDescriptor`]: Scope-tagged key identifier, compared by value
//! - [`KeyRegistry`]: Immutable set of named keys injected into a store
//! - [`HostId`]: Canonical `scheme://host:port` identity
//! - [`ConnectionId`]: Unique, non-reusable connection identity
//! - [`ConnectionHandle`]: What a store needs from a connection

pub mod connection;
pub mod error;
pub mod host;
pub mod key;
pub mod keys;
pub mod registry;
pub mod scope;

pub use connection::{ConnectionHandle, ConnectionId, ConnectionInfo};
pub use error::{Result, TypeError};
pub use host::HostId;
pub use key::KeyDescriptor;
pub use registry::{KeyRegistry, KeyRegistryBuilder};
pub use scope::ScopeTag;
