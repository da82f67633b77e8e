//! Scoped configuration store for an HTTP client session.
//!
//! Settings live in one of three namespaces, chosen by the scope tag of
//! their key: the session-wide context, one namespace per target host, and
//! one namespace per connection. Callers resolve a [`ConfigView`] for a
//! connection (or for no connection at all) and read and write through it;
//! the view routes each key to the right namespace.
//!
//! # Architecture
//!
//! - The [`ConfigStore`] owns every namespace. Host and connection
//!   namespaces are created lazily on first resolution and dropped on
//!   eviction.
//! - Views hold weak references, so a view outliving an eviction fails
//!   with [`ConfigError::NamespaceEvicted`] instead of reading stale data.
//! - Values are either copied into the store or borrowed for the store's
//!   lifetime `'v`, chosen per write with [`ValueSource`].
//!
//! # Modules
//!
//! - [`config`]: [`StoreConfig`] and its TOML form
//! - [`error`]: error type for store operations
//! - [`namespace`]: a single keyed namespace
//! - [`settings`]: typed accessors for the well-known keys
//! - [`store`]: the [`ConfigStore`] and its host/connection index
//! - [`traits`]: the [`ConfigAccess`] trait
//! - [`value`]: copied and borrowed values
//! - [`view`]: [`ConfigView`], the resolved routing handle

pub mod config;
pub mod error;
pub mod namespace;
pub mod settings;
pub mod store;
pub mod traits;
pub mod value;
pub mod view;

pub use config::StoreConfig;
pub use error::{ConfigError, Result};
pub use namespace::{Namespace, NamespaceOwner};
pub use settings::WellKnownSettings;
pub use store::ConfigStore;
pub use traits::ConfigAccess;
pub use value::{Stored, ValueKind, ValueSource};
pub use view::ConfigView;
