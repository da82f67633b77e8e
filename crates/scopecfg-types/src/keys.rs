//! Well-known keys used by the client library.
//!
//! These are compile-time constants; [`crate::KeyRegistry::standard`]
//! registers all of them under the names in [`WELL_KNOWN`]. Identities below
//! `0x1000` are reserved for this catalog.

use crate::key::KeyDescriptor;
use crate::scope::ScopeTag;

/// Host name of the connection target.
pub const HOST_NAME: KeyDescriptor = KeyDescriptor::define(ScopeTag::PerHost, 0x000001);

/// Port of the connection target, as decimal text.
pub const HOST_PORT: KeyDescriptor = KeyDescriptor::define(ScopeTag::PerHost, 0x000002);

/// Local socket address of a connection.
pub const CONN_LOCAL_IP: KeyDescriptor = KeyDescriptor::define(ScopeTag::PerConnection, 0x000003);

/// Remote socket address of a connection.
pub const CONN_REMOTE_IP: KeyDescriptor =
    KeyDescriptor::define(ScopeTag::PerConnection, 0x000004);

/// Whether requests may be pipelined on a connection (`"Y"` / `"N"`).
pub const CONN_PIPELINING: KeyDescriptor =
    KeyDescriptor::define(ScopeTag::PerConnection, 0x000005);

/// Proxy server address used for every connection of the session.
pub const PROXY_ADDRESS: KeyDescriptor = KeyDescriptor::define(ScopeTag::Context, 0x000006);

/// Base directory for per-session log files.
pub const LOG_BASE_DIR: KeyDescriptor = KeyDescriptor::define(ScopeTag::Context, 0x000007);

/// Every well-known key with its registry name.
pub const WELL_KNOWN: &[(&str, KeyDescriptor)] = &[
    ("host.name", HOST_NAME),
    ("host.port", HOST_PORT),
    ("conn.local-ip", CONN_LOCAL_IP),
    ("conn.remote-ip", CONN_REMOTE_IP),
    ("conn.pipelining", CONN_PIPELINING),
    ("context.proxy", PROXY_ADDRESS),
    ("context.log-dir", LOG_BASE_DIR),
];
