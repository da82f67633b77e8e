//! Typed accessors for the well-known keys.
//!
//! [`WellKnownSettings`] is implemented for every [`ConfigAccess`], so a
//! resolved view can read and write the standard settings without dealing
//! with their text encoding:
//!
//! ```
//! use scopecfg_store::{ConfigStore, WellKnownSettings};
//! use scopecfg_types::{ConnectionHandle, ConnectionInfo};
//!
//! let store = ConfigStore::standard().unwrap();
//! let conn = ConnectionInfo::parse("https://example.com").unwrap();
//! let view = store.view_for(&conn).unwrap();
//!
//! view.set_target(conn.host_id()).unwrap();
//! assert_eq!(view.target_port().unwrap(), Some(443));
//! ```

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use scopecfg_types::keys::{
    CONN_LOCAL_IP, CONN_PIPELINING, CONN_REMOTE_IP, HOST_NAME, HOST_PORT, LOG_BASE_DIR,
    PROXY_ADDRESS,
};
use scopecfg_types::{HostId, KeyDescriptor};

use crate::error::{ConfigError, Result};
use crate::traits::ConfigAccess;

/// Read and write the well-known settings with their natural types.
///
/// Setters always copy, so the typed value need not outlive the store.
/// Getters return `Ok(None)` for unset keys and
/// [`ConfigError::InvalidValue`] for text that does not parse.
pub trait WellKnownSettings<'v>: ConfigAccess<'v> {
    /// Record the target host name and port of a connection.
    fn set_target(&self, host: &HostId) -> Result<()> {
        self.copy_string(HOST_NAME, host.host())?;
        self.copy_string(HOST_PORT, &host.port().to_string())
    }

    fn target_host_name(&self) -> Result<Option<String>> {
        self.get_string_owned(HOST_NAME)
    }

    fn target_port(&self) -> Result<Option<u16>> {
        parsed(self, HOST_PORT)
    }

    /// Route every connection of the session through a proxy.
    fn set_proxy(&self, addr: SocketAddr) -> Result<()> {
        self.copy_string(PROXY_ADDRESS, &addr.to_string())
    }

    fn proxy(&self) -> Result<Option<SocketAddr>> {
        parsed(self, PROXY_ADDRESS)
    }

    /// Stop routing through a proxy. Returns `true` if one was set.
    fn clear_proxy(&self) -> Result<bool> {
        self.remove(PROXY_ADDRESS)
    }

    fn set_pipelining(&self, enabled: bool) -> Result<()> {
        self.copy_string(CONN_PIPELINING, if enabled { "Y" } else { "N" })
    }

    fn pipelining(&self) -> Result<Option<bool>> {
        match self.get_string(CONN_PIPELINING)?.as_deref() {
            None => Ok(None),
            Some("Y") => Ok(Some(true)),
            Some("N") => Ok(Some(false)),
            Some(other) => Err(ConfigError::InvalidValue {
                key: CONN_PIPELINING,
                reason: format!("expected \"Y\" or \"N\", got {other:?}"),
            }),
        }
    }

    fn set_local_addr(&self, addr: SocketAddr) -> Result<()> {
        self.copy_string(CONN_LOCAL_IP, &addr.to_string())
    }

    fn local_addr(&self) -> Result<Option<SocketAddr>> {
        parsed(self, CONN_LOCAL_IP)
    }

    fn set_remote_addr(&self, addr: SocketAddr) -> Result<()> {
        self.copy_string(CONN_REMOTE_IP, &addr.to_string())
    }

    fn remote_addr(&self) -> Result<Option<SocketAddr>> {
        parsed(self, CONN_REMOTE_IP)
    }

    /// Directory for the session's log files. Must be valid UTF-8.
    fn set_log_base_dir(&self, dir: &Path) -> Result<()> {
        let text = dir.to_str().ok_or_else(|| ConfigError::InvalidValue {
            key: LOG_BASE_DIR,
            reason: format!("path is not valid UTF-8: {}", dir.display()),
        })?;
        self.copy_string(LOG_BASE_DIR, text)
    }

    fn log_base_dir(&self) -> Result<Option<PathBuf>> {
        Ok(self.get_string(LOG_BASE_DIR)?.map(|s| PathBuf::from(&*s)))
    }
}

impl<'v, T: ConfigAccess<'v> + ?Sized> WellKnownSettings<'v> for T {}

fn parsed<'v, A, T>(access: &A, key: KeyDescriptor) -> Result<Option<T>>
where
    A: ConfigAccess<'v> + ?Sized,
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = access.get_string(key)? else {
        return Ok(None);
    };
    raw.parse().map(Some).map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        reason: format!("{raw:?}: {e}"),
    })
}
