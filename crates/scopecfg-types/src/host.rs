use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, TypeError};

/// Canonical identity of a remote host: `scheme://host:port`.
///
/// Scheme and host are lowercased and the port is always explicit, with the
/// scheme's default port filled in when the input omits it. Two connections
/// whose targets canonicalize to the same `HostId` share per-host settings.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HostId {
    canonical: String,
    scheme_len: usize,
    port: u16,
}

impl HostId {
    /// Build a host identity from its parts.
    ///
    /// `host` must be a bare host name or address literal: anything the URL
    /// parser would read as credentials, path, query, or fragment is
    /// rejected rather than silently dropped along with `port`.
    pub fn new(scheme: &str, host: &str, port: u16) -> Result<Self> {
        let invalid = |reason: String| TypeError::InvalidHost {
            input: format!("{scheme}://{host}:{port}"),
            reason,
        };

        if host.is_empty() {
            return Err(invalid("host must not be empty".into()));
        }
        if let Some(ch) = host
            .chars()
            .find(|&c| matches!(c, '/' | '\\' | '?' | '#' | '@') || c.is_whitespace())
        {
            return Err(invalid(format!("host contains forbidden character {ch:?}")));
        }

        let id = Self::parse(&format!("{scheme}://{host}:{port}"))?;
        if id.port != port {
            return Err(invalid(format!("port {port} did not survive parsing (got {})", id.port)));
        }
        Ok(id)
    }

    /// Parse a URL (`https://example.com/path` is fine) into its host
    /// identity. Path, query, and credentials are ignored.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: String| TypeError::InvalidHost {
            input: input.to_string(),
            reason,
        };

        let url = Url::parse(input).map_err(|e| invalid(e.to_string()))?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host".into()))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid(format!("no port given and no default for scheme {:?}", url.scheme())))?;

        let scheme = url.scheme();
        Ok(Self {
            canonical: format!("{scheme}://{}:{port}", host.to_ascii_lowercase()),
            scheme_len: scheme.len(),
            port,
        })
    }

    /// The URL scheme, e.g. `https`.
    pub fn scheme(&self) -> &str {
        &self.canonical[..self.scheme_len]
    }

    /// The host name or address literal (IPv6 literals keep their brackets).
    pub fn host(&self) -> &str {
        let rest = &self.canonical[self.scheme_len + 3..];
        match rest.rfind(':') {
            Some(idx) => &rest[..idx],
            None => rest,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// The canonical `scheme://host:port` string.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}

impl TryFrom<String> for HostId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<HostId> for String {
    fn from(id: HostId) -> String {
        id.canonical
    }
}

impl std::str::FromStr for HostId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Debug for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostId({})", self.canonical)
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}
