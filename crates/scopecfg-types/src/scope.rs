//! Scope tags: which lifetime region a setting belongs to.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypeError};

/// Bits reserved for the scope tag in a key descriptor.
pub const SCOPE_MASK: u32 = 0x7000_0000;

/// Bits reserved for the key identity in a key descriptor.
pub const IDENTITY_MASK: u32 = 0x00FF_FFFF;

/// The lifetime region of a setting.
///
/// Every key descriptor carries exactly one scope tag, fixed when the key is
/// defined. The tag decides which namespace of a view a read or write is
/// routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeTag {
    /// Lives as long as the client session.
    Context,
    /// Lives as long as a remote host (`scheme://host:port`) is referenced.
    PerHost,
    /// Lives as long as a single connection.
    PerConnection,
}

impl ScopeTag {
    /// All scope tags, narrowest last.
    pub const ALL: [ScopeTag; 3] = [ScopeTag::Context, ScopeTag::PerHost, ScopeTag::PerConnection];

    /// The bit pattern encoding this scope inside a key descriptor.
    pub const fn bits(self) -> u32 {
        match self {
            ScopeTag::Context => 0x1000_0000,
            ScopeTag::PerHost => 0x2000_0000,
            ScopeTag::PerConnection => 0x4000_0000,
        }
    }

    /// Decode the scope tag from raw key bits.
    ///
    /// Exactly one scope bit must be set. Unmarked keys are rejected rather
    /// than defaulted to a scope.
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits & SCOPE_MASK {
            0x1000_0000 => Ok(ScopeTag::Context),
            0x2000_0000 => Ok(ScopeTag::PerHost),
            0x4000_0000 => Ok(ScopeTag::PerConnection),
            _ => Err(TypeError::MalformedScope { bits }),
        }
    }

    /// Short lowercase label used in logs and key display.
    pub fn as_str(self) -> &'static str {
        match self {
            ScopeTag::Context => "context",
            ScopeTag::PerHost => "per-host",
            ScopeTag::PerConnection => "per-connection",
        }
    }
}

impl fmt::Display for ScopeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_disjoint_from_identity() {
        for scope in ScopeTag::ALL {
            assert_eq!(scope.bits() & IDENTITY_MASK, 0);
            assert_eq!(scope.bits() & SCOPE_MASK, scope.bits());
        }
    }

    #[test]
    fn from_bits_decodes_each_scope() {
        for scope in ScopeTag::ALL {
            assert_eq!(ScopeTag::from_bits(scope.bits() | 0x42).unwrap(), scope);
        }
    }

    #[test]
    fn unmarked_bits_are_rejected() {
        let err = ScopeTag::from_bits(0x0000_0001).unwrap_err();
        assert_eq!(err, TypeError::MalformedScope { bits: 1 });
    }

    #[test]
    fn multiple_scope_bits_are_rejected() {
        let bits = ScopeTag::Context.bits() | ScopeTag::PerHost.bits();
        assert!(ScopeTag::from_bits(bits).is_err());
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&ScopeTag::PerConnection).unwrap();
        assert_eq!(json, "\"per-connection\"");
        let parsed: ScopeTag = serde_json::from_str("\"per-host\"").unwrap();
        assert_eq!(parsed, ScopeTag::PerHost);
    }
}
