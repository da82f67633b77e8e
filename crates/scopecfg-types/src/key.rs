//! Key descriptors: scope-tagged, globally unique setting identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypeError};
use crate::scope::{ScopeTag, IDENTITY_MASK, SCOPE_MASK};

/// A scope-tagged token identifying one named setting.
///
/// The descriptor packs a [`ScopeTag`] into the high bits and a 24-bit
/// identity into the low bits. Equality and hashing are by value of the whole
/// token, so two keys with the same scope but different identities are
/// distinct. Every constructor guarantees exactly one scope bit is set.
///
/// Keys are meant to be defined once, usually as constants:
///
/// ```
/// use scopecfg_types::{KeyDescriptor, ScopeTag};
///
/// const USER_AGENT: KeyDescriptor = KeyDescriptor::define(ScopeTag::Context, 0x100);
///
/// assert_eq!(USER_AGENT.scope(), ScopeTag::Context);
/// assert_eq!(USER_AGENT.identity(), 0x100);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct KeyDescriptor(u32);

impl KeyDescriptor {
    /// Define a key at compile time.
    ///
    /// Panics (a compile error in `const` context) if `identity` does not fit
    /// in 24 bits.
    pub const fn define(scope: ScopeTag, identity: u32) -> Self {
        assert!(
            identity & !IDENTITY_MASK == 0,
            "key identity must fit in 24 bits"
        );
        Self(scope.bits() | identity)
    }

    /// Fallible runtime counterpart of [`KeyDescriptor::define`].
    pub fn new(scope: ScopeTag, identity: u32) -> Result<Self> {
        if identity & !IDENTITY_MASK != 0 {
            return Err(TypeError::IdentityOutOfRange { identity });
        }
        Ok(Self(scope.bits() | identity))
    }

    /// Rebuild a key from its raw bit pattern.
    ///
    /// Fails unless exactly one scope bit is set and no bits outside the
    /// scope and identity masks are used.
    pub fn from_bits(bits: u32) -> Result<Self> {
        if bits & !(SCOPE_MASK | IDENTITY_MASK) != 0 {
            return Err(TypeError::MalformedScope { bits });
        }
        ScopeTag::from_bits(bits)?;
        Ok(Self(bits))
    }

    /// The scope this key routes to.
    pub const fn scope(self) -> ScopeTag {
        if self.0 & ScopeTag::Context.bits() != 0 {
            ScopeTag::Context
        } else if self.0 & ScopeTag::PerHost.bits() != 0 {
            ScopeTag::PerHost
        } else {
            ScopeTag::PerConnection
        }
    }

    /// The identity bits, unique across every key in a registry.
    pub const fn identity(self) -> u32 {
        self.0 & IDENTITY_MASK
    }

    /// The raw packed representation.
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for KeyDescriptor {
    type Error = TypeError;

    fn try_from(bits: u32) -> Result<Self> {
        Self::from_bits(bits)
    }
}

impl From<KeyDescriptor> for u32 {
    fn from(key: KeyDescriptor) -> u32 {
        key.0
    }
}

impl fmt::Debug for KeyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyDescriptor({self})")
    }
}

impl fmt::Display for KeyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:#08x}", self.scope(), self.identity())
    }
}
