use thiserror::Error;

/// Errors produced while defining keys, building a registry, or parsing
/// host identities.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// The raw key bits do not carry exactly one scope tag, or carry bits
    /// outside the scope and identity masks.
    #[error("malformed scope bits in key 0x{bits:08x}")]
    MalformedScope { bits: u32 },

    #[error("key identity {identity:#x} does not fit in 24 bits")]
    IdentityOutOfRange { identity: u32 },

    /// Another registered key already uses this identity.
    #[error("duplicate key identity {identity:#08x} (already registered as {existing})")]
    DuplicateKey { identity: u32, existing: String },

    #[error("duplicate key name: {name}")]
    DuplicateName { name: String },

    #[error("invalid key name {name:?}: {reason}")]
    InvalidKeyName { name: String, reason: String },

    #[error("invalid host {input:?}: {reason}")]
    InvalidHost { input: String, reason: String },
}

/// Convenience type alias for type-level operations.
pub type Result<T> = std::result::Result<T, TypeError>;
