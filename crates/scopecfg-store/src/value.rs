//! Stored values and the per-write copy/borrow choice.
//!
//! Every write chooses how its value is held:
//!
//! - [`ValueSource::Copy`] duplicates the data into store-owned memory. The
//!   caller's buffer can be changed or dropped right after the call.
//! - [`ValueSource::Borrow`] keeps a reference to the caller's data. The
//!   `'v` lifetime of the store makes the compiler hold the caller to keeping
//!   that data alive for as long as the store exists.
//!
//! Reads hand back a [`Stored`] which dereferences to the data without
//! copying it; owned data is shared by reference count.

use std::collections::TryReserveError;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// How a value handed to a setter is stored.
#[derive(Debug)]
pub enum ValueSource<'a, 'v, T: ?Sized> {
    /// Duplicate the data into store-owned memory.
    Copy(&'a T),
    /// Keep a reference to caller-owned data that outlives the store.
    Borrow(&'v T),
}

impl<T: ?Sized> Clone for ValueSource<'_, '_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for ValueSource<'_, '_, T> {}

/// A value held by a namespace: owned by the store or borrowed from the
/// caller.
pub enum Stored<'v, T: ?Sized> {
    Borrowed(&'v T),
    Owned(Arc<T>),
}

impl<T: ?Sized> Stored<'_, T> {
    /// Returns `true` if the value references caller-owned data.
    pub fn is_borrowed(&self) -> bool {
        matches!(self, Stored::Borrowed(_))
    }
}

impl<T: ?Sized> Clone for Stored<'_, T> {
    fn clone(&self) -> Self {
        match self {
            Stored::Borrowed(r) => Stored::Borrowed(*r),
            Stored::Owned(a) => Stored::Owned(Arc::clone(a)),
        }
    }
}

impl<T: ?Sized> Deref for Stored<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            Stored::Borrowed(r) => r,
            Stored::Owned(a) => a,
        }
    }
}

impl<T: ?Sized> AsRef<T> for Stored<'_, T> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T: ?Sized + PartialEq> PartialEq for Stored<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Stored<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

impl fmt::Display for Stored<'_, str> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

/// The kind of data held by an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::String => f.write_str("string"),
            ValueKind::Object => f.write_str("object"),
        }
    }
}

/// An entry in a namespace.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value<'v> {
    String(Stored<'v, str>),
    Object(Stored<'v, [u8]>),
}

impl Value<'_> {
    pub(crate) fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

impl<'v> ValueSource<'_, 'v, str> {
    pub(crate) fn into_stored(self) -> Result<Stored<'v, str>> {
        match self {
            ValueSource::Borrow(s) => Ok(Stored::Borrowed(s)),
            ValueSource::Copy(s) => copy_str(s)
                .map(Stored::Owned)
                .map_err(|e| ConfigError::allocation(format!("copying {} byte string", s.len()), e)),
        }
    }
}

impl<'v> ValueSource<'_, 'v, [u8]> {
    pub(crate) fn into_stored(self) -> Result<Stored<'v, [u8]>> {
        match self {
            ValueSource::Borrow(b) => Ok(Stored::Borrowed(b)),
            ValueSource::Copy(b) => copy_bytes(b)
                .map(Stored::Owned)
                .map_err(|e| ConfigError::allocation(format!("copying {} byte object", b.len()), e)),
        }
    }
}

fn copy_str(s: &str) -> std::result::Result<Arc<str>, TryReserveError> {
    let mut buf = String::new();
    buf.try_reserve_exact(s.len())?;
    buf.push_str(s);
    Ok(Arc::from(buf))
}

fn copy_bytes(b: &[u8]) -> std::result::Result<Arc<[u8]>, TryReserveError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(b.len())?;
    buf.extend_from_slice(b);
    Ok(Arc::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_detaches_from_source() {
        let mut source = String::from("abc");
        let stored = ValueSource::Copy(source.as_str()).into_stored().unwrap();
        source.push('d');
        assert_eq!(&*stored, "abc");
        assert!(!stored.is_borrowed());
    }

    #[test]
    fn borrow_keeps_reference() {
        let source = String::from("abc");
        let stored = ValueSource::Borrow(source.as_str()).into_stored().unwrap();
        assert!(stored.is_borrowed());
        assert!(std::ptr::eq(&*stored, source.as_str()));
    }

    #[test]
    fn object_copy_keeps_exact_length() {
        let data = [0u8, 1, 0, 2];
        let stored = ValueSource::Copy(&data[..]).into_stored().unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(&*stored, &data[..]);
    }

    #[test]
    fn clone_shares_owned_storage() {
        let stored = ValueSource::Copy("shared").into_stored().unwrap();
        let cloned = stored.clone();
        assert!(std::ptr::eq(&*stored, &*cloned));
    }

    #[test]
    fn value_kind_display() {
        assert_eq!(ValueKind::String.to_string(), "string");
        assert_eq!(ValueKind::Object.to_string(), "object");
        let v = Value::Object(Stored::Borrowed(&b"x"[..]));
        assert_eq!(v.kind(), ValueKind::Object);
    }

    #[test]
    fn value_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ValueKind::Object).unwrap(), "\"object\"");
    }
}
