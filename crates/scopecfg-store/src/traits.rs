//! The [`ConfigAccess`] trait: the get/set surface callers program against.
//!
//! [`crate::ConfigView`] is the implementation backed by a store. Helpers
//! such as [`crate::settings::WellKnownSettings`] are written against this
//! trait so they work with any implementation.

use scopecfg_types::KeyDescriptor;

use crate::error::Result;
use crate::value::{Stored, ValueSource};

/// Scoped read/write access to settings.
///
/// Implementations route every call by the key's scope tag. A key whose
/// scope is not available yields [`crate::ConfigError::InvalidScope`]; a
/// key with no entry in an available scope reads as `Ok(None)`.
pub trait ConfigAccess<'v> {
    /// Set a string value, copying or borrowing it per `value`.
    fn set_string(&self, key: KeyDescriptor, value: ValueSource<'_, 'v, str>) -> Result<()>;

    /// Read a string value without copying it.
    fn get_string(&self, key: KeyDescriptor) -> Result<Option<Stored<'v, str>>>;

    /// Set a binary object, copying or borrowing it per `value`.
    fn set_object(&self, key: KeyDescriptor, value: ValueSource<'_, 'v, [u8]>) -> Result<()>;

    /// Read a binary object without copying it.
    fn get_object(&self, key: KeyDescriptor) -> Result<Option<Stored<'v, [u8]>>>;

    /// Remove the entry for `key`.
    ///
    /// Returns `Ok(true)` if an entry existed, `Ok(false)` if it did not.
    fn remove(&self, key: KeyDescriptor) -> Result<bool>;

    /// Returns `true` if `key` has an entry of either kind.
    fn contains(&self, key: KeyDescriptor) -> Result<bool>;

    /// Set a string value owned by the store.
    fn copy_string(&self, key: KeyDescriptor, value: &str) -> Result<()> {
        self.set_string(key, ValueSource::Copy(value))
    }

    /// Read a string value into a fresh `String`.
    fn get_string_owned(&self, key: KeyDescriptor) -> Result<Option<String>> {
        Ok(self.get_string(key)?.map(|s| s.to_string()))
    }
}
