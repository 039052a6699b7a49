//! # Key-value persistence
//!
//! [`KeyValueStore`] mirrors the browser's `localStorage` API: string keys,
//! string values, synchronous access. Implementations live in sibling modules
//! ([`crate::MemoryStore`], [`crate::FileStore`], and `LocalStore` on the web).
//!
//! Reads never fail; a missing or unreadable entry is `None`. Writes report
//! failures so callers can keep their in-memory state consistent with what
//! actually landed on disk.

use thiserror::Error;

/// Errors raised when a write or removal does not reach the backing storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage backend is unavailable")]
    Unavailable,
    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },
    #[error("failed to remove `{key}`: {reason}")]
    Remove { key: String, reason: String },
}

/// Synchronous string key-value storage.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove_item(key)
    }
}
