//! # localStorage key-value store: browser-side persistence
//!
//! [`LocalStore`] is the [`KeyValueStore`] used on the **web platform**. It
//! wraps `window.localStorage` through [`web_sys::Storage`], which is exactly
//! the synchronous string map the session layer expects.
//!
//! A handle to `Storage` is looked up on every call; `web_sys::Storage` is
//! not `Send` and the lookup is cheap. When storage is disabled (private
//! browsing, sandboxed iframes) reads return `None` and writes report
//! [`StoreError::Unavailable`].

use web_sys::Storage;

use crate::kv::{KeyValueStore, StoreError};

/// `window.localStorage`-backed KeyValueStore.
#[derive(Clone, Debug, Default)]
pub struct LocalStore;

impl LocalStore {
    pub fn new() -> Self {
        Self
    }

    fn storage(&self) -> Option<Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl KeyValueStore for LocalStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = self.storage().ok_or(StoreError::Unavailable)?;
        storage.set_item(key, value).map_err(|e| StoreError::Write {
            key: key.to_string(),
            reason: format!("{e:?}"),
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let storage = self.storage().ok_or(StoreError::Unavailable)?;
        storage.remove_item(key).map_err(|e| StoreError::Remove {
            key: key.to_string(),
            reason: format!("{e:?}"),
        })
    }
}
