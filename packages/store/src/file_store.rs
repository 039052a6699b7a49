//! # Filesystem-backed key-value store
//!
//! [`FileStore`] is a [`KeyValueStore`] implementation that keeps each entry in
//! its own file. It is used on native builds (desktop shells, `dx serve`
//! without a browser) so that a restart restores the same session a browser
//! reload would.
//!
//! ## Layout
//!
//! ```text
//! <base_dir>/
//! ├── auth_token     # raw token string
//! ├── user_data      # JSON user record
//! └── is_guest       # "true"
//! ```
//!
//! Use `dirs::data_dir()` joined with `cafelocate` for a platform-appropriate base.

use std::io::ErrorKind;
use std::path::PathBuf;

use crate::kv::{KeyValueStore, StoreError};

/// Filesystem-backed KeyValueStore for native persistence.
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.base.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.item_path(key)).ok()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let write_err = |e: std::io::Error| StoreError::Write {
            key: key.to_string(),
            reason: e.to_string(),
        };
        std::fs::create_dir_all(&self.base).map_err(write_err)?;
        std::fs::write(self.item_path(key), value).map_err(write_err)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.item_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Remove {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("cafelocate_test_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let store = FileStore::new(dir.clone());
        store.set_item(keys::USER_DATA, r#"{"username":"bob"}"#).unwrap();

        // Re-open from same directory
        let reopened = FileStore::new(dir.clone());
        assert_eq!(
            reopened.get_item(keys::USER_DATA).as_deref(),
            Some(r#"{"username":"bob"}"#)
        );

        reopened.remove_item(keys::USER_DATA).unwrap();
        assert!(store.get_item(keys::USER_DATA).is_none());

        // Removing again is not an error
        assert!(store.remove_item(keys::USER_DATA).is_ok());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
