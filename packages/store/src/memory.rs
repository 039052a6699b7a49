use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::kv::{KeyValueStore, StoreError};

/// In-memory KeyValueStore for testing and native fallback.
///
/// Clones share the same map, so a test can keep a handle and inspect what
/// the session layer persisted.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.get_item(keys::AUTH_TOKEN).is_none());

        store.set_item(keys::AUTH_TOKEN, "abc").unwrap();
        assert_eq!(store.get_item(keys::AUTH_TOKEN).as_deref(), Some("abc"));

        store.set_item(keys::AUTH_TOKEN, "def").unwrap();
        assert_eq!(store.get_item(keys::AUTH_TOKEN).as_deref(), Some("def"));
        assert_eq!(store.len(), 1);

        store.remove_item(keys::AUTH_TOKEN).unwrap();
        assert!(store.get_item(keys::AUTH_TOKEN).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.set_item(keys::IS_GUEST, "true").unwrap();
        assert_eq!(handle.get_item(keys::IS_GUEST).as_deref(), Some("true"));
    }

    #[test]
    fn test_removing_missing_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove_item(keys::USER_DATA).is_ok());
    }
}
