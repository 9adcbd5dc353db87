//! Key-value store abstraction with automatic serialization.

use std::fmt;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::StoreError;

/// Raw string key-value storage scoped to one tab.
///
/// Implementations must be cheap to call from synchronous code: every method
/// completes without yielding.
pub trait SessionStore: Send + Sync {
    /// Read a value. Returns `None` if the key doesn't exist.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// List all keys currently stored.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// Remove every key, ending the session.
    fn clear(&self) -> Result<(), StoreError> {
        for key in self.keys()? {
            self.remove(&key)?;
        }
        Ok(())
    }
}

/// Type-safe handle to a [`SessionStore`].
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Cloning is cheap; all clones share the
/// same backend.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn SessionStore>,
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    /// Wrap a backend.
    pub fn new(backend: impl SessionStore + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Wrap an already shared backend.
    pub fn from_arc(backend: Arc<dyn SessionStore>) -> Self {
        Self { backend }
    }

    /// Get a JSON value from the store.
    ///
    /// Returns `None` if the key doesn't exist and an error if the stored
    /// text is not valid JSON for `T`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let items: Option<Vec<CartItem>> = storage.get("carrinho")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.backend.get(key)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Set a JSON value in the store.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let text = serde_json::to_string(value)?;
        self.backend.set(key, &text)
    }

    /// Get a plain string value, stored without JSON encoding.
    pub fn get_string(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.backend.get(key)
    }

    /// Set a plain string value, stored without JSON encoding.
    pub fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.backend.set(key, value)
    }

    /// Delete a value from the store.
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.backend.remove(key)
    }

    /// Check if a key exists in the store.
    pub fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.backend.exists(key)
    }

    /// Get all keys in the store.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.backend.keys()
    }

    /// Remove every key, ending the session.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Line {
        id: u64,
        quantity: u32,
    }

    #[test]
    fn test_json_round_trip() {
        let storage = Storage::new(MemoryStore::new());
        let lines = vec![Line { id: 1, quantity: 2 }, Line { id: 7, quantity: 1 }];

        storage.set("carrinho", &lines).unwrap();
        let loaded: Option<Vec<Line>> = storage.get("carrinho").unwrap();

        assert_eq!(loaded, Some(lines));
    }

    #[test]
    fn test_get_missing_key() {
        let storage = Storage::new(MemoryStore::new());
        let loaded: Option<Vec<Line>> = storage.get("nothing").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_get_corrupt_value_is_error() {
        let storage = Storage::new(MemoryStore::new());
        storage.set_string("carrinho", "{not json").unwrap();

        let result: Result<Option<Vec<Line>>, _> = storage.get("carrinho");
        assert!(matches!(result, Err(StoreError::SerializeError(_))));
    }

    #[test]
    fn test_string_values_are_not_json_encoded() {
        let storage = Storage::new(MemoryStore::new());
        storage.set_string("sessionId", "abc").unwrap();
        assert_eq!(storage.get_string("sessionId").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_clones_share_backend() {
        let storage = Storage::new(MemoryStore::new());
        let other = storage.clone();

        storage.set_string("k", "v").unwrap();
        assert!(other.exists("k").unwrap());

        other.delete("k").unwrap();
        assert!(!storage.exists("k").unwrap());
    }

    #[test]
    fn test_clear_removes_everything() {
        let storage = Storage::new(MemoryStore::new());
        storage.set_string("a", "1").unwrap();
        storage.set_string("b", "2").unwrap();

        storage.clear().unwrap();
        assert!(storage.keys().unwrap().is_empty());
    }
}
