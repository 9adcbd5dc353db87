//! Local cart mirror.
//!
//! A write-through shadow of the query cache kept in the session store, so a
//! reload shows the previous cart before the first backend read lands.

use std::sync::{Mutex, PoisonError};

use omakase_store::Storage;
use tracing::{debug, warn};

use crate::cart::CartItem;
use crate::error::CartError;
use crate::query::{CacheObserver, QueryState};
use crate::wire::CartSnapshot;

/// Default storage key holding the mirrored cart.
pub const DEFAULT_MIRROR_KEY: &str = "carrinho";

/// Persists cart items as a JSON array under one key.
#[derive(Debug)]
pub struct CartMirror {
    storage: Storage,
    key: String,
    /// Cache version of the last snapshot written through.
    mirrored_version: Mutex<u64>,
}

impl CartMirror {
    /// Create a mirror using the default key.
    pub fn new(storage: Storage) -> Self {
        Self::with_key(storage, DEFAULT_MIRROR_KEY)
    }

    /// Create a mirror using a custom key.
    pub fn with_key(storage: Storage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            mirrored_version: Mutex::new(0),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Persist the items. Failures are logged and swallowed.
    pub fn save(&self, items: &[CartItem]) {
        match self.storage.set(&self.key, items) {
            Ok(()) => debug!(key = %self.key, items = items.len(), "cart mirrored"),
            Err(e) => warn!(key = %self.key, error = %e, "failed to mirror cart"),
        }
    }

    /// Persist the lines of a snapshot.
    pub fn save_snapshot(&self, snapshot: &CartSnapshot) {
        let items: Vec<CartItem> = snapshot.lines.iter().map(CartItem::from_line).collect();
        self.save(&items);
    }

    /// Read the mirrored items, surfacing storage and decode failures.
    pub fn try_load(&self) -> Result<Vec<CartItem>, CartError> {
        Ok(self.storage.get(&self.key)?.unwrap_or_default())
    }

    /// Read the mirrored items. Missing or unreadable data yields an empty cart.
    pub fn load(&self) -> Vec<CartItem> {
        self.try_load().unwrap_or_else(|e| {
            warn!(key = %self.key, error = %e, "discarding unreadable cart mirror");
            Vec::new()
        })
    }

    /// Remove the mirrored cart.
    pub fn clear(&self) {
        if let Err(e) = self.storage.delete(&self.key) {
            warn!(key = %self.key, error = %e, "failed to clear cart mirror");
        }
    }
}

impl CacheObserver for CartMirror {
    /// Write the snapshot through unless a newer one is already mirrored.
    fn on_change(&self, state: &QueryState) {
        let Some(data) = &state.data else {
            return;
        };
        let mut mirrored = self
            .mirrored_version
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if state.version < *mirrored {
            debug!(
                version = state.version,
                mirrored = *mirrored,
                "skipping out-of-order cart mirror write"
            );
            return;
        }
        self.save_snapshot(data);
        *mirrored = state.version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;
    use crate::money::Money;
    use crate::query::DataOrigin;
    use omakase_store::{FileStore, MemoryStore};

    fn temaki(quantity: u32) -> CartItem {
        CartItem {
            product: Product::new(1u64, "Temaki", Money::from_decimal(20.0), "temaki.png"),
            quantity,
            notes: "sem gergelim".to_string(),
            line_total: Money::from_decimal(20.0).prorate(1, quantity),
        }
    }

    #[test]
    fn test_save_then_load() {
        let mirror = CartMirror::new(Storage::new(MemoryStore::new()));
        let items = vec![temaki(2)];

        mirror.save(&items);
        assert_eq!(mirror.load(), items);
    }

    #[test]
    fn test_empty_cart_round_trips() {
        let mirror = CartMirror::new(Storage::new(MemoryStore::new()));

        mirror.save(&[]);
        assert!(mirror.load().is_empty());
        assert!(mirror.try_load().unwrap().is_empty());
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let mirror = CartMirror::new(Storage::new(MemoryStore::new()));
        assert!(mirror.load().is_empty());
    }

    #[test]
    fn test_corrupt_mirror_loads_empty() {
        let storage = Storage::new(MemoryStore::new());
        storage.set_string(DEFAULT_MIRROR_KEY, "{not json").unwrap();
        let mirror = CartMirror::new(storage);

        assert!(mirror.try_load().is_err());
        assert!(mirror.load().is_empty());
    }

    #[test]
    fn test_clear_removes_key() {
        let storage = Storage::new(MemoryStore::new());
        let mirror = CartMirror::new(storage.clone());
        mirror.save(&[temaki(1)]);

        mirror.clear();
        assert!(!storage.exists(DEFAULT_MIRROR_KEY).unwrap());
    }

    fn written(version: u64, item: &CartItem) -> QueryState {
        QueryState {
            data: Some(CartSnapshot {
                lines: vec![item.to_line()],
                ..CartSnapshot::empty()
            }),
            origin: Some(DataOrigin::Optimistic),
            version,
            ..QueryState::default()
        }
    }

    #[test]
    fn test_observer_keeps_newest_write() {
        let mirror = CartMirror::new(Storage::new(MemoryStore::new()));

        mirror.on_change(&written(2, &temaki(5)));
        mirror.on_change(&written(1, &temaki(1)));

        assert_eq!(mirror.load(), vec![temaki(5)]);

        mirror.on_change(&written(3, &temaki(2)));
        assert_eq!(mirror.load(), vec![temaki(2)]);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let items = vec![temaki(3)];

        CartMirror::new(Storage::new(FileStore::open(dir.path()).unwrap())).save(&items);

        let reopened = CartMirror::new(Storage::new(FileStore::open(dir.path()).unwrap()));
        assert_eq!(reopened.load(), items);
    }
}
