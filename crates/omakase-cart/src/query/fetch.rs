//! Backend reads into the cart cache.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::CartApi;
use crate::query::cache::{CartQueryCache, QueryResult};

/// Couples the cache with the read side of the API.
#[derive(Debug, Clone)]
pub struct CartQuery {
    cache: Arc<CartQueryCache>,
    api: CartApi,
}

impl CartQuery {
    /// Create a query over a shared cache.
    pub fn new(cache: Arc<CartQueryCache>, api: CartApi) -> Self {
        Self { cache, api }
    }

    pub fn cache(&self) -> &Arc<CartQueryCache> {
        &self.cache
    }

    pub fn api(&self) -> &CartApi {
        &self.api
    }

    /// Read the cart, hitting the backend only if the entry is absent,
    /// invalidated, or older than the stale time.
    pub async fn fetch(&self) -> QueryResult {
        if !self.cache.needs_fetch() {
            debug!("cart is fresh, skipping read");
            return self.cache.state().result();
        }
        self.refetch().await
    }

    /// Read the cart from the backend.
    ///
    /// Only one read runs at a time: a call made while another read is in
    /// flight waits for that read and returns its outcome.
    pub async fn refetch(&self) -> QueryResult {
        let Some(ticket) = self.cache.begin_fetch() else {
            debug!("cart read in flight, joining it");
            return self.cache.settle().await.result();
        };
        let outcome = self.api.get_cart().await.map_err(|e| {
            warn!(error = %e, "cart read failed");
            e.to_string()
        });
        if !self.cache.finish_fetch(ticket, outcome) {
            debug!("cart read superseded");
        }
        self.cache.state().result()
    }

    /// Mark the entry stale. The next [`fetch`](Self::fetch) reads the backend.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// Invalidate and immediately read back server truth.
    pub async fn reconcile(&self) -> QueryResult {
        self.invalidate();
        self.refetch().await
    }
}
