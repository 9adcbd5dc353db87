//! Cart service, provider and consumer handles.
//!
//! A [`CartProvider`] is built once at the application boundary and owns the
//! [`CartService`]. Consumers receive [`CartHandle`]s explicitly; a handle
//! that outlives its provider is a composition bug and panics on use.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use omakase_http::{FetchClient, ReqwestTransport, Transport};
use omakase_store::{SessionId, SessionIdentity, Storage};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::api::CartApi;
use crate::cart::{CartItem, CartView};
use crate::catalog::Product;
use crate::config::CartConfig;
use crate::error::CartError;
use crate::ids::ProductId;
use crate::mirror::CartMirror;
use crate::money::Money;
use crate::mutation::{CartMutations, MutationReport};
use crate::query::{CartQuery, CartQueryCache, DataOrigin, QueryResult, QueryState};

/// Read/write cart API for UI consumers.
#[derive(Debug)]
pub struct CartService {
    identity: Arc<SessionIdentity>,
    cache: Arc<CartQueryCache>,
    query: CartQuery,
    mutations: CartMutations,
    mirror: Arc<CartMirror>,
    mounted: AtomicBool,
}

impl CartService {
    /// Wire a service over an arbitrary transport.
    pub fn new(
        config: &CartConfig,
        storage: Storage,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, CartError> {
        config.validate()?;

        let identity = Arc::new(SessionIdentity::with_key(
            storage.clone(),
            config.session_key.clone(),
        ));
        let client = FetchClient::from_arc(transport)
            .with_base_url(config.api_url.clone())
            .with_default_header("Accept", "application/json");
        let api = CartApi::new(client, Arc::clone(&identity), config);

        let cache = Arc::new(CartQueryCache::new(config.stale_time()));
        let mirror = Arc::new(CartMirror::with_key(storage, config.mirror_key.clone()));
        cache.add_observer(mirror.clone());

        let query = CartQuery::new(Arc::clone(&cache), api);
        let mutations = CartMutations::new(query.clone());

        Ok(Self {
            identity,
            cache,
            query,
            mutations,
            mirror,
            mounted: AtomicBool::new(false),
        })
    }

    /// Wire a service over HTTP.
    pub fn connect(config: &CartConfig, storage: Storage) -> Result<Self, CartError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::new(config, storage, Arc::new(transport))
    }

    /// Rehydrate the cache from the mirror. Runs at most once per service.
    ///
    /// Skipped once a backend read has landed, since server data wins from
    /// then on. Hydrated data stays stale, so the next fetch still reads the
    /// backend. Returns whether anything was hydrated.
    pub fn mount(&self) -> bool {
        if self.mounted.swap(true, Ordering::SeqCst) {
            return false;
        }
        if self.cache.state().has_server_data() {
            debug!("server data present, skipping mirror hydration");
            return false;
        }

        let items = self.mirror.load();
        if items.is_empty() {
            return false;
        }

        debug!(items = items.len(), "hydrating cart from mirror");
        self.cache.patch(DataOrigin::Mirror, |data| {
            data.lines = items.iter().map(CartItem::to_line).collect();
        });
        true
    }

    /// Snapshot of everything a consumer renders.
    pub fn view(&self) -> CartView {
        let state = self.cache.state();
        CartView::new(state.data.as_ref(), state.is_loading(), state.is_error())
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.view().items
    }

    pub fn subtotal(&self) -> Money {
        self.cache.data().map(|d| d.subtotal).unwrap_or_default()
    }

    pub fn total_with_shipping(&self) -> Money {
        self.cache
            .data()
            .map(|d| d.total_with_shipping)
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.cache.state().is_loading()
    }

    pub fn is_error(&self) -> bool {
        self.cache.state().is_error()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u32 {
        self.view().item_count()
    }

    /// Read the cart, honoring the stale time.
    pub async fn fetch(&self) -> QueryResult {
        self.query.fetch().await
    }

    /// Read the cart from the backend now.
    pub async fn refresh(&self) -> QueryResult {
        self.query.refetch().await
    }

    pub async fn add_item(
        &self,
        product: &Product,
        quantity: u32,
        notes: &str,
    ) -> Result<MutationReport, CartError> {
        self.mutations.add(product, quantity, notes).await
    }

    pub async fn update_quantity(
        &self,
        id: ProductId,
        delta: i64,
    ) -> Result<MutationReport, CartError> {
        self.mutations.update_quantity(id, delta).await
    }

    pub async fn remove_item(&self, id: ProductId) -> Result<MutationReport, CartError> {
        self.mutations.remove(id).await
    }

    /// Empty the cart locally. No backend call is made.
    pub fn clear_cart(&self) {
        // Reset first: the mirror observer persists the empty cart, and the
        // key must be gone afterwards.
        self.cache.reset();
        self.mirror.clear();
        info!("cart cleared");
    }

    /// Token scoping this cart on the backend.
    pub fn session_id(&self) -> SessionId {
        self.identity.session_id()
    }

    /// Watch cache state changes.
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.cache.subscribe()
    }

    pub fn cache(&self) -> &Arc<CartQueryCache> {
        &self.cache
    }

    pub fn mirror(&self) -> &CartMirror {
        &self.mirror
    }
}

/// Owns the cart service for the lifetime of the application.
#[derive(Debug)]
pub struct CartProvider {
    service: Arc<CartService>,
}

impl CartProvider {
    /// Take ownership of a service and mount it.
    pub fn new(service: CartService) -> Self {
        service.mount();
        Self {
            service: Arc::new(service),
        }
    }

    /// Hand out a consumer handle.
    pub fn handle(&self) -> CartHandle {
        CartHandle {
            service: Arc::downgrade(&self.service),
        }
    }

    pub fn service(&self) -> &Arc<CartService> {
        &self.service
    }
}

/// Consumer-side reference to a provider's cart.
#[derive(Debug, Clone)]
pub struct CartHandle {
    service: Weak<CartService>,
}

impl CartHandle {
    /// The provider's service.
    ///
    /// # Panics
    ///
    /// Panics if the provider has been dropped.
    #[track_caller]
    pub fn service(&self) -> Arc<CartService> {
        match self.service.upgrade() {
            Some(service) => service,
            None => panic!("CartHandle used after its CartProvider was dropped"),
        }
    }

    /// The provider's service, if it is still alive.
    pub fn try_service(&self) -> Option<Arc<CartService>> {
        self.service.upgrade()
    }

    #[track_caller]
    pub fn view(&self) -> CartView {
        self.service().view()
    }

    #[track_caller]
    pub fn items(&self) -> Vec<CartItem> {
        self.service().items()
    }

    #[track_caller]
    pub fn subtotal(&self) -> Money {
        self.service().subtotal()
    }

    #[track_caller]
    pub fn total_with_shipping(&self) -> Money {
        self.service().total_with_shipping()
    }

    #[track_caller]
    pub fn is_loading(&self) -> bool {
        self.service().is_loading()
    }

    #[track_caller]
    pub fn is_error(&self) -> bool {
        self.service().is_error()
    }

    #[track_caller]
    pub fn item_count(&self) -> u32 {
        self.service().item_count()
    }

    #[track_caller]
    pub fn session_id(&self) -> SessionId {
        self.service().session_id()
    }

    #[track_caller]
    pub fn clear_cart(&self) {
        self.service().clear_cart()
    }

    pub async fn fetch(&self) -> QueryResult {
        self.service().fetch().await
    }

    pub async fn refresh(&self) -> QueryResult {
        self.service().refresh().await
    }

    pub async fn add_item(
        &self,
        product: &Product,
        quantity: u32,
        notes: &str,
    ) -> Result<MutationReport, CartError> {
        self.service().add_item(product, quantity, notes).await
    }

    pub async fn update_quantity(
        &self,
        id: ProductId,
        delta: i64,
    ) -> Result<MutationReport, CartError> {
        self.service().update_quantity(id, delta).await
    }

    pub async fn remove_item(&self, id: ProductId) -> Result<MutationReport, CartError> {
        self.service().remove_item(id).await
    }
}
