//! Shopping-cart synchronization for the Omakase storefront.
//!
//! Keeps one session's cart consistent across three places:
//!
//! - **Backend**: stateless REST service keyed by a session token
//! - **Query cache**: single in-memory slot every consumer renders from
//! - **Mirror**: session-store copy that survives a reload
//!
//! Mutations are applied to the cache optimistically, sent to the backend,
//! and rolled back on failure. Every flow ends by reading back server truth.
//!
//! # Example
//!
//! ```rust,ignore
//! use omakase_cart::prelude::*;
//! use omakase_store::{FileStore, Storage};
//!
//! let storage = Storage::new(FileStore::open(".omakase/session")?);
//! let service = CartService::connect(&CartConfig::from_env(), storage)?;
//! let provider = CartProvider::new(service);
//!
//! // Pass handles to consumers
//! let cart = provider.handle();
//! cart.fetch().await;
//!
//! let temaki = Product::new(1u64, "Temaki", Money::from_decimal(20.0), "temaki.png");
//! cart.add_item(&temaki, 2, "").await?;
//! cart.update_quantity(temaki.id, 1).await?;
//!
//! println!("{} items, total {}", cart.item_count(), cart.total_with_shipping());
//! ```

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod facade;
pub mod ids;
pub mod mirror;
pub mod money;
pub mod mutation;
pub mod query;
pub mod wire;

pub use api::CartApi;
pub use cart::{next_quantity, CartItem, CartView, MIN_QUANTITY};
pub use catalog::Product;
pub use config::{CartConfig, API_URL_ENV};
pub use error::CartError;
pub use facade::{CartHandle, CartProvider, CartService};
pub use ids::ProductId;
pub use mirror::{CartMirror, DEFAULT_MIRROR_KEY};
pub use money::Money;
pub use mutation::{
    CartMutations, MutationKind, MutationPhase, MutationReport, OptimisticMutation,
    RollbackOutcome,
};
pub use query::{
    CacheObserver, CartQuery, CartQueryCache, DataOrigin, QueryResult, QueryState, QueryStatus,
};
pub use wire::{AddItemRequest, CartLine, CartSnapshot, UpdateQuantityRequest};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CartError;
    pub use crate::ids::ProductId;
    pub use crate::money::Money;

    pub use crate::cart::{CartItem, CartView};
    pub use crate::catalog::Product;
    pub use crate::config::CartConfig;
    pub use crate::facade::{CartHandle, CartProvider, CartService};
    pub use crate::mutation::{MutationKind, MutationPhase, MutationReport, RollbackOutcome};
    pub use crate::query::{QueryResult, QueryStatus};
}
