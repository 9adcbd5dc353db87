//! Cart error types.

use omakase_http::FetchError;
use omakase_store::StoreError;
use thiserror::Error;

use crate::ids::ProductId;
use crate::mutation::{MutationKind, MutationPhase, RollbackOutcome};

/// Errors that can occur in cart operations.
///
/// Using a cart handle after its provider is gone is a programming error and
/// panics instead of producing one of these.
#[derive(Error, Debug)]
pub enum CartError {
    /// Reading the cart failed (non-2xx or transport error).
    #[error("Cart request failed: {0}")]
    Network(#[from] FetchError),

    /// A mutation was rejected by the backend or never reached it.
    #[error("{kind} failed for product {product_id}: {source}")]
    MutationFailed {
        kind: MutationKind,
        product_id: ProductId,
        /// What happened to the optimistic write, if one was made.
        rollback: Option<RollbackOutcome>,
        #[source]
        source: FetchError,
    },

    /// Quantity outside the allowed range.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// No line for this product in the current cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(ProductId),

    /// Mutation state machine misuse.
    #[error("Invalid mutation transition from {from} to {to}")]
    InvalidMutationTransition {
        from: MutationPhase,
        to: MutationPhase,
    },

    /// Local storage failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Configuration is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
