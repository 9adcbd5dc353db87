//! The add, remove and update-quantity flows.

use omakase_http::FetchError;
use serde::Serialize;
use tracing::{info, warn};

use crate::cart::next_quantity;
use crate::catalog::Product;
use crate::error::CartError;
use crate::ids::ProductId;
use crate::mutation::machine::{MutationKind, MutationPhase, OptimisticMutation, RollbackOutcome};
use crate::query::CartQuery;
use crate::wire::{AddItemRequest, UpdateQuantityRequest};

/// How a mutation flow ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationReport {
    /// Flow that actually ran. An add for a product already in the cart
    /// reports `UpdateQuantity`.
    pub kind: MutationKind,
    pub product_id: ProductId,
    pub phase: MutationPhase,
    pub rollback: Option<RollbackOutcome>,
    /// False when the flow had nothing to send.
    pub request_sent: bool,
    /// Quantity sent to the backend, for add and update flows.
    pub quantity: Option<u32>,
}

/// Runs mutation flows against the backend and the shared cache.
///
/// Each flow is optimistic-apply, send, reconcile. Distinct flows are not
/// serialized against one another; stale rollbacks are detected by version
/// instead.
#[derive(Debug, Clone)]
pub struct CartMutations {
    query: CartQuery,
}

impl CartMutations {
    /// Create the pipeline over a query.
    pub fn new(query: CartQuery) -> Self {
        Self { query }
    }

    /// Add `quantity` units of `product`.
    ///
    /// If the cart already has a line for the product this becomes an
    /// update-quantity with `quantity` as the delta. Otherwise nothing is
    /// written locally until the backend accepts the item.
    pub async fn add(
        &self,
        product: &Product,
        quantity: u32,
        notes: &str,
    ) -> Result<MutationReport, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let existing = self
            .query
            .cache()
            .data()
            .is_some_and(|data| data.contains(product.id));
        if existing {
            return self.update_quantity(product.id, i64::from(quantity)).await;
        }

        let mut mutation = OptimisticMutation::new(MutationKind::Add, product.id);
        let request = AddItemRequest::new(product, quantity, notes);

        match self.query.api().add_item(&request).await {
            Ok(_) => {
                mutation.commit()?;
                info!(product_id = %product.id, quantity, "item added to cart");
                self.query.reconcile().await;
                Ok(MutationReport {
                    kind: MutationKind::Add,
                    product_id: product.id,
                    phase: mutation.phase(),
                    rollback: None,
                    request_sent: true,
                    quantity: Some(quantity),
                })
            }
            Err(source) => {
                warn!(product_id = %product.id, error = %source, "add to cart failed");
                Err(CartError::MutationFailed {
                    kind: MutationKind::Add,
                    product_id: product.id,
                    rollback: None,
                    source,
                })
            }
        }
    }

    /// Remove the line for `id`, optimistically.
    pub async fn remove(&self, id: ProductId) -> Result<MutationReport, CartError> {
        let mut mutation = OptimisticMutation::new(MutationKind::Remove, id);
        mutation.apply(self.query.cache(), |data| {
            data.remove_line(id);
        })?;

        let result = self.query.api().remove_item(id).await;
        self.settle(mutation, result.map(|_| ()), None).await
    }

    /// Change the quantity of the line for `id` by `delta`, clamped to at
    /// least one. The line price is rescaled to keep the unit price.
    pub async fn update_quantity(
        &self,
        id: ProductId,
        delta: i64,
    ) -> Result<MutationReport, CartError> {
        let line = self
            .query
            .cache()
            .data()
            .and_then(|data| data.line(id).cloned())
            .ok_or(CartError::ItemNotInCart(id))?;

        let quantity = next_quantity(line.quantity, delta);
        if quantity == line.quantity {
            return Ok(MutationReport {
                kind: MutationKind::UpdateQuantity,
                product_id: id,
                phase: MutationPhase::Idle,
                rollback: None,
                request_sent: false,
                quantity: Some(quantity),
            });
        }
        let price = line.price.prorate(line.quantity, quantity);

        let mut mutation = OptimisticMutation::new(MutationKind::UpdateQuantity, id);
        mutation.apply(self.query.cache(), |data| {
            data.set_line_quantity(id, quantity, price);
        })?;

        let request = UpdateQuantityRequest { quantity, price };
        let result = self.query.api().update_quantity(id, &request).await;
        self.settle(mutation, result.map(|_| ()), Some(quantity)).await
    }

    async fn settle(
        &self,
        mut mutation: OptimisticMutation,
        result: Result<(), FetchError>,
        quantity: Option<u32>,
    ) -> Result<MutationReport, CartError> {
        let kind = mutation.kind();
        let product_id = mutation.product_id();

        let outcome = match result {
            Ok(()) => {
                mutation.commit()?;
                info!(%kind, %product_id, "cart mutation committed");
                Ok(None)
            }
            Err(source) => {
                let rollback = mutation.rollback(self.query.cache())?;
                warn!(%kind, %product_id, ?rollback, error = %source, "cart mutation rolled back");
                Err((rollback, source))
            }
        };

        self.query.reconcile().await;

        match outcome {
            Ok(rollback) => Ok(MutationReport {
                kind,
                product_id,
                phase: mutation.phase(),
                rollback,
                request_sent: true,
                quantity,
            }),
            Err((rollback, source)) => Err(CartError::MutationFailed {
                kind,
                product_id,
                rollback: Some(rollback),
                source,
            }),
        }
    }
}
