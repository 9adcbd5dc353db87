//! Menu products as seen by the cart.

use serde::{Deserialize, Serialize};

use crate::ids::ProductId;
use crate::money::Money;

/// A product from the menu.
///
/// Immutable once fetched. Carts hold a copy taken at add-time, never a live
/// reference, so later catalog changes don't alter cart contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Server-assigned identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Image reference (URL or asset path).
    #[serde(default)]
    pub image: String,
}

impl Product {
    /// Create a product.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: image.into(),
        }
    }
}
