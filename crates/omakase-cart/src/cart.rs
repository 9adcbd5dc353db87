//! Cart items and the derived cart view.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::ids::ProductId;
use crate::money::Money;
use crate::wire::{CartLine, CartSnapshot};

/// Smallest quantity a cart line can hold.
pub const MIN_QUANTITY: u32 = 1;

/// A line in the cart.
///
/// Owns a snapshot of the product taken when it was added. At most one item
/// per product id exists in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product snapshot; `price` is the unit price.
    pub product: Product,
    /// Quantity, always at least [`MIN_QUANTITY`].
    pub quantity: u32,
    /// Free-text kitchen notes.
    #[serde(default)]
    pub notes: String,
    /// Unit price times quantity, as priced by the backend.
    pub line_total: Money,
}

impl CartItem {
    /// Map a backend line into the cart item shape.
    pub fn from_line(line: &CartLine) -> Self {
        Self {
            product: Product {
                id: line.id,
                name: line.name.clone(),
                price: line.price.prorate(line.quantity, 1),
                image: line.image.clone(),
            },
            quantity: line.quantity,
            notes: line.notes.clone().unwrap_or_default(),
            line_total: line.price,
        }
    }

    /// Map back into the backend line shape.
    pub fn to_line(&self) -> CartLine {
        CartLine {
            id: self.product.id,
            name: self.product.name.clone(),
            image: self.product.image.clone(),
            price: self.line_total,
            quantity: self.quantity,
            notes: Some(self.notes.clone()),
        }
    }

    /// Product id of this line.
    pub fn id(&self) -> ProductId {
        self.product.id
    }
}

/// Quantity after applying `delta`, clamped to [`MIN_QUANTITY`].
///
/// Decrementing below the minimum has no effect; it never removes the line.
pub fn next_quantity(current: u32, delta: i64) -> u32 {
    let next = i64::from(current).saturating_add(delta);
    next.clamp(i64::from(MIN_QUANTITY), i64::from(u32::MAX)) as u32
}

/// What UI consumers render.
///
/// Has the same shape whether the cart is loading, failed, or loaded; missing
/// data shows up as an empty list and zero totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub subtotal: Money,
    pub total_with_shipping: Money,
    pub is_loading: bool,
    pub is_error: bool,
}

impl CartView {
    /// Build a view from the cached snapshot and query flags.
    pub fn new(snapshot: Option<&CartSnapshot>, is_loading: bool, is_error: bool) -> Self {
        match snapshot {
            Some(snapshot) => Self {
                items: snapshot.lines.iter().map(CartItem::from_line).collect(),
                subtotal: snapshot.subtotal,
                total_with_shipping: snapshot.total_with_shipping,
                is_loading,
                is_error,
            },
            None => Self {
                is_loading,
                is_error,
                ..Self::default()
            },
        }
    }

    /// Total number of units in the cart.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
