//! Backend payload shapes.
//!
//! The backend speaks Portuguese field names; they stay confined to the serde
//! renames below. Everything else in the crate uses [`CartItem`].
//!
//! [`CartItem`]: crate::cart::CartItem

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::ids::ProductId;
use crate::money::Money;

/// Response of `GET /cart`, and the value held by the query cache.
///
/// Every field is optional on input so `{}` decodes to an empty cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Lines in the cart.
    #[serde(rename = "carrinho", default)]
    pub lines: Vec<CartLine>,
    /// Server-computed subtotal.
    #[serde(rename = "valorTotal", default)]
    pub subtotal: Money,
    /// Server-computed total including shipping.
    #[serde(rename = "valorTotalFrete", default)]
    pub total_with_shipping: Money,
}

impl CartSnapshot {
    /// An empty cart with zero totals.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Find the line for a product.
    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Check if the cart has a line for a product.
    pub fn contains(&self, id: ProductId) -> bool {
        self.line(id).is_some()
    }

    /// Drop the line for a product. Returns whether anything was removed.
    pub fn remove_line(&mut self, id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != id);
        self.lines.len() < before
    }

    /// Set quantity and line price for a product. Returns whether the line exists.
    pub fn set_line_quantity(&mut self, id: ProductId, quantity: u32, price: Money) -> bool {
        match self.lines.iter_mut().find(|l| l.id == id) {
            Some(line) => {
                line.quantity = quantity;
                line.price = price;
                true
            }
            None => false,
        }
    }
}

/// One cart line as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "imagem", default)]
    pub image: String,
    /// Line total (unit price times quantity).
    #[serde(rename = "preco")]
    pub price: Money,
    #[serde(rename = "quantidadeCarrinho")]
    pub quantity: u32,
    #[serde(rename = "observacoes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `POST /cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItemRequest {
    pub id: ProductId,
    #[serde(rename = "nome")]
    pub name: String,
    /// Unit price; the backend computes the line total.
    #[serde(rename = "preco")]
    pub price: Money,
    #[serde(rename = "imagem")]
    pub image: String,
    #[serde(rename = "quantidadeCarrinho")]
    pub quantity: u32,
    #[serde(rename = "observacoes")]
    pub notes: String,
}

impl AddItemRequest {
    /// Build the payload for adding `quantity` units of `product`.
    pub fn new(product: &Product, quantity: u32, notes: impl Into<String>) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity,
            notes: notes.into(),
        }
    }
}

/// Body of `PUT /cart/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQuantityRequest {
    #[serde(rename = "quantidadeCarrinho")]
    pub quantity: u32,
    /// New line total.
    #[serde(rename = "preco")]
    pub price: Money,
}
