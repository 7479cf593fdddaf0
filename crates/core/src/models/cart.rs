//! Shopping cart rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Product;
use crate::{CartItemId, ProductId};

/// One product line in a shopper's cart.
///
/// Rows are keyed by `(session_id, product_id)`; adding the same product
/// again increments `quantity` instead of creating a second row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    /// Client-generated cart identifier, not a login session.
    pub session_id: String,
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Payload for adding a product to a cart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub session_id: String,
    pub product_id: ProductId,
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl NewCartItem {
    /// Requested quantity; missing or zero means one.
    #[must_use]
    pub fn requested_quantity(&self) -> u32 {
        self.quantity.filter(|&q| q > 0).unwrap_or(1)
    }
}

/// A cart row joined with its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemWithProduct {
    #[serde(flatten)]
    pub item: CartItem,
    pub product: Product,
}
