//! Wishlist route handlers. All require a logged-in shopper.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;
use tracing::instrument;

use makhana_core::ProductId;
use makhana_core::models::Product;

use super::message;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Products on the shopper's wishlist.
pub async fn index(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Json<Vec<Product>> {
    Json(state.storage().wishlist(user.id).await)
}

/// Save a product to the wishlist. Adding it twice is harmless.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %product_id))]
pub async fn add(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Value>> {
    if state.storage().product(product_id).await.is_none() {
        return Err(AppError::NotFound("Product not found".to_string()));
    }
    state
        .storage()
        .add_to_wishlist(user.id, product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(message("Product added to wishlist"))
}

/// Drop a product from the wishlist.
#[instrument(skip_all, fields(user_id = %user.id, product_id = %product_id))]
pub async fn remove(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Value>> {
    state
        .storage()
        .remove_from_wishlist(user.id, product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(message("Product removed from wishlist"))
}
