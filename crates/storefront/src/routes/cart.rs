//! Cart route handlers.
//!
//! Carts are keyed by a client-generated session id in the path, which is
//! unrelated to login sessions, so these routes need no authentication.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use makhana_core::ProductId;
use makhana_core::models::{CartItem, CartItemWithProduct, NewCartItem};

use super::message;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Body of a quantity change.
#[derive(Debug, Deserialize)]
pub struct QuantityUpdate {
    pub quantity: i64,
}

fn item_not_found() -> AppError {
    AppError::NotFound("Cart item not found".to_string())
}

/// Rows of a cart with their products.
pub async fn show(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Vec<CartItemWithProduct>> {
    Json(state.storage().cart_items(&session_id).await)
}

/// Add a product, merging with an existing row for the same product.
///
/// Answers 201 even when an existing row was incremented.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Json(new): Json<NewCartItem>,
) -> Result<(StatusCode, Json<CartItem>)> {
    if new.session_id.trim().is_empty() {
        return Err(AppError::Validation(vec![
            "Session ID is required".to_string(),
        ]));
    }
    if state.storage().product(new.product_id).await.is_none() {
        return Err(AppError::NotFound("Product not found".to_string()));
    }
    let item = state.storage().add_to_cart(new).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Set a row's quantity. Zero removes the row.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Path((session_id, product_id)): Path<(String, ProductId)>,
    Json(body): Json<QuantityUpdate>,
) -> Result<Response> {
    let quantity = u32::try_from(body.quantity)
        .map_err(|_| AppError::BadRequest("Invalid quantity".to_string()))?;

    if quantity == 0 {
        return remove(State(state), Path((session_id, product_id)))
            .await
            .map(IntoResponse::into_response);
    }

    let item = state
        .storage()
        .update_cart_item(&session_id, product_id, quantity)
        .await?
        .ok_or_else(item_not_found)?;
    Ok(Json(item).into_response())
}

/// Remove one product from a cart.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path((session_id, product_id)): Path<(String, ProductId)>,
) -> Result<Json<Value>> {
    if state
        .storage()
        .remove_from_cart(&session_id, product_id)
        .await?
    {
        Ok(message("Item removed from cart"))
    } else {
        Err(item_not_found())
    }
}

/// Empty a cart.
#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>> {
    state.storage().clear_cart(&session_id).await?;
    Ok(message("Cart cleared"))
}
