//! Order route handlers.
//!
//! Shoppers place orders and anyone can track one by number; listing and
//! status changes are admin-only.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use makhana_core::models::{NewOrder, Order, OrderTracking};
use makhana_core::{OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::state::AppState;

/// Body of a status change.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

fn not_found() -> AppError {
    AppError::NotFound("Order not found".to_string())
}

/// Every order.
pub async fn index(_admin: RequireAdmin, State(state): State<AppState>) -> Json<Vec<Order>> {
    Json(state.storage().orders().await)
}

/// One order.
pub async fn show(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    state.storage().order(id).await.map(Json).ok_or_else(not_found)
}

/// Place an order for the logged-in shopper.
///
/// Any `userId` in the body is replaced by the session's user.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(new): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>)> {
    let new = NewOrder {
        user_id: Some(user.id),
        ..new
    };
    let order = state.storage().create_order(new).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Set an order's status. Any status may follow any other.
#[instrument(skip(_admin, state))]
pub async fn update_status(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<Order>> {
    let status = body
        .status
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Status is required".to_string()))?;
    let status: OrderStatus = status
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid status: {status}")))?;

    state
        .storage()
        .update_order_status(id, status)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Public tracking view of an order.
#[instrument(skip(state))]
pub async fn track(
    State(state): State<AppState>,
    Path(tracking_number): Path<String>,
) -> Result<Json<OrderTracking>> {
    state
        .storage()
        .order_by_tracking_number(&tracking_number)
        .await
        .map(|order| Json(OrderTracking::from(&order)))
        .ok_or_else(|| AppError::NotFound("Order not found with this tracking number".to_string()))
}
