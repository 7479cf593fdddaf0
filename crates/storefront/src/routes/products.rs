//! Product route handlers.
//!
//! Reads are public; writes require an admin.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use makhana_core::ProductId;
use makhana_core::models::{NewProduct, Product, ProductUpdate, ProductWithCategory};
use makhana_storage::recommend::DEFAULT_LIMIT;

use super::message;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Listing filters. `search` wins over `featured`, which wins over `category`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub featured: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<usize>,
}

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

/// List products, optionally searched or filtered.
///
/// An unknown category slug lists every product.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Json<Vec<Product>> {
    let storage = state.storage();

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        return Json(storage.search_products(search).await);
    }
    if query.featured.as_deref() == Some("true") {
        return Json(storage.featured_products().await);
    }
    let category = match query.category.as_deref() {
        Some(slug) => storage.category_by_slug(slug).await.map(|c| c.id),
        None => None,
    };
    Json(storage.products(category).await)
}

/// Every product joined with its category.
pub async fn with_category(State(state): State<AppState>) -> Json<Vec<ProductWithCategory>> {
    Json(state.storage().products_with_category().await)
}

/// One product with its category.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductWithCategory>> {
    state
        .storage()
        .product_with_category(id)
        .await
        .map(Json)
        .ok_or_else(not_found)
}

/// Products similar to the given one, best match first.
#[instrument(skip(state))]
pub async fn recommendations(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<Vec<Product>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    state
        .storage()
        .recommendations(id, limit)
        .await
        .map(Json)
        .ok_or_else(not_found)
}

/// Create a product.
#[instrument(skip(_admin, state))]
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(new): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let mut errors = Vec::new();
    if new.name.trim().is_empty() {
        errors.push("Name is required".to_string());
    }
    if new.sku.trim().is_empty() {
        errors.push("SKU is required".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let product = state.storage().create_product(new).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Partially update a product.
#[instrument(skip(_admin, state))]
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>> {
    state
        .storage()
        .update_product(id, update)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Delete a product. Cart rows and wishlists referring to it are left alone.
#[instrument(skip(_admin, state))]
pub async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    if state.storage().delete_product(id).await? {
        Ok(message("Product deleted successfully"))
    } else {
        Err(not_found())
    }
}
