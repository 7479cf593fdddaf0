//! Category route handlers.
//!
//! Reads are public; writes require an admin.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;
use tracing::instrument;

use makhana_core::CategoryId;
use makhana_core::models::{Category, CategoryUpdate, NewCategory};

use super::message;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::NotFound("Category not found".to_string())
}

/// All categories.
pub async fn index(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.storage().categories().await)
}

/// One category by slug.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Category>> {
    state
        .storage()
        .category_by_slug(&slug)
        .await
        .map(Json)
        .ok_or_else(not_found)
}

/// Create a category.
#[instrument(skip(_admin, state))]
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(new): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>)> {
    let mut errors = Vec::new();
    if new.name.trim().is_empty() {
        errors.push("Name is required".to_string());
    }
    if new.slug.trim().is_empty() {
        errors.push("Slug is required".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let category = state.storage().create_category(new).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Partially update a category.
#[instrument(skip(_admin, state))]
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(update): Json<CategoryUpdate>,
) -> Result<Json<Category>> {
    state
        .storage()
        .update_category(id, update)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Delete a category no product uses.
#[instrument(skip(_admin, state))]
pub async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Value>> {
    if state.storage().delete_category(id).await? {
        Ok(message("Category deleted successfully"))
    } else {
        Err(not_found())
    }
}
