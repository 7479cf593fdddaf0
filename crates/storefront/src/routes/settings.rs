//! Site setting route handlers.
//!
//! Reads are public so the storefront can render them; writes require an admin.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use makhana_core::models::{NewSetting, Setting};

use super::message;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Body of a value change. Kept loose so a non-string gets a clear message.
#[derive(Debug, Deserialize)]
pub struct ValueUpdate {
    #[serde(default)]
    pub value: Value,
}

fn not_found() -> AppError {
    AppError::NotFound("Setting not found".to_string())
}

/// Every setting.
pub async fn index(State(state): State<AppState>) -> Json<Vec<Setting>> {
    Json(state.storage().settings().await)
}

/// One setting by key.
pub async fn show(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Setting>> {
    state
        .storage()
        .setting(&key)
        .await
        .map(Json)
        .ok_or_else(not_found)
}

/// Create a setting with a new key.
#[instrument(skip(_admin, state))]
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(new): Json<NewSetting>,
) -> Result<(StatusCode, Json<Setting>)> {
    if new.key.trim().is_empty() {
        return Err(AppError::Validation(vec!["Key is required".to_string()]));
    }
    let setting = state.storage().create_setting(new).await?;
    Ok((StatusCode::CREATED, Json(setting)))
}

/// Replace a setting's value.
#[instrument(skip(_admin, state))]
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<ValueUpdate>,
) -> Result<Json<Setting>> {
    let Value::String(value) = body.value else {
        return Err(AppError::BadRequest("Value must be a string".to_string()));
    };
    state
        .storage()
        .update_setting(&key, value)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Delete a setting.
#[instrument(skip(_admin, state))]
pub async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>> {
    if state.storage().delete_setting(&key).await? {
        Ok(message("Setting deleted successfully"))
    } else {
        Err(not_found())
    }
}
