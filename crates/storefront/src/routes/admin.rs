//! Back-office session route handlers.

use axum::{Json, extract::State, http::HeaderMap};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::message;
use crate::middleware::{RequireAdmin, bearer_token};
use crate::state::AppState;

/// Response to a successful admin login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    pub message: &'static str,
    pub session_token: String,
    /// Unix timestamp in milliseconds.
    pub expires_at: i64,
}

/// Identity of the current admin.
#[derive(Debug, Serialize)]
pub struct AdminMe {
    pub username: String,
    pub authenticated: bool,
}

/// Exchange admin credentials for a session token.
#[instrument(skip_all, fields(username = %admin.username))]
pub async fn login(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> Json<AdminLoginResponse> {
    let (session_token, session) = state.admin().open_session(&admin.username).await;
    Json(AdminLoginResponse {
        message: "Admin authenticated successfully",
        session_token,
        expires_at: session.expires_at.timestamp_millis(),
    })
}

/// Close the admin session named by the Bearer token.
#[instrument(skip_all, fields(username = %admin.username))]
pub async fn logout(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<Value> {
    if let Some(token) = bearer_token(&headers)
        && state.admin().close_session(token).await
    {
        tracing::info!("Admin session closed");
    }
    message("Admin logged out successfully")
}

/// Who the current admin is.
pub async fn me(RequireAdmin(admin): RequireAdmin) -> Json<AdminMe> {
    Json(AdminMe {
        username: admin.username,
        authenticated: true,
    })
}
