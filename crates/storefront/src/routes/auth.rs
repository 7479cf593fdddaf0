//! Shopper authentication route handlers.
//!
//! Login and registration return a `sessionId` that the client sends back
//! as `Authorization: Bearer <sessionId>`.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use makhana_core::models::{Session, User, UserProfile};

use super::message;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireUser, bearer_token};
use crate::services::auth::{AuthService, Login, Registration};
use crate::state::AppState;

/// Response to a successful login or registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserProfile,
    pub session_id: String,
}

impl AuthResponse {
    fn new(user: &User, session: Session) -> Self {
        set_sentry_user(&user.id, Some(user.email.as_str()));
        Self {
            user: user.profile(),
            session_id: session.session_id,
        }
    }
}

/// Create an account and log in.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<Registration>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let (user, session) = AuthService::new(state.storage()).register(form).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::new(&user, session))))
}

/// Log in with email and password.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<Login>,
) -> Result<Json<AuthResponse>> {
    let (user, session) = AuthService::new(state.storage()).login(form).await?;
    Ok(Json(AuthResponse::new(&user, session)))
}

/// End the caller's session, if any.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    if let Some(token) = bearer_token(&headers) {
        AuthService::new(state.storage()).logout(token).await?;
    }
    clear_sentry_user();
    Ok(message("Logged out successfully"))
}

/// The logged-in shopper's profile.
pub async fn me(RequireUser(user): RequireUser) -> Json<UserProfile> {
    Json(user.profile())
}
