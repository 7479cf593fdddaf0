//! Authentication extractors.
//!
//! Shoppers send their login session as `Authorization: Bearer <token>`.
//! Admins send either an admin session token the same way or HTTP Basic
//! credentials; the two token spaces never overlap.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use base64::{Engine, engine::general_purpose::STANDARD};

use makhana_core::models::User;

use super::client_ip::ClientIp;
use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Extractor that requires a logged-in shopper.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let user = state
            .storage()
            .session_user(token)
            .await
            .ok_or_else(|| AppError::Unauthorized("Invalid session".to_string()))?;

        set_sentry_user(&user.id, Some(user.email.as_str()));
        Ok(Self(user))
    }
}

/// An authenticated admin.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub username: String,
}

/// Extractor that requires admin authentication.
///
/// A valid admin session token passes straight through. Otherwise Basic
/// credentials are checked, subject to the per-client lockout.
pub struct RequireAdmin(pub AdminIdentity);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(token) = bearer_token(&parts.headers)
            && let Some(session) = state.admin().session(token).await
        {
            return Ok(Self(AdminIdentity {
                username: session.username,
            }));
        }

        let Some((username, password)) = basic_credentials(&parts.headers) else {
            return Err(AppError::Unauthorized(
                "Admin authentication required".to_string(),
            ));
        };

        let Ok(ClientIp(client)) = ClientIp::from_request_parts(parts, state).await;
        state.admin().login(client, &username, &password).await?;

        Ok(Self(AdminIdentity { username }))
    }
}

/// Token from an `Authorization: Bearer` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Username and password from an `Authorization: Basic` header.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let encoded = headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
