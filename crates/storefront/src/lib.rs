//! Makhana Storefront library.
//!
//! The JSON API over the Makhana datastore, provided as a library so the
//! binary, the CLI and the integration tests build the same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, body::Body, middleware as axum_middleware, routing::get};
use tower_http::{services::ServeDir, trace::TraceLayer};

use state::AppState;

/// Build the full application router.
///
/// Serves the API, `/health`, and uploaded images under `/images`.
pub fn app(state: AppState) -> Router {
    let images = ServeDir::new(state.config().images_dir());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .nest_service("/images", images)
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(middleware::make_request_span::<Body>),
        )
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running.
async fn health() -> &'static str {
    "ok"
}
