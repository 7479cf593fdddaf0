//! HTTP middleware and extractors for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span from [`make_request_span`])
//! 3. Request ID (add unique ID to each request)
//!
//! Authentication is done per handler with the [`RequireUser`] and
//! [`RequireAdmin`] extractors.

pub mod auth;
pub mod client_ip;
pub mod request_id;

pub use auth::{AdminIdentity, RequireAdmin, RequireUser, bearer_token};
pub use client_ip::ClientIp;
pub use request_id::{make_request_span, request_id_middleware};
