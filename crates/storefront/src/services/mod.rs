//! Business logic services for the storefront.
//!
//! Services sit between the route handlers and the datastore. Handlers stay
//! thin; anything beyond a single storage call lives here.

pub mod auth;
