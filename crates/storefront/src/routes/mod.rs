//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                               - Health check
//!
//! # Shopper auth
//! POST /api/auth/register                    - Create account, returns sessionId
//! POST /api/auth/login                       - Log in, returns sessionId
//! POST /api/auth/logout                      - End session
//! GET  /api/auth/me                          - Current profile (auth)
//!
//! # Wishlist (auth)
//! GET    /api/wishlist                       - Saved products
//! POST   /api/wishlist/{id}                  - Save product
//! DELETE /api/wishlist/{id}                  - Unsave product
//!
//! # Catalog
//! GET  /api/categories                       - All categories
//! GET  /api/categories/{slug}                - Category by slug
//! POST /api/categories                       - Create (admin)
//! PUT|DELETE /api/categories/{id}            - Update / delete (admin)
//! GET  /api/products                         - ?search= | ?featured=true | ?category=slug
//! GET  /api/products-with-category           - Products joined with category
//! GET  /api/products/{id}                    - Product with category
//! GET  /api/products/{id}/recommendations    - Similar products (?limit=)
//! POST /api/products                         - Create (admin)
//! PUT|DELETE /api/products/{id}              - Update / delete (admin)
//!
//! # Cart (keyed by client cart id)
//! GET    /api/cart/{session}                 - Cart rows with products
//! POST   /api/cart                           - Add product
//! PUT    /api/cart/{session}/{product}       - Set quantity (0 removes)
//! DELETE /api/cart/{session}/{product}       - Remove product
//! DELETE /api/cart/{session}                 - Clear cart
//!
//! # Orders
//! GET  /api/orders                           - All orders (admin)
//! GET  /api/orders/{id}                      - One order (admin)
//! POST /api/orders                           - Checkout (auth)
//! PUT  /api/orders/{id}/status               - Set status (admin)
//! GET  /api/track/{tracking_number}          - Public tracking view
//!
//! # Settings
//! GET  /api/settings | /api/settings/{key}   - Read
//! POST /api/settings                         - Create (admin)
//! PUT|DELETE /api/settings/{key}             - Update / delete (admin)
//!
//! # Reviews
//! GET  /api/products/{id}/reviews            - Product reviews
//! GET  /api/products/{id}/review-stats       - Rating summary
//! POST /api/reviews                          - Write review (auth)
//! GET  /api/users/reviews                    - Own reviews (auth)
//! PUT|DELETE /api/reviews/{id}               - Edit / delete own review (auth)
//!
//! # Admin session
//! POST /api/admin/auth                       - Basic auth -> session token
//! POST /api/admin/logout                     - Close session
//! GET  /api/admin/me                         - Current admin
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod settings;
pub mod wishlist;

use axum::{
    Json, Router,
    routing::{get, post, put},
};
use serde_json::{Value, json};

use crate::state::AppState;

/// `{"message": text}` response body.
pub(crate) fn message(text: &str) -> Json<Value> {
    Json(json!({ "message": text }))
}

/// Create the shopper auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
}

/// Create the admin session routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/auth", post(admin::login))
        .route("/api/admin/logout", post(admin::logout))
        .route("/api/admin/me", get(admin::me))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/api/wishlist", get(wishlist::index))
        .route(
            "/api/wishlist/{id}",
            post(wishlist::add).delete(wishlist::remove),
        )
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/categories",
            get(categories::index).post(categories::create),
        )
        // GET takes a slug, PUT and DELETE take an id
        .route(
            "/api/categories/{category}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::destroy),
        )
        .route("/api/products", get(products::index).post(products::create))
        .route("/api/products-with-category", get(products::with_category))
        .route(
            "/api/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route(
            "/api/products/{id}/recommendations",
            get(products::recommendations),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/api/cart", post(cart::add))
        .route("/api/cart/{session}", get(cart::show).delete(cart::clear))
        .route(
            "/api/cart/{session}/{product}",
            put(cart::update).delete(cart::remove),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(orders::index).post(orders::create))
        .route("/api/orders/{id}", get(orders::show))
        .route("/api/orders/{id}/status", put(orders::update_status))
        .route("/api/track/{tracking_number}", get(orders::track))
}

/// Create the settings routes router.
pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/api/settings", get(settings::index).post(settings::create))
        .route(
            "/api/settings/{key}",
            get(settings::show)
                .put(settings::update)
                .delete(settings::destroy),
        )
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/api/products/{id}/reviews", get(reviews::for_product))
        .route("/api/products/{id}/review-stats", get(reviews::stats))
        .route("/api/reviews", post(reviews::create))
        .route("/api/users/reviews", get(reviews::mine))
        .route(
            "/api/reviews/{id}",
            put(reviews::update).delete(reviews::destroy),
        )
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(admin_routes())
        .merge(wishlist_routes())
        .merge(catalog_routes())
        .merge(cart_routes())
        .merge(order_routes())
        .merge(settings_routes())
        .merge(review_routes())
}

