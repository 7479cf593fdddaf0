//! The storage interface consumed by the HTTP layer.

use async_trait::async_trait;

use makhana_core::models::{
    CartItem, CartItemWithProduct, Category, CategoryUpdate, NewCartItem, NewCategory, NewOrder,
    NewProduct, NewReview, NewSetting, NewUser, Order, Product, ProductUpdate,
    ProductWithCategory, Review, ReviewStats, ReviewUpdate, Session, Setting, User,
};
use makhana_core::{CategoryId, Email, OrderId, OrderStatus, ProductId, ReviewId, UserId};

use crate::database::Database;
use crate::error::StorageError;

/// Every operation the storefront performs against its datastore.
///
/// Lookups return `None`, `false` or an empty list when nothing matches.
/// Mutations return `Err` only for a rejected precondition or a failed
/// save; after a failed save the store is left as it was before the call.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Copy of the entire state.
    async fn snapshot(&self) -> Database;

    // Categories
    async fn categories(&self) -> Vec<Category>;
    async fn category(&self, id: CategoryId) -> Option<Category>;
    async fn category_by_slug(&self, slug: &str) -> Option<Category>;
    async fn create_category(&self, new: NewCategory) -> Result<Category, StorageError>;
    async fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> Result<Option<Category>, StorageError>;
    /// Rejected with `CategoryInUse` while any product references it.
    async fn delete_category(&self, id: CategoryId) -> Result<bool, StorageError>;

    // Products
    async fn products(&self, category: Option<CategoryId>) -> Vec<Product>;
    async fn featured_products(&self) -> Vec<Product>;
    async fn products_with_category(&self) -> Vec<ProductWithCategory>;
    async fn product_with_category(&self, id: ProductId) -> Option<ProductWithCategory>;
    async fn product(&self, id: ProductId) -> Option<Product>;
    async fn search_products(&self, query: &str) -> Vec<Product>;
    async fn create_product(&self, new: NewProduct) -> Result<Product, StorageError>;
    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, StorageError>;
    async fn delete_product(&self, id: ProductId) -> Result<bool, StorageError>;
    /// Up to `limit` products most similar to `id`; `None` if `id` is unknown.
    async fn recommendations(&self, id: ProductId, limit: usize) -> Option<Vec<Product>>;

    // Cart
    async fn cart_items(&self, session_id: &str) -> Vec<CartItemWithProduct>;
    async fn add_to_cart(&self, new: NewCartItem) -> Result<CartItem, StorageError>;
    async fn update_cart_item(
        &self,
        session_id: &str,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Option<CartItem>, StorageError>;
    async fn remove_from_cart(
        &self,
        session_id: &str,
        product_id: ProductId,
    ) -> Result<bool, StorageError>;
    async fn clear_cart(&self, session_id: &str) -> Result<bool, StorageError>;

    // Orders
    async fn orders(&self) -> Vec<Order>;
    async fn order(&self, id: OrderId) -> Option<Order>;
    async fn order_by_tracking_number(&self, tracking_number: &str) -> Option<Order>;
    async fn create_order(&self, new: NewOrder) -> Result<Order, StorageError>;
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, StorageError>;

    // Users & sessions
    async fn create_user(&self, new: NewUser) -> Result<User, StorageError>;
    async fn user_by_email(&self, email: &Email) -> Option<User>;
    async fn user_by_id(&self, id: UserId) -> Option<User>;
    /// The user if `password` matches; unknown email and wrong password
    /// are indistinguishable.
    async fn verify_password(&self, email: &Email, password: &str) -> Option<User>;
    async fn create_session(&self, user_id: UserId) -> Result<Session, StorageError>;
    /// The user behind an unexpired session.
    async fn session_user(&self, session_id: &str) -> Option<User>;
    async fn delete_session(&self, session_id: &str) -> Result<bool, StorageError>;
    /// Remove expired sessions, returning how many were removed.
    async fn purge_expired_sessions(&self) -> Result<usize, StorageError>;

    // Wishlist
    async fn add_to_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<User>, StorageError>;
    async fn remove_from_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<User>, StorageError>;
    async fn wishlist(&self, user_id: UserId) -> Vec<Product>;

    // Reviews
    async fn create_review(&self, new: NewReview) -> Result<Review, StorageError>;
    async fn product_reviews(&self, product_id: ProductId) -> Vec<Review>;
    async fn user_reviews(&self, user_id: UserId) -> Vec<Review>;
    async fn review(&self, id: ReviewId) -> Option<Review>;
    async fn update_review(
        &self,
        id: ReviewId,
        user_id: UserId,
        update: ReviewUpdate,
    ) -> Result<Option<Review>, StorageError>;
    async fn delete_review(&self, id: ReviewId, user_id: UserId) -> Result<bool, StorageError>;
    async fn product_review_stats(&self, product_id: ProductId) -> ReviewStats;

    // Settings
    async fn settings(&self) -> Vec<Setting>;
    async fn setting(&self, key: &str) -> Option<Setting>;
    async fn create_setting(&self, new: NewSetting) -> Result<Setting, StorageError>;
    async fn update_setting(&self, key: &str, value: String)
    -> Result<Option<Setting>, StorageError>;
    async fn delete_setting(&self, key: &str) -> Result<bool, StorageError>;
}
