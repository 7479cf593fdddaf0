//! In-memory state guarded by a lock and saved through a [`Persistence`].

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tokio::sync::Mutex;
use tracing::instrument;

use makhana_core::models::{
    CartItem, CartItemWithProduct, Category, CategoryUpdate, NewCartItem, NewCategory, NewOrder,
    NewProduct, NewReview, NewSetting, NewUser, Order, Product, ProductUpdate,
    ProductWithCategory, Review, ReviewStats, ReviewUpdate, Session, Setting, User,
};
use makhana_core::{CategoryId, Email, OrderId, OrderStatus, ProductId, ReviewId, UserId};

use crate::database::Database;
use crate::error::StorageError;
use crate::persistence::{JsonFile, Persistence, Volatile};
use crate::storage::Storage;
use crate::{password, seed, token};

/// Default lifetime of a shopper session.
pub const DEFAULT_SESSION_TTL: TimeDelta = TimeDelta::days(30);

/// Store backed by `<data_dir>/database.json`.
pub type JsonStorage = Store<JsonFile>;

/// Store that never touches disk.
pub type MemoryStorage = Store<Volatile>;

/// The storage engine.
///
/// All state sits behind one async mutex. A mutation runs against a
/// copy of the state while holding the lock, and the copy replaces the
/// live state only once it has been saved. Calls are therefore
/// serialized, and a failed save changes nothing.
pub struct Store<P> {
    state: Mutex<Database>,
    persistence: P,
    session_ttl: TimeDelta,
}

impl<P: Persistence> Store<P> {
    /// Build a store around an already loaded state.
    #[must_use]
    pub fn with_database(persistence: P, db: Database) -> Self {
        Self {
            state: Mutex::new(db),
            persistence,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Load the saved state, or seed and save a fresh one.
    ///
    /// A state that cannot be read at all is replaced in memory by the
    /// seed data without being written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the fresh seed data cannot be saved.
    pub async fn open(persistence: P) -> Result<Self, StorageError> {
        let db = match persistence.load().await {
            Ok(Some(mut db)) => {
                db.reconcile_counters();
                tracing::info!(
                    categories = db.categories.len(),
                    products = db.products.len(),
                    orders = db.orders.len(),
                    users = db.users.len(),
                    "datastore loaded"
                );
                db
            }
            Ok(None) => {
                let db = seed::seeded(Utc::now());
                persistence.save(&db).await?;
                tracing::info!("datastore seeded with sample catalog");
                db
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load datastore, using sample catalog");
                seed::seeded(Utc::now())
            }
        };
        Ok(Self::with_database(persistence, db))
    }

    /// Use `ttl` as the lifetime of new shopper sessions.
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: TimeDelta) -> Self {
        self.session_ttl = ttl;
        self
    }

    async fn read<T>(&self, f: impl FnOnce(&Database) -> T + Send) -> T {
        let guard = self.state.lock().await;
        f(&guard)
    }

    async fn mutate<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send,
        F: FnOnce(&mut Database) -> Result<T, StorageError> + Send,
    {
        let mut guard = self.state.lock().await;
        let mut draft = guard.clone();
        let out = f(&mut draft)?;
        if draft != *guard {
            if let Err(e) = self.persistence.save(&draft).await {
                tracing::error!(error = %e, "failed to save datastore, change discarded");
                return Err(e);
            }
            *guard = draft;
        }
        Ok(out)
    }
}

impl JsonStorage {
    /// Open the datastore kept in `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a fresh datastore cannot be written.
    pub async fn open_dir(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::open(JsonFile::new(data_dir)).await
    }
}

impl MemoryStorage {
    /// A store holding only the sample catalog.
    #[must_use]
    pub fn seeded() -> Self {
        Self::with_database(Volatile, seed::seeded(Utc::now()))
    }
}

#[async_trait]
impl<P: Persistence> Storage for Store<P> {
    async fn snapshot(&self) -> Database {
        self.read(Database::clone).await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    async fn categories(&self) -> Vec<Category> {
        self.read(|db| db.categories.clone()).await
    }

    async fn category(&self, id: CategoryId) -> Option<Category> {
        self.read(|db| db.category(id).cloned()).await
    }

    async fn category_by_slug(&self, slug: &str) -> Option<Category> {
        self.read(|db| db.category_by_slug(slug).cloned()).await
    }

    #[instrument(skip(self, new), fields(slug = %new.slug))]
    async fn create_category(&self, new: NewCategory) -> Result<Category, StorageError> {
        self.mutate(|db| db.create_category(new)).await
    }

    #[instrument(skip(self, update))]
    async fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> Result<Option<Category>, StorageError> {
        self.mutate(|db| db.update_category(id, update)).await
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, id: CategoryId) -> Result<bool, StorageError> {
        self.mutate(|db| db.delete_category(id)).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    async fn products(&self, category: Option<CategoryId>) -> Vec<Product> {
        self.read(|db| db.products(category)).await
    }

    async fn featured_products(&self) -> Vec<Product> {
        self.read(Database::featured_products).await
    }

    async fn products_with_category(&self) -> Vec<ProductWithCategory> {
        self.read(Database::products_with_category).await
    }

    async fn product_with_category(&self, id: ProductId) -> Option<ProductWithCategory> {
        self.read(|db| db.product_with_category(id)).await
    }

    async fn product(&self, id: ProductId) -> Option<Product> {
        self.read(|db| db.product(id).cloned()).await
    }

    async fn search_products(&self, query: &str) -> Vec<Product> {
        self.read(|db| db.search_products(query)).await
    }

    #[instrument(skip(self, new), fields(sku = %new.sku))]
    async fn create_product(&self, new: NewProduct) -> Result<Product, StorageError> {
        let now = Utc::now();
        self.mutate(|db| db.create_product(new, now)).await
    }

    #[instrument(skip(self, update))]
    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, StorageError> {
        self.mutate(|db| db.update_product(id, update)).await
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: ProductId) -> Result<bool, StorageError> {
        self.mutate(|db| Ok(db.delete_product(id))).await
    }

    async fn recommendations(&self, id: ProductId, limit: usize) -> Option<Vec<Product>> {
        self.read(|db| db.recommendations(id, limit)).await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    async fn cart_items(&self, session_id: &str) -> Vec<CartItemWithProduct> {
        self.read(|db| db.cart_items(session_id)).await
    }

    async fn add_to_cart(&self, new: NewCartItem) -> Result<CartItem, StorageError> {
        let now = Utc::now();
        self.mutate(|db| Ok(db.add_to_cart(new, now))).await
    }

    async fn update_cart_item(
        &self,
        session_id: &str,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Option<CartItem>, StorageError> {
        self.mutate(|db| Ok(db.update_cart_item(session_id, product_id, quantity)))
            .await
    }

    async fn remove_from_cart(
        &self,
        session_id: &str,
        product_id: ProductId,
    ) -> Result<bool, StorageError> {
        self.mutate(|db| Ok(db.remove_from_cart(session_id, product_id)))
            .await
    }

    async fn clear_cart(&self, session_id: &str) -> Result<bool, StorageError> {
        self.mutate(|db| Ok(db.clear_cart(session_id))).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    async fn orders(&self) -> Vec<Order> {
        self.read(|db| db.orders.clone()).await
    }

    async fn order(&self, id: OrderId) -> Option<Order> {
        self.read(|db| db.order(id).cloned()).await
    }

    async fn order_by_tracking_number(&self, tracking_number: &str) -> Option<Order> {
        self.read(|db| db.order_by_tracking_number(tracking_number).cloned())
            .await
    }

    #[instrument(skip(self, new), fields(user_id = ?new.user_id))]
    async fn create_order(&self, new: NewOrder) -> Result<Order, StorageError> {
        let now = Utc::now();
        let order = self.mutate(|db| db.create_order(new, now)).await?;
        tracing::info!(
            order_id = %order.id,
            tracking_number = %order.tracking_number,
            "order created"
        );
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, StorageError> {
        self.mutate(|db| Ok(db.update_order_status(id, status))).await
    }

    // =========================================================================
    // Users & sessions
    // =========================================================================

    #[instrument(skip(self, new), fields(email = %new.email))]
    async fn create_user(&self, new: NewUser) -> Result<User, StorageError> {
        let now = Utc::now();
        self.mutate(|db| db.create_user(new, now)).await
    }

    async fn user_by_email(&self, email: &Email) -> Option<User> {
        self.read(|db| db.user_by_email(email).cloned()).await
    }

    async fn user_by_id(&self, id: UserId) -> Option<User> {
        self.read(|db| db.user_by_id(id).cloned()).await
    }

    async fn verify_password(&self, email: &Email, password: &str) -> Option<User> {
        let user = self.user_by_email(email).await;
        // Unknown emails still pay for a full argon2 check
        let hash = user
            .as_ref()
            .map_or_else(|| password::DUMMY_HASH.to_owned(), |u| u.password_hash.clone());
        let password = password.to_owned();

        let matches =
            tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
                .await
                .unwrap_or_else(|e| {
                    tracing::error!(error = %e, "password verification task failed");
                    false
                });

        user.filter(|_| matches)
    }

    #[instrument(skip(self))]
    async fn create_session(&self, user_id: UserId) -> Result<Session, StorageError> {
        let session = Session {
            session_id: token::session_token(),
            user_id,
            expires_at: Utc::now() + self.session_ttl,
        };
        let stored = session.clone();
        self.mutate(|db| {
            db.insert_session(stored);
            Ok(())
        })
        .await?;
        Ok(session)
    }

    async fn session_user(&self, session_id: &str) -> Option<User> {
        let now = Utc::now();
        self.read(|db| db.session_user(session_id, now).cloned()).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<bool, StorageError> {
        self.mutate(|db| Ok(db.delete_session(session_id))).await
    }

    #[instrument(skip(self))]
    async fn purge_expired_sessions(&self) -> Result<usize, StorageError> {
        let now = Utc::now();
        let removed = self
            .mutate(|db| Ok(db.purge_expired_sessions(now)))
            .await?;
        if removed > 0 {
            tracing::info!(removed, "expired sessions purged");
        }
        Ok(removed)
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    async fn add_to_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<User>, StorageError> {
        self.mutate(|db| Ok(db.add_to_wishlist(user_id, product_id)))
            .await
    }

    async fn remove_from_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<User>, StorageError> {
        self.mutate(|db| Ok(db.remove_from_wishlist(user_id, product_id)))
            .await
    }

    async fn wishlist(&self, user_id: UserId) -> Vec<Product> {
        self.read(|db| db.wishlist(user_id)).await
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    #[instrument(skip(self, new), fields(product_id = %new.product_id, user_id = %new.user_id))]
    async fn create_review(&self, new: NewReview) -> Result<Review, StorageError> {
        let now = Utc::now();
        self.mutate(|db| db.create_review(new, now)).await
    }

    async fn product_reviews(&self, product_id: ProductId) -> Vec<Review> {
        self.read(|db| db.product_reviews(product_id)).await
    }

    async fn user_reviews(&self, user_id: UserId) -> Vec<Review> {
        self.read(|db| db.user_reviews(user_id)).await
    }

    async fn review(&self, id: ReviewId) -> Option<Review> {
        self.read(|db| db.review(id).cloned()).await
    }

    async fn update_review(
        &self,
        id: ReviewId,
        user_id: UserId,
        update: ReviewUpdate,
    ) -> Result<Option<Review>, StorageError> {
        let now = Utc::now();
        self.mutate(|db| Ok(db.update_review(id, user_id, update, now)))
            .await
    }

    async fn delete_review(&self, id: ReviewId, user_id: UserId) -> Result<bool, StorageError> {
        self.mutate(|db| Ok(db.delete_review(id, user_id))).await
    }

    async fn product_review_stats(&self, product_id: ProductId) -> ReviewStats {
        self.read(|db| db.product_review_stats(product_id)).await
    }

    // =========================================================================
    // Settings
    // =========================================================================

    async fn settings(&self) -> Vec<Setting> {
        self.read(|db| db.settings.clone()).await
    }

    async fn setting(&self, key: &str) -> Option<Setting> {
        self.read(|db| db.setting(key).cloned()).await
    }

    #[instrument(skip(self, new), fields(key = %new.key))]
    async fn create_setting(&self, new: NewSetting) -> Result<Setting, StorageError> {
        let now = Utc::now();
        self.mutate(|db| db.create_setting(new, now)).await
    }

    async fn update_setting(
        &self,
        key: &str,
        value: String,
    ) -> Result<Option<Setting>, StorageError> {
        let now = Utc::now();
        self.mutate(|db| Ok(db.update_setting(key, value, now))).await
    }

    async fn delete_setting(&self, key: &str) -> Result<bool, StorageError> {
        self.mutate(|db| Ok(db.delete_setting(key))).await
    }
}
