//! The persisted state tree and the domain rules applied to it.
//!
//! `Database` is the exact shape of `database.json`. Its methods are the
//! synchronous core of every storage operation; [`crate::Store`] adds
//! locking and persistence around them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use makhana_core::models::{
    CartItem, CartItemWithProduct, Category, CategoryUpdate, NewCartItem, NewCategory, NewOrder,
    NewProduct, NewReview, NewSetting, NewUser, Order, OrderField, Product,
    ProductUpdate, ProductWithCategory, Review, ReviewStats, ReviewUpdate, Session, Setting, User,
    non_blank,
};
use makhana_core::{
    CartItemId, CategoryId, Email, OrderId, OrderStatus, ProductId, ReviewId, SettingId, UserId,
};

use crate::error::StorageError;
use crate::{recommend, tracking};

/// Next-ID counters, one per collection.
///
/// Each counter holds the ID the next insert will receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Counters {
    pub category_id: i32,
    pub product_id: i32,
    pub cart_item_id: i32,
    pub order_id: i32,
    pub user_id: i32,
    pub review_id: i32,
    pub setting_id: i32,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            category_id: 1,
            product_id: 1,
            cart_item_id: 1,
            order_id: 1,
            user_id: 1,
            review_id: 1,
            setting_id: 1,
        }
    }
}

/// Take the current value of `counter` and advance it.
const fn bump(counter: &mut i32) -> i32 {
    let id = *counter;
    *counter += 1;
    id
}

/// Raise `counter` so it is at least 1 and above every existing ID.
fn reconcile_counter(counter: &mut i32, ids: impl Iterator<Item = i32>) {
    let floor = ids.max().map_or(1, |max| max.saturating_add(1));
    *counter = (*counter).max(floor).max(1);
}

/// The complete datastore.
///
/// Every field defaults when absent, so older files load unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Database {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub cart_items: Vec<CartItem>,
    pub orders: Vec<Order>,
    pub settings: Vec<Setting>,
    pub users: Vec<User>,
    pub sessions: Vec<Session>,
    pub reviews: Vec<Review>,
    pub counters: Counters,
}

impl Database {
    /// Fix up counters after loading so new IDs never collide.
    pub fn reconcile_counters(&mut self) {
        let c = &mut self.counters;
        reconcile_counter(&mut c.category_id, self.categories.iter().map(|e| e.id.as_i32()));
        reconcile_counter(&mut c.product_id, self.products.iter().map(|e| e.id.as_i32()));
        reconcile_counter(&mut c.cart_item_id, self.cart_items.iter().map(|e| e.id.as_i32()));
        reconcile_counter(&mut c.order_id, self.orders.iter().map(|e| e.id.as_i32()));
        reconcile_counter(&mut c.user_id, self.users.iter().map(|e| e.id.as_i32()));
        reconcile_counter(&mut c.review_id, self.reviews.iter().map(|e| e.id.as_i32()));
        reconcile_counter(&mut c.setting_id, self.settings.iter().map(|e| e.id.as_i32()));
    }

    // =========================================================================
    // Categories
    // =========================================================================

    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn category_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    /// Reject a name or slug already used by another category.
    fn check_category_unique(
        &self,
        except: Option<CategoryId>,
        name: Option<&str>,
        slug: Option<&str>,
    ) -> Result<(), StorageError> {
        let others = self.categories.iter().filter(|c| Some(c.id) != except);
        for other in others {
            if let Some(name) = name
                && other.name.eq_ignore_ascii_case(name)
            {
                return Err(StorageError::Conflict(format!(
                    "Category name '{name}' already exists"
                )));
            }
            if let Some(slug) = slug
                && other.slug == slug
            {
                return Err(StorageError::Conflict(format!(
                    "Category slug '{slug}' already exists"
                )));
            }
        }
        Ok(())
    }

    /// Append a category without uniqueness checks.
    pub fn insert_category(&mut self, new: NewCategory) -> Category {
        let category = Category {
            id: CategoryId::new(bump(&mut self.counters.category_id)),
            name: new.name,
            slug: new.slug,
            description: non_blank(new.description),
            thumbnail: non_blank(new.thumbnail),
        };
        self.categories.push(category.clone());
        category
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the name or slug is taken.
    pub fn create_category(&mut self, new: NewCategory) -> Result<Category, StorageError> {
        self.check_category_unique(None, Some(&new.name), Some(&new.slug))?;
        Ok(self.insert_category(new))
    }

    /// Merge `update` into the category with `id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the new name or slug is taken.
    pub fn update_category(
        &mut self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> Result<Option<Category>, StorageError> {
        if self.category(id).is_none() {
            return Ok(None);
        }
        self.check_category_unique(Some(id), update.name.as_deref(), update.slug.as_deref())?;
        Ok(self.categories.iter_mut().find(|c| c.id == id).map(|c| {
            c.apply(update);
            c.clone()
        }))
    }

    /// Remove a category that no product references.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::CategoryInUse` if products still reference it.
    pub fn delete_category(&mut self, id: CategoryId) -> Result<bool, StorageError> {
        let Some(index) = self.categories.iter().position(|c| c.id == id) else {
            return Ok(false);
        };
        let count = self.products.iter().filter(|p| p.category_id == id).count();
        if count > 0 {
            return Err(StorageError::CategoryInUse { count });
        }
        self.categories.remove(index);
        Ok(true)
    }

    // =========================================================================
    // Products
    // =========================================================================

    #[must_use]
    pub fn products(&self, category: Option<CategoryId>) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| category.is_none_or(|id| p.category_id == id))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn featured_products(&self) -> Vec<Product> {
        self.products.iter().filter(|p| p.featured).cloned().collect()
    }

    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn join_category(&self, product: &Product) -> Option<ProductWithCategory> {
        self.category(product.category_id)
            .map(|category| ProductWithCategory {
                product: product.clone(),
                category: category.clone(),
            })
    }

    /// Products joined with their category; products with a dangling
    /// category are left out.
    #[must_use]
    pub fn products_with_category(&self) -> Vec<ProductWithCategory> {
        self.products
            .iter()
            .filter_map(|p| self.join_category(p))
            .collect()
    }

    #[must_use]
    pub fn product_with_category(&self, id: ProductId) -> Option<ProductWithCategory> {
        self.product(id).and_then(|p| self.join_category(p))
    }

    /// Case-insensitive substring match on name or description.
    #[must_use]
    pub fn search_products(&self, query: &str) -> Vec<Product> {
        let query = query.to_lowercase();
        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&query)
                    || p.description.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }

    fn check_sku_unique(&self, except: Option<ProductId>, sku: &str) -> Result<(), StorageError> {
        if self
            .products
            .iter()
            .any(|p| Some(p.id) != except && p.sku == sku)
        {
            return Err(StorageError::Conflict(format!(
                "Product SKU '{sku}' already exists"
            )));
        }
        Ok(())
    }

    /// Append a product without uniqueness checks.
    pub fn insert_product(&mut self, new: NewProduct, now: DateTime<Utc>) -> Product {
        let product = Product {
            id: ProductId::new(bump(&mut self.counters.product_id)),
            name: new.name,
            description: new.description,
            price: new.price,
            category_id: new.category_id,
            stock: new.stock,
            images: new.images,
            sku: new.sku,
            featured: new.featured,
            features: new.features,
            created_at: now,
        };
        self.products.push(product.clone());
        product
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the SKU is taken.
    pub fn create_product(
        &mut self,
        new: NewProduct,
        now: DateTime<Utc>,
    ) -> Result<Product, StorageError> {
        self.check_sku_unique(None, &new.sku)?;
        Ok(self.insert_product(new, now))
    }

    /// Merge `update` into the product with `id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the new SKU is taken.
    pub fn update_product(
        &mut self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, StorageError> {
        if self.product(id).is_none() {
            return Ok(None);
        }
        if let Some(sku) = &update.sku {
            self.check_sku_unique(Some(id), sku)?;
        }
        Ok(self.products.iter_mut().find(|p| p.id == id).map(|p| {
            p.apply(update);
            p.clone()
        }))
    }

    pub fn delete_product(&mut self, id: ProductId) -> bool {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        self.products.len() != before
    }

    /// Products most similar to `id`, best first. `None` if `id` is unknown.
    #[must_use]
    pub fn recommendations(&self, id: ProductId, limit: usize) -> Option<Vec<Product>> {
        self.product(id)
            .map(|reference| recommend::rank(reference, &self.products, limit))
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Cart rows for `session_id` joined with their products. Rows whose
    /// product no longer exists are skipped.
    #[must_use]
    pub fn cart_items(&self, session_id: &str) -> Vec<CartItemWithProduct> {
        self.cart_items
            .iter()
            .filter(|item| item.session_id == session_id)
            .filter_map(|item| {
                self.product(item.product_id).map(|product| CartItemWithProduct {
                    item: item.clone(),
                    product: product.clone(),
                })
            })
            .collect()
    }

    fn cart_row_mut(&mut self, session_id: &str, product_id: ProductId) -> Option<&mut CartItem> {
        self.cart_items
            .iter_mut()
            .find(|item| item.session_id == session_id && item.product_id == product_id)
    }

    /// Add to a cart, merging with an existing row for the same product.
    pub fn add_to_cart(&mut self, new: NewCartItem, now: DateTime<Utc>) -> CartItem {
        let quantity = new.requested_quantity();
        if let Some(existing) = self.cart_row_mut(&new.session_id, new.product_id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
            return existing.clone();
        }
        let item = CartItem {
            id: CartItemId::new(bump(&mut self.counters.cart_item_id)),
            session_id: new.session_id,
            product_id: new.product_id,
            quantity,
            created_at: now,
        };
        self.cart_items.push(item.clone());
        item
    }

    /// Set the absolute quantity of a cart row. A zero quantity is stored
    /// as is; removal is a separate operation.
    pub fn update_cart_item(
        &mut self,
        session_id: &str,
        product_id: ProductId,
        quantity: u32,
    ) -> Option<CartItem> {
        self.cart_row_mut(session_id, product_id).map(|item| {
            item.quantity = quantity;
            item.clone()
        })
    }

    pub fn remove_from_cart(&mut self, session_id: &str, product_id: ProductId) -> bool {
        let before = self.cart_items.len();
        self.cart_items
            .retain(|item| !(item.session_id == session_id && item.product_id == product_id));
        self.cart_items.len() != before
    }

    /// Remove every row of a cart. Returns whether anything was removed.
    pub fn clear_cart(&mut self, session_id: &str) -> bool {
        let before = self.cart_items.len();
        self.cart_items.retain(|item| item.session_id != session_id);
        self.cart_items.len() != before
    }

    // =========================================================================
    // Orders
    // =========================================================================

    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Look up an order by tracking number, ignoring surrounding
    /// whitespace and letter case.
    #[must_use]
    pub fn order_by_tracking_number(&self, tracking_number: &str) -> Option<&Order> {
        let wanted = tracking::normalize(tracking_number);
        self.orders.iter().find(|o| o.tracking_number == wanted)
    }

    /// Place an order with a freshly generated tracking number.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MissingOrderField` for the first required
    /// field that is absent or blank.
    pub fn create_order(&mut self, new: NewOrder, now: DateTime<Utc>) -> Result<Order, StorageError> {
        new.validate().map_err(StorageError::MissingOrderField)?;
        let (Some(user_id), Some(total)) = (new.user_id, new.total) else {
            return Err(StorageError::MissingOrderField(OrderField::UserId));
        };

        let tracking_number = tracking::unique_tracking_number(now, |candidate| {
            self.orders.iter().any(|o| o.tracking_number == candidate)
        });

        let order = Order {
            id: OrderId::new(bump(&mut self.counters.order_id)),
            user_id,
            customer_name: new.customer_name,
            customer_email: new.customer_email,
            customer_phone: non_blank(new.customer_phone),
            shipping_address: new.shipping_address,
            total,
            status: new.status.unwrap_or_default(),
            tracking_number,
            items: new.items,
            created_at: now,
        };
        self.orders.push(order.clone());
        Ok(order)
    }

    /// Overwrite an order's status. Any status may follow any other.
    pub fn update_order_status(&mut self, id: OrderId, status: OrderStatus) -> Option<Order> {
        self.orders.iter_mut().find(|o| o.id == id).map(|order| {
            order.status = status;
            order.clone()
        })
    }

    // =========================================================================
    // Users & sessions
    // =========================================================================

    #[must_use]
    pub fn user_by_email(&self, email: &Email) -> Option<&User> {
        self.users.iter().find(|u| &u.email == email)
    }

    #[must_use]
    pub fn user_by_id(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Register a user with an empty wishlist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::EmailTaken` if the email is registered.
    pub fn create_user(&mut self, new: NewUser, now: DateTime<Utc>) -> Result<User, StorageError> {
        if self.user_by_email(&new.email).is_some() {
            return Err(StorageError::EmailTaken);
        }
        let user = User {
            id: UserId::new(bump(&mut self.counters.user_id)),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            wishlist: Vec::new(),
            created_at: now,
        };
        self.users.push(user.clone());
        Ok(user)
    }

    pub fn insert_session(&mut self, session: Session) {
        self.sessions.push(session);
    }

    /// The user behind an unexpired session. Expired rows are kept.
    #[must_use]
    pub fn session_user(&self, session_id: &str, now: DateTime<Utc>) -> Option<&User> {
        self.sessions
            .iter()
            .find(|s| s.session_id == session_id)
            .filter(|s| !s.is_expired_at(now))
            .and_then(|s| self.user_by_id(s.user_id))
    }

    pub fn delete_session(&mut self, session_id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.session_id != session_id);
        self.sessions.len() != before
    }

    /// Drop every session expired as of `now`, returning how many went.
    pub fn purge_expired_sessions(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|s| !s.is_expired_at(now));
        before - self.sessions.len()
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    pub fn add_to_wishlist(&mut self, user_id: UserId, product_id: ProductId) -> Option<User> {
        self.users.iter_mut().find(|u| u.id == user_id).map(|user| {
            if !user.wishlist.contains(&product_id) {
                user.wishlist.push(product_id);
            }
            user.clone()
        })
    }

    pub fn remove_from_wishlist(&mut self, user_id: UserId, product_id: ProductId) -> Option<User> {
        self.users.iter_mut().find(|u| u.id == user_id).map(|user| {
            user.wishlist.retain(|&id| id != product_id);
            user.clone()
        })
    }

    /// Wishlisted products in saved order, skipping deleted ones.
    #[must_use]
    pub fn wishlist(&self, user_id: UserId) -> Vec<Product> {
        self.user_by_id(user_id)
            .map(|user| {
                user.wishlist
                    .iter()
                    .filter_map(|&id| self.product(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    #[must_use]
    pub fn review(&self, id: ReviewId) -> Option<&Review> {
        self.reviews.iter().find(|r| r.id == id)
    }

    /// Create a review, snapshotting the author's current name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DuplicateReview` if the user already reviewed
    /// the product, `StorageError::UserNotFound` or
    /// `StorageError::ProductNotFound` for unknown references.
    pub fn create_review(&mut self, new: NewReview, now: DateTime<Utc>) -> Result<Review, StorageError> {
        if self
            .reviews
            .iter()
            .any(|r| r.product_id == new.product_id && r.user_id == new.user_id)
        {
            return Err(StorageError::DuplicateReview);
        }
        let user_name = self
            .user_by_id(new.user_id)
            .map(|u| u.name.clone())
            .ok_or(StorageError::UserNotFound)?;
        if self.product(new.product_id).is_none() {
            return Err(StorageError::ProductNotFound);
        }

        let review = Review {
            id: ReviewId::new(bump(&mut self.counters.review_id)),
            product_id: new.product_id,
            user_id: new.user_id,
            rating: new.rating,
            title: new.title,
            comment: new.comment,
            user_name,
            created_at: now,
            updated_at: now,
        };
        self.reviews.push(review.clone());
        Ok(review)
    }

    fn newest_first<'a>(reviews: impl Iterator<Item = &'a Review>) -> Vec<Review> {
        let mut out: Vec<Review> = reviews.cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    #[must_use]
    pub fn product_reviews(&self, product_id: ProductId) -> Vec<Review> {
        Self::newest_first(self.reviews.iter().filter(|r| r.product_id == product_id))
    }

    #[must_use]
    pub fn user_reviews(&self, user_id: UserId) -> Vec<Review> {
        Self::newest_first(self.reviews.iter().filter(|r| r.user_id == user_id))
    }

    /// Update a review owned by `user_id`. Other users get `None`.
    pub fn update_review(
        &mut self,
        id: ReviewId,
        user_id: UserId,
        update: ReviewUpdate,
        now: DateTime<Utc>,
    ) -> Option<Review> {
        self.reviews
            .iter_mut()
            .find(|r| r.id == id && r.user_id == user_id)
            .map(|review| {
                review.apply(update, now);
                review.clone()
            })
    }

    /// Delete a review owned by `user_id`.
    pub fn delete_review(&mut self, id: ReviewId, user_id: UserId) -> bool {
        let before = self.reviews.len();
        self.reviews.retain(|r| !(r.id == id && r.user_id == user_id));
        self.reviews.len() != before
    }

    #[must_use]
    pub fn product_review_stats(&self, product_id: ProductId) -> ReviewStats {
        ReviewStats::from_ratings(
            self.reviews
                .iter()
                .filter(|r| r.product_id == product_id)
                .map(|r| r.rating),
        )
    }

    // =========================================================================
    // Settings
    // =========================================================================

    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&Setting> {
        self.settings.iter().find(|s| s.key == key)
    }

    /// Create a setting.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::SettingExists` if the key is taken.
    pub fn create_setting(&mut self, new: NewSetting, now: DateTime<Utc>) -> Result<Setting, StorageError> {
        if self.setting(&new.key).is_some() {
            return Err(StorageError::SettingExists { key: new.key });
        }
        let setting = Setting {
            id: SettingId::new(bump(&mut self.counters.setting_id)),
            key: new.key,
            value: new.value,
            kind: new.kind,
            description: non_blank(new.description),
            created_at: now,
            updated_at: now,
        };
        self.settings.push(setting.clone());
        Ok(setting)
    }

    pub fn update_setting(&mut self, key: &str, value: String, now: DateTime<Utc>) -> Option<Setting> {
        self.settings.iter_mut().find(|s| s.key == key).map(|setting| {
            setting.value = value;
            setting.updated_at = now;
            setting.clone()
        })
    }

    pub fn delete_setting(&mut self, key: &str) -> bool {
        let before = self.settings.len();
        self.settings.retain(|s| s.key != key);
        self.settings.len() != before
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use makhana_core::{Price, Rating, SettingType};

    use super::*;
    use crate::seed;

    fn db() -> Database {
        seed::seeded(Utc::now())
    }

    fn alice(db: &mut Database) -> User {
        db.create_user(
            NewUser {
                name: "Alice".to_string(),
                email: Email::parse("alice@example.com").unwrap(),
                password_hash: "hash".to_string(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn order_for(user_id: UserId) -> NewOrder {
        NewOrder {
            user_id: Some(user_id),
            customer_name: "Alice Liddell".to_string(),
            customer_email: "alice@example.com".to_string(),
            shipping_address: "221B Baker St".to_string(),
            total: Some(Price::from(5998)),
            items: "[]".to_string(),
            ..NewOrder::default()
        }
    }

    #[test]
    fn test_missing_fields_default_on_load() {
        let db: Database = serde_json::from_str(r#"{"categories":[]}"#).unwrap();
        assert!(db.products.is_empty());
        assert_eq!(db.counters, Counters::default());
    }

    #[test]
    fn test_zero_counters_reconciled() {
        let mut db: Database = serde_json::from_str(
            r#"{"counters":{"categoryId":0},"categories":[{"id":7,"name":"X","slug":"x"}]}"#,
        )
        .unwrap();
        db.reconcile_counters();
        assert_eq!(db.counters.category_id, 8);
        assert_eq!(db.counters.product_id, 1);
    }

    #[test]
    fn test_category_in_use_rejected() {
        let mut db = db();
        let before = db.clone();
        let err = db.delete_category(CategoryId::new(2)).unwrap_err();
        assert!(matches!(err, StorageError::CategoryInUse { count: 2 }));
        assert_eq!(db, before);
        assert!(!db.delete_category(CategoryId::new(99)).unwrap());
    }

    #[test]
    fn test_category_unique_name_and_slug() {
        let mut db = db();
        let dup = NewCategory {
            name: "premium makhana".to_string(),
            slug: "other".to_string(),
            ..NewCategory::default()
        };
        assert!(matches!(db.create_category(dup), Err(StorageError::Conflict(_))));

        let update = CategoryUpdate {
            slug: Some("organic-makhana".to_string()),
            ..CategoryUpdate::default()
        };
        assert!(db.update_category(CategoryId::new(1), update).is_err());

        // Renaming a category to its own slug is fine.
        let update = CategoryUpdate {
            slug: Some("premium-makhana".to_string()),
            ..CategoryUpdate::default()
        };
        assert!(db.update_category(CategoryId::new(1), update).unwrap().is_some());
    }

    #[test]
    fn test_products_with_category_drop_dangling() {
        let mut db = db();
        db.products[0].category_id = CategoryId::new(42);
        assert_eq!(db.products_with_category().len(), 5);
        assert!(db.product_with_category(ProductId::new(1)).is_none());
        assert!(db.product_with_category(ProductId::new(2)).is_some());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let db = db();
        let hits = db.search_products("ORGANIC");
        assert_eq!(hits.len(), 1);
        assert_eq!(db.search_products("spice blends").len(), 1);
    }

    #[test]
    fn test_sku_unique() {
        let mut db = db();
        let update = ProductUpdate {
            sku: Some("TEX001".to_string()),
            ..ProductUpdate::default()
        };
        assert!(db.update_product(ProductId::new(1), update).is_err());
    }

    #[test]
    fn test_add_to_cart_merges() {
        let mut db = db();
        let add = || NewCartItem {
            session_id: "cart-1".to_string(),
            product_id: ProductId::new(1),
            quantity: None,
        };
        db.add_to_cart(add(), Utc::now());
        let item = db.add_to_cart(add(), Utc::now());
        assert_eq!(item.quantity, 2);
        assert_eq!(db.cart_items("cart-1").len(), 1);
    }

    #[test]
    fn test_update_cart_to_zero_keeps_row() {
        let mut db = db();
        let new = NewCartItem {
            session_id: "cart-1".to_string(),
            product_id: ProductId::new(1),
            quantity: Some(3),
        };
        db.add_to_cart(new, Utc::now());
        let item = db.update_cart_item("cart-1", ProductId::new(1), 0).unwrap();
        assert_eq!(item.quantity, 0);
        assert_eq!(db.cart_items.len(), 1);
        assert!(db.update_cart_item("cart-1", ProductId::new(2), 1).is_none());
    }

    #[test]
    fn test_cart_skips_deleted_products() {
        let mut db = db();
        for id in [1, 2] {
            let new = NewCartItem {
                session_id: "cart-1".to_string(),
                product_id: ProductId::new(id),
                quantity: None,
            };
            db.add_to_cart(new, Utc::now());
        }
        assert!(db.delete_product(ProductId::new(2)));
        assert_eq!(db.cart_items("cart-1").len(), 1);
        assert!(db.clear_cart("cart-1"));
        assert!(!db.clear_cart("cart-1"));
    }

    #[test]
    fn test_create_order_and_track() {
        let mut db = db();
        let user = alice(&mut db);
        let order = db.create_order(order_for(user.id), Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        let lower = format!("  {} ", order.tracking_number.to_lowercase());
        assert_eq!(db.order_by_tracking_number(&lower).unwrap().id, order.id);
    }

    #[test]
    fn test_create_order_rejects_missing_field() {
        let mut db = db();
        let mut new = order_for(UserId::new(1));
        new.shipping_address = String::new();
        let err = db.create_order(new, Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), "Shipping address is required");
        assert!(db.orders.is_empty());
    }

    #[test]
    fn test_order_status_any_transition() {
        let mut db = db();
        let user = alice(&mut db);
        let order = db.create_order(order_for(user.id), Utc::now()).unwrap();
        db.update_order_status(order.id, OrderStatus::Delivered).unwrap();
        let back = db.update_order_status(order.id, OrderStatus::Pending).unwrap();
        assert_eq!(back.status, OrderStatus::Pending);
        assert!(db.update_order_status(OrderId::new(99), OrderStatus::Shipped).is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let mut db = db();
        alice(&mut db);
        let again = NewUser {
            name: "Other".to_string(),
            email: Email::parse("ALICE@example.com").unwrap(),
            password_hash: "hash".to_string(),
        };
        assert!(matches!(db.create_user(again, Utc::now()), Err(StorageError::EmailTaken)));
    }

    #[test]
    fn test_expired_session_is_kept_until_purged() {
        let mut db = db();
        let user = alice(&mut db);
        let now = Utc::now();
        db.insert_session(Session {
            session_id: "old".to_string(),
            user_id: user.id,
            expires_at: now - TimeDelta::seconds(1),
        });
        db.insert_session(Session {
            session_id: "fresh".to_string(),
            user_id: user.id,
            expires_at: now + TimeDelta::days(1),
        });
        assert!(db.session_user("old", now).is_none());
        assert_eq!(db.sessions.len(), 2);
        assert_eq!(db.session_user("fresh", now).unwrap().id, user.id);
        assert_eq!(db.purge_expired_sessions(now), 1);
        assert_eq!(db.sessions.len(), 1);
    }

    #[test]
    fn test_wishlist_idempotent_and_skips_deleted() {
        let mut db = db();
        let user = alice(&mut db);
        db.add_to_wishlist(user.id, ProductId::new(1));
        let user = db.add_to_wishlist(user.id, ProductId::new(1)).unwrap();
        assert_eq!(user.wishlist, vec![ProductId::new(1)]);
        db.add_to_wishlist(user.id, ProductId::new(3));
        db.delete_product(ProductId::new(3));
        assert_eq!(db.wishlist(user.id).len(), 1);
        assert!(db.add_to_wishlist(UserId::new(99), ProductId::new(1)).is_none());
        assert!(db.wishlist(UserId::new(99)).is_empty());
    }

    #[test]
    fn test_review_rules() {
        let mut db = db();
        let user = alice(&mut db);
        let new = || NewReview {
            product_id: ProductId::new(1),
            user_id: user.id,
            rating: Rating::new(5).unwrap(),
            title: "Great".to_string(),
            comment: "Crunchy".to_string(),
        };
        let review = db.create_review(new(), Utc::now()).unwrap();
        assert_eq!(review.user_name, "Alice");
        assert!(matches!(db.create_review(new(), Utc::now()), Err(StorageError::DuplicateReview)));

        let mut orphan = new();
        orphan.user_id = UserId::new(99);
        assert!(matches!(db.create_review(orphan, Utc::now()), Err(StorageError::UserNotFound)));

        let mut missing = new();
        missing.product_id = ProductId::new(99);
        assert!(matches!(db.create_review(missing, Utc::now()), Err(StorageError::ProductNotFound)));

        let stats = db.product_review_stats(ProductId::new(1));
        assert_eq!(stats.total_reviews, 1);
    }

    #[test]
    fn test_review_scoped_to_author() {
        let mut db = db();
        let user = alice(&mut db);
        let review = db
            .create_review(
                NewReview {
                    product_id: ProductId::new(1),
                    user_id: user.id,
                    rating: Rating::new(4).unwrap(),
                    title: "Good".to_string(),
                    comment: "Nice".to_string(),
                },
                Utc::now(),
            )
            .unwrap();
        let stranger = UserId::new(99);
        let update = ReviewUpdate {
            title: Some("Hacked".to_string()),
            ..ReviewUpdate::default()
        };
        assert!(db.update_review(review.id, stranger, update.clone(), Utc::now()).is_none());
        assert!(!db.delete_review(review.id, stranger));
        let updated = db.update_review(review.id, user.id, update, Utc::now()).unwrap();
        assert_eq!(updated.title, "Hacked");
        assert!(db.delete_review(review.id, user.id));
    }

    #[test]
    fn test_settings() {
        let mut db = db();
        let new = || NewSetting {
            key: "hero_title".to_string(),
            value: "Welcome".to_string(),
            kind: SettingType::Text,
            description: None,
        };
        let created = db.create_setting(new(), Utc::now()).unwrap();
        assert_eq!(created.id, SettingId::new(1));
        assert!(matches!(
            db.create_setting(new(), Utc::now()),
            Err(StorageError::SettingExists { .. })
        ));
        let later = Utc::now() + TimeDelta::seconds(5);
        let updated = db.update_setting("hero_title", "Hello".to_string(), later).unwrap();
        assert_eq!(updated.value, "Hello");
        assert_eq!(updated.updated_at, later);
        assert!(db.delete_setting("hero_title"));
        assert!(!db.delete_setting("hero_title"));
    }
}
