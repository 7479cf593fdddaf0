//! Entity records persisted by the storefront datastore.
//!
//! Each entity has a stored record type plus the payloads used to create
//! (`New*`) and partially update (`*Update`) it. All types serialize with
//! camelCase keys, which is also the on-disk layout of `database.json`.

pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod review;
pub mod setting;
pub mod user;

pub use cart::{CartItem, CartItemWithProduct, NewCartItem};
pub use category::{Category, CategoryUpdate, NewCategory};
pub use order::{NewOrder, Order, OrderField, OrderTracking};
pub use product::{NewProduct, Product, ProductUpdate, ProductWithCategory};
pub use review::{NewReview, Review, ReviewStats, ReviewUpdate};
pub use setting::{NewSetting, Setting};
pub use user::{NewUser, Session, User, UserProfile};

use serde::{Deserialize, Deserializer};

/// Distinguish an absent field (`None`) from an explicit `null`
/// (`Some(None)`) in partial updates.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Collapse blank strings to `None`.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
