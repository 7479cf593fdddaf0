//! Storage error types.

use makhana_core::models::OrderField;
use thiserror::Error;

/// Errors returned by storage operations.
///
/// A missing entity is never an error; lookups return `None` or `false`.
/// The precondition variants carry a message fit for end users, the rest
/// are internal failures.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A user with this email already exists.
    #[error("User with this email already exists")]
    EmailTaken,

    /// The user has already reviewed this product.
    #[error("You have already reviewed this product")]
    DuplicateReview,

    /// The category is still referenced by products.
    #[error("Cannot delete category. {count} product(s) are still using this category.")]
    CategoryInUse { count: usize },

    /// A setting with this key already exists.
    #[error("Setting with key '{key}' already exists")]
    SettingExists { key: String },

    /// A required order field is absent or blank.
    #[error("{0}")]
    MissingOrderField(OrderField),

    /// Referenced user does not exist.
    #[error("User not found")]
    UserNotFound,

    /// Referenced product does not exist.
    #[error("Product not found")]
    ProductNotFound,

    /// Unique constraint violation (category name or slug, product sku).
    #[error("{0}")]
    Conflict(String),

    /// Reading or writing the data file failed.
    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// The state could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Password hash could not be produced.
    #[error("password hashing error")]
    PasswordHash,
}

impl StorageError {
    /// Whether this error is a rejected precondition rather than an internal failure.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        !matches!(
            self,
            Self::Persistence(_) | Self::Serialization(_) | Self::PasswordHash
        )
    }
}
