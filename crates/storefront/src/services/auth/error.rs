//! Authentication error types.

use thiserror::Error;

use makhana_storage::StorageError;

/// Errors that can occur during shopper or admin authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration or login form failed validation.
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// Wrong shopper email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Wrong admin username or password.
    #[error("invalid admin credentials")]
    InvalidAdminCredentials,

    /// No admin password is configured.
    #[error("admin authentication not configured")]
    AdminNotConfigured,

    /// Too many failed admin logins from one client.
    #[error("locked out for {retry_after}s")]
    LockedOut {
        /// Seconds until the lockout ends.
        retry_after: u64,
    },

    /// Datastore operation failed or was rejected.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
