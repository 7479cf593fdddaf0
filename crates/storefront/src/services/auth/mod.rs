//! Authentication service.
//!
//! Shopper registration and login against the datastore, plus the
//! back-office credential check in [`admin`].

pub mod admin;
mod error;

pub use admin::{AdminAuth, AdminSession};
pub use error::AuthError;

use serde::Deserialize;

use makhana_core::Email;
use makhana_core::models::{NewUser, Session, User};
use makhana_storage::{Storage, StorageError, password};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Registration form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Login form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Login {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Authentication service.
///
/// Handles shopper registration, login and logout.
pub struct AuthService<'a> {
    storage: &'a dyn Storage,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(storage: &'a dyn Storage) -> Self {
        Self { storage }
    }

    /// Register a new user and log them in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the form is invalid.
    /// Returns `AuthError::Storage` with `EmailTaken` if the email is already registered.
    pub async fn register(&self, form: Registration) -> Result<(User, Session), AuthError> {
        let email = validate_registration(&form)?;
        let password_hash = hash_password(form.password).await?;

        let user = self
            .storage
            .create_user(NewUser {
                name: form.name.trim().to_string(),
                email,
                password_hash,
            })
            .await?;
        let session = self.storage.create_session(user.id).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok((user, session))
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, form: Login) -> Result<(User, Session), AuthError> {
        let email = Email::parse(&form.email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .storage
            .verify_password(&email, &form.password)
            .await
            .ok_or(AuthError::InvalidCredentials)?;
        let session = self.storage.create_session(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok((user, session))
    }

    /// End a login session. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the datastore cannot be saved.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        if self.storage.delete_session(token).await? {
            tracing::info!("User logged out");
        }
        Ok(())
    }
}

/// Check a registration form, collecting every problem.
///
/// # Errors
///
/// Returns `AuthError::Validation` listing each failed rule.
pub fn validate_registration(form: &Registration) -> Result<Email, AuthError> {
    let mut errors = Vec::new();

    if form.name.trim().is_empty() {
        errors.push("Name is required".to_string());
    }
    let email = Email::parse(&form.email)
        .inspect_err(|_| errors.push("Invalid email address".to_string()))
        .ok();
    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    if form.password != form.confirm_password {
        errors.push("Passwords don't match".to_string());
    }

    match email {
        Some(email) if errors.is_empty() => Ok(email),
        _ => Err(AuthError::Validation(errors)),
    }
}

/// Hash a password off the async runtime.
async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|_| AuthError::PasswordHash)?
        .map_err(|e| match e {
            StorageError::PasswordHash => AuthError::PasswordHash,
            other => AuthError::Storage(other),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use makhana_storage::MemoryStorage;

    fn form(name: &str, email: &str, password: &str, confirm: &str) -> Registration {
        Registration {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_validate_registration_ok() {
        let email =
            validate_registration(&form("Alice", "Alice@Example.com", "secret123", "secret123"))
                .unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_validate_registration_collects_all_errors() {
        let err = validate_registration(&form(" ", "nope", "abc", "abd")).unwrap_err();
        let AuthError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&"Passwords don't match".to_string()));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let storage = MemoryStorage::seeded();
        let auth = AuthService::new(&storage);

        let (user, session) = auth
            .register(form("Alice", "alice@example.com", "secret123", "secret123"))
            .await
            .unwrap();
        assert_eq!(session.user_id, user.id);

        let (again, _) = auth
            .login(Login {
                email: "ALICE@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(again.id, user.id);

        let wrong = auth
            .login(Login {
                email: "alice@example.com".to_string(),
                password: "nope".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let storage = MemoryStorage::seeded();
        let auth = AuthService::new(&storage);
        let alice = form("Alice", "alice@example.com", "secret123", "secret123");

        auth.register(alice.clone()).await.unwrap();
        let err = auth.register(alice).await.unwrap_err();
        assert!(matches!(err, AuthError::Storage(StorageError::EmailTaken)));
    }
}
