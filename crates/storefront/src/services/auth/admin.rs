//! Back-office authentication.
//!
//! Admins log in with HTTP Basic credentials checked against
//! [`AdminConfig`]. A successful login opens an admin session whose token
//! can be sent as a Bearer token afterwards. Sessions and failed-attempt
//! counters are held in `moka` caches and vanish on restart.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use moka::future::Cache;
use secrecy::ExposeSecret;
use subtle::ConstantTimeEq;

use makhana_storage::password::verify_password;
use makhana_storage::token;

use super::AuthError;
use crate::config::AdminConfig;

/// Failed logins allowed per client before a lockout.
pub const MAX_FAILED_ATTEMPTS: u32 = 5;

/// How long a client stays locked out after its last failed attempt.
pub const LOCKOUT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// An authenticated back-office session.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct FailedAttempts {
    count: u32,
    last: Instant,
}

/// Admin credential check, session registry and lockout tracking.
pub struct AdminAuth {
    config: AdminConfig,
    sessions: Cache<String, AdminSession>,
    attempts: Cache<IpAddr, FailedAttempts>,
}

impl AdminAuth {
    /// Create the admin authenticator.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let sessions = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(config.session_timeout)
            .build();
        // Every failed attempt upserts the entry, which restarts its TTL.
        let attempts = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(LOCKOUT_WINDOW)
            .build();

        Self {
            config,
            sessions,
            attempts,
        }
    }

    /// The session behind an admin token, if it is still valid.
    pub async fn session(&self, token: &str) -> Option<AdminSession> {
        let session = self.sessions.get(token).await?;
        if session.expires_at <= Utc::now() {
            self.sessions.invalidate(token).await;
            return None;
        }
        Some(session)
    }

    /// Open a new admin session, returning its token.
    pub async fn open_session(&self, username: &str) -> (String, AdminSession) {
        let token = token::session_token();
        let timeout = chrono::TimeDelta::from_std(self.config.session_timeout)
            .unwrap_or(chrono::TimeDelta::hours(8));
        let session = AdminSession {
            username: username.to_string(),
            expires_at: Utc::now() + timeout,
        };
        self.sessions.insert(token.clone(), session.clone()).await;
        tracing::info!(username, "Admin session opened");
        (token, session)
    }

    /// Close an admin session. Returns whether it existed.
    pub async fn close_session(&self, token: &str) -> bool {
        self.sessions.remove(token).await.is_some()
    }

    /// Check Basic credentials from `client`, applying the lockout.
    ///
    /// # Errors
    ///
    /// - `AuthError::LockedOut` after too many recent failures from `client`
    /// - `AuthError::AdminNotConfigured` when no admin password is set
    /// - `AuthError::InvalidAdminCredentials` for a wrong username or password
    pub async fn login(
        &self,
        client: IpAddr,
        username: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        if let Some(retry_after) = self.lockout_remaining(client).await {
            tracing::warn!(%client, retry_after, "Admin login while locked out");
            return Err(AuthError::LockedOut { retry_after });
        }

        let Some(expected) = self.config.password_hash.as_ref() else {
            tracing::error!("Admin login attempted but ADMIN_PASSWORD_HASH is not set");
            return Err(AuthError::AdminNotConfigured);
        };

        let username_ok: bool = username
            .as_bytes()
            .ct_eq(self.config.username.as_bytes())
            .into();
        let password_ok = if self.config.has_phc_hash() {
            let hash = expected.expose_secret().to_string();
            let password = password.to_string();
            tokio::task::spawn_blocking(move || verify_password(&password, &hash))
                .await
                .unwrap_or(false)
        } else {
            password
                .as_bytes()
                .ct_eq(expected.expose_secret().as_bytes())
                .into()
        };

        if username_ok && password_ok {
            self.attempts.invalidate(&client).await;
            Ok(())
        } else {
            let count = self.record_failure(client).await;
            tracing::warn!(%client, attempts = count, "Invalid admin credentials");
            Err(AuthError::InvalidAdminCredentials)
        }
    }

    /// Seconds left on `client`'s lockout, if it is locked out.
    async fn lockout_remaining(&self, client: IpAddr) -> Option<u64> {
        let attempts = self.attempts.get(&client).await?;
        if attempts.count < MAX_FAILED_ATTEMPTS {
            return None;
        }
        let remaining = LOCKOUT_WINDOW.checked_sub(attempts.last.elapsed())?;
        Some(remaining.as_secs().max(1))
    }

    async fn record_failure(&self, client: IpAddr) -> u32 {
        self.attempts
            .entry(client)
            .and_upsert_with(|existing| {
                let count = existing
                    .map_or(0, |entry| entry.into_value().count)
                    .saturating_add(1);
                std::future::ready(FailedAttempts {
                    count,
                    last: Instant::now(),
                })
            })
            .await
            .into_value()
            .count
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::Ipv4Addr;

    use secrecy::SecretString;

    use super::*;

    const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7));

    fn auth(password_hash: Option<String>) -> AdminAuth {
        AdminAuth::new(AdminConfig {
            username: "admin".to_string(),
            password_hash: password_hash.map(SecretString::from),
            session_timeout: Duration::from_secs(3600),
        })
    }

    #[tokio::test]
    async fn test_plaintext_login() {
        let auth = auth(Some("k9#Lm2$vQ8".to_string()));
        assert!(auth.login(CLIENT, "admin", "k9#Lm2$vQ8").await.is_ok());
        assert!(matches!(
            auth.login(CLIENT, "admin", "wrong").await,
            Err(AuthError::InvalidAdminCredentials)
        ));
        assert!(matches!(
            auth.login(CLIENT, "root", "k9#Lm2$vQ8").await,
            Err(AuthError::InvalidAdminCredentials)
        ));
    }

    #[tokio::test]
    async fn test_argon2_login() {
        let hash = makhana_storage::password::hash_password("hunter22").unwrap();
        let auth = auth(Some(hash));
        assert!(auth.login(CLIENT, "admin", "hunter22").await.is_ok());
        assert!(auth.login(CLIENT, "admin", "hunter23").await.is_err());
    }

    #[tokio::test]
    async fn test_not_configured() {
        let auth = auth(None);
        assert!(matches!(
            auth.login(CLIENT, "admin", "anything").await,
            Err(AuthError::AdminNotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_lockout_after_five_failures() {
        let auth = auth(Some("k9#Lm2$vQ8".to_string()));
        for _ in 0..MAX_FAILED_ATTEMPTS {
            assert!(matches!(
                auth.login(CLIENT, "admin", "wrong").await,
                Err(AuthError::InvalidAdminCredentials)
            ));
        }

        // Even the right password is refused while locked out.
        let err = auth.login(CLIENT, "admin", "k9#Lm2$vQ8").await.unwrap_err();
        let AuthError::LockedOut { retry_after } = err else {
            panic!("expected lockout, got {err:?}");
        };
        assert!(retry_after > 0 && retry_after <= LOCKOUT_WINDOW.as_secs());

        // Other clients are unaffected.
        let other = IpAddr::V4(Ipv4Addr::LOCALHOST);
        assert!(auth.login(other, "admin", "k9#Lm2$vQ8").await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_failures_all_counted() {
        let auth = auth(Some("k9#Lm2$vQ8".to_string()));
        let (a, b, c, d, e) = tokio::join!(
            auth.login(CLIENT, "admin", "wrong"),
            auth.login(CLIENT, "admin", "wrong"),
            auth.login(CLIENT, "admin", "wrong"),
            auth.login(CLIENT, "admin", "wrong"),
            auth.login(CLIENT, "admin", "wrong"),
        );
        for result in [a, b, c, d, e] {
            assert!(matches!(result, Err(AuthError::InvalidAdminCredentials)));
        }

        assert_eq!(
            auth.attempts.get(&CLIENT).await.unwrap().count,
            MAX_FAILED_ATTEMPTS
        );
        assert!(matches!(
            auth.login(CLIENT, "admin", "k9#Lm2$vQ8").await,
            Err(AuthError::LockedOut { .. })
        ));
    }

    #[tokio::test]
    async fn test_success_resets_attempts() {
        let auth = auth(Some("k9#Lm2$vQ8".to_string()));
        for _ in 0..MAX_FAILED_ATTEMPTS - 1 {
            let _ = auth.login(CLIENT, "admin", "wrong").await;
        }
        auth.login(CLIENT, "admin", "k9#Lm2$vQ8").await.unwrap();
        let _ = auth.login(CLIENT, "admin", "wrong").await;
        assert!(auth.login(CLIENT, "admin", "k9#Lm2$vQ8").await.is_ok());
    }

    #[tokio::test]
    async fn test_sessions() {
        let auth = auth(Some("k9#Lm2$vQ8".to_string()));
        let (token, session) = auth.open_session("admin").await;
        assert_eq!(session.username, "admin");
        assert!(session.expires_at > Utc::now());

        assert_eq!(auth.session(&token).await.unwrap().username, "admin");
        assert!(auth.session("unknown").await.is_none());

        assert!(auth.close_session(&token).await);
        assert!(!auth.close_session(&token).await);
        assert!(auth.session(&token).await.is_none());
    }
}
