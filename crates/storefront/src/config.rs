//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_DATA_DIR` - Directory holding `database.json` and `images/` (default: ./data)
//! - `SESSION_TTL_DAYS` - Shopper session lifetime in days (default: 30)
//! - `ADMIN_USERNAME` - Back-office username (default: admin)
//! - `ADMIN_PASSWORD_HASH` - Argon2 PHC string, or a plaintext password
//! - `ADMIN_SESSION_TIMEOUT_HOURS` - Admin session lifetime in hours (default: 8)
//! - `TRUST_PROXY_HEADERS` - Take the client IP from `CF-Connecting-IP`/`X-Forwarded-For`;
//!   only set behind a proxy that overwrites them (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name (default: development)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "admin123",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the datastore file and uploaded images
    pub data_dir: PathBuf,
    /// Lifetime of a shopper login session
    pub session_ttl: TimeDelta,
    /// Back-office credentials
    pub admin: AdminConfig,
    /// Whether proxy headers may name the client IP
    pub trust_proxy_headers: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: String,
}

/// Back-office login configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct AdminConfig {
    pub username: String,
    /// Argon2 PHC string or plaintext. Admin login is refused when unset.
    pub password_hash: Option<SecretString>,
    pub session_timeout: Duration,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field(
                "password_hash",
                &self.password_hash.as_ref().map(|_| "[REDACTED]"),
            )
            .field("session_timeout", &self.session_timeout)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable cannot be parsed or a plaintext
    /// admin password looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let data_dir = PathBuf::from(get_env_or_default("STOREFRONT_DATA_DIR", "./data"));
        let session_ttl = session_ttl_from_days(parse_env("SESSION_TTL_DAYS", "30")?)?;
        let trust_proxy_headers = parse_env("TRUST_PROXY_HEADERS", "false")?;

        let admin = AdminConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_env_or_default("SENTRY_ENVIRONMENT", "development");

        Ok(Self {
            host,
            port,
            data_dir,
            session_ttl,
            admin,
            trust_proxy_headers,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Directory served under `/images`.
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join(makhana_storage::persistence::IMAGES_DIR)
    }
}

impl AdminConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let password_hash = get_optional_env("ADMIN_PASSWORD_HASH")
            .filter(|value| !value.is_empty())
            .map(|value| {
                if !is_phc_string(&value) {
                    validate_secret_strength(&value, "ADMIN_PASSWORD_HASH")?;
                }
                Ok::<_, ConfigError>(SecretString::from(value))
            })
            .transpose()?;
        let session_timeout = session_timeout_from_hours(parse_env(
            "ADMIN_SESSION_TIMEOUT_HOURS",
            "8",
        )?)?;

        Ok(Self {
            username: get_env_or_default("ADMIN_USERNAME", "admin"),
            password_hash,
            session_timeout,
        })
    }

    /// Whether the configured password is an Argon2 PHC string.
    #[must_use]
    pub fn has_phc_hash(&self) -> bool {
        self.password_hash
            .as_ref()
            .is_some_and(|hash| is_phc_string(hash.expose_secret()))
    }
}

fn is_phc_string(value: &str) -> bool {
    value.starts_with("$argon2")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn session_ttl_from_days(days: i64) -> Result<TimeDelta, ConfigError> {
    TimeDelta::try_days(days)
        .filter(|ttl| *ttl > TimeDelta::zero())
        .ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "SESSION_TTL_DAYS".to_string(),
                format!("{days} is not a usable number of days"),
            )
        })
}

fn session_timeout_from_hours(hours: u64) -> Result<Duration, ConfigError> {
    hours
        .checked_mul(3600)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "ADMIN_SESSION_TIMEOUT_HOURS".to_string(),
                format!("{hours} is not a usable number of hours"),
            )
        })
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject plaintext secrets that are placeholders or have low entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use an argon2 hash instead."
            ),
        ));
    }

    Ok(())
}
