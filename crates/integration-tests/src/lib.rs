//! Integration tests for the Makhana storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p makhana-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storage_properties` - Datastore behaviour against a real data directory
//! - `storefront_api` - End-to-end HTTP scenarios
//!
//! Each [`TestContext`] starts its own storefront on `127.0.0.1:0` over a
//! fresh temporary data directory, so tests run in parallel without sharing
//! state.

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::TimeDelta;
use reqwest::{Client, RequestBuilder};
use secrecy::SecretString;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::task::JoinHandle;

use makhana_storage::JsonStorage;
use makhana_storefront::config::{AdminConfig, StorefrontConfig};
use makhana_storefront::state::AppState;

/// Admin username of every test server.
pub const ADMIN_USERNAME: &str = "admin";

/// Plaintext admin password of every test server.
pub const ADMIN_PASSWORD: &str = "k9#Lm2$vQ8zT";

/// A running storefront and a client pointed at it.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    data_dir: TempDir,
    server: JoinHandle<()>,
}

impl TestContext {
    /// Start a storefront over a freshly seeded data directory.
    pub async fn new() -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create data dir");

        let config = StorefrontConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            data_dir: data_dir.path().to_path_buf(),
            session_ttl: TimeDelta::days(30),
            admin: AdminConfig {
                username: ADMIN_USERNAME.to_string(),
                password_hash: Some(SecretString::from(ADMIN_PASSWORD)),
                session_timeout: Duration::from_secs(3600),
            },
            trust_proxy_headers: false,
            sentry_dsn: None,
            sentry_environment: "test".to_string(),
        };

        let storage = JsonStorage::open_dir(data_dir.path())
            .await
            .expect("Failed to open datastore");
        let app = makhana_storefront::app(AppState::new(config, Arc::new(storage)));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to read local address");

        let server = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Server error");
        });

        Self {
            client: Client::new(),
            base_url: format!("http://{addr}"),
            data_dir,
            server,
        }
    }

    /// Directory holding this server's `database.json`.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        self.data_dir.path()
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Register a shopper and return their session token.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> String {
        let body: Value = self
            .post("/api/auth/register")
            .json(&json!({
                "name": name,
                "email": email,
                "password": password,
                "confirmPassword": password,
            }))
            .send()
            .await
            .expect("Failed to register")
            .json()
            .await
            .expect("Invalid register response");

        body["sessionId"]
            .as_str()
            .expect("Register response has no sessionId")
            .to_string()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// `Authorization` value for admin Basic auth.
#[must_use]
pub fn admin_basic_auth(password: &str) -> String {
    let credentials = STANDARD.encode(format!("{ADMIN_USERNAME}:{password}"));
    format!("Basic {credentials}")
}

/// `Authorization` value for a bearer token.
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
