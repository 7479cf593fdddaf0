//! Application state shared across handlers.

use std::sync::Arc;

use makhana_storage::Storage;

use crate::config::StorefrontConfig;
use crate::services::auth::AdminAuth;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the datastore, configuration and admin session registry.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storage: Arc<dyn Storage>,
    admin: AdminAuth,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `storage` - The datastore, usually a `JsonStorage`
    #[must_use]
    pub fn new(config: StorefrontConfig, storage: Arc<dyn Storage>) -> Self {
        let admin = AdminAuth::new(config.admin.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                storage,
                admin,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the datastore.
    #[must_use]
    pub fn storage(&self) -> &dyn Storage {
        self.inner.storage.as_ref()
    }

    /// Get a reference to the admin authenticator.
    #[must_use]
    pub fn admin(&self) -> &AdminAuth {
        &self.inner.admin
    }
}
