//! Print record counts for a datastore.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;

use makhana_core::OrderStatus;
use makhana_storage::{Database, JsonStorage, Storage, StorageError};

/// Record counts for one datastore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub categories: usize,
    pub products: usize,
    pub users: usize,
    pub reviews: usize,
    pub settings: usize,
    pub cart_items: usize,
    pub sessions: usize,
    pub expired_sessions: usize,
    pub orders_by_status: Vec<(OrderStatus, usize)>,
}

impl Stats {
    /// Count the records in `db`, judging session expiry against `now`.
    #[must_use]
    pub fn collect(db: &Database, now: DateTime<Utc>) -> Self {
        let orders_by_status = OrderStatus::ALL
            .into_iter()
            .map(|status| {
                let count = db.orders.iter().filter(|o| o.status == status).count();
                (status, count)
            })
            .collect();

        Self {
            categories: db.categories.len(),
            products: db.products.len(),
            users: db.users.len(),
            reviews: db.reviews.len(),
            settings: db.settings.len(),
            cart_items: db.cart_items.len(),
            sessions: db.sessions.len(),
            expired_sessions: db.sessions.iter().filter(|s| s.is_expired_at(now)).count(),
            orders_by_status,
        }
    }
}

/// Print statistics for the datastore in `data_dir`.
///
/// # Errors
///
/// Returns `StorageError` if the datastore cannot be opened.
pub async fn run(data_dir: &Path) -> Result<(), StorageError> {
    let store = JsonStorage::open_dir(data_dir).await?;
    let stats = Stats::collect(&store.snapshot().await, Utc::now());

    info!("Datastore Statistics");
    info!("====================");
    info!("Categories: {}", stats.categories);
    info!("Products: {}", stats.products);
    info!("Users: {}", stats.users);
    info!("Reviews: {}", stats.reviews);
    info!("Settings: {}", stats.settings);
    info!("Cart items: {}", stats.cart_items);
    info!("Sessions: {} ({} expired)", stats.sessions, stats.expired_sessions);
    info!("Orders by status:");
    for (status, count) in &stats.orders_by_status {
        info!("  {status}: {count}");
    }

    Ok(())
}
