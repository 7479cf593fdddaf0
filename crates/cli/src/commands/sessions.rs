//! Shopper session maintenance.

use std::path::Path;

use tracing::info;

use makhana_storage::{JsonStorage, Storage, StorageError};

/// Delete expired shopper sessions from the datastore in `data_dir`.
///
/// # Errors
///
/// Returns `StorageError` if the datastore cannot be opened or saved.
pub async fn purge(data_dir: &Path) -> Result<(), StorageError> {
    let store = JsonStorage::open_dir(data_dir).await?;
    let purged = store.purge_expired_sessions().await?;
    info!(purged, "Expired sessions purged");
    Ok(())
}
