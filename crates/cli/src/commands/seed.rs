//! Seed a datastore with the sample catalog.
//!
//! Writes five categories and six products to `<data_dir>/database.json`.
//! An existing datastore is left alone unless `--force` is given.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use makhana_storage::{JsonFile, Persistence, StorageError, seed};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// A datastore is already present and `--force` was not given.
    #[error("Datastore already exists at {}; pass --force to overwrite", .0.display())]
    AlreadyExists(PathBuf),

    /// Writing the datastore failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Write the sample catalog to `data_dir`.
///
/// # Errors
///
/// Returns `SeedError::AlreadyExists` if a datastore is present and `force`
/// is false, or `SeedError::Storage` if it cannot be written.
pub async fn run(data_dir: &Path, force: bool) -> Result<(), SeedError> {
    let file = JsonFile::new(data_dir);

    let exists = tokio::fs::try_exists(file.path())
        .await
        .map_err(StorageError::from)?;
    if exists && !force {
        return Err(SeedError::AlreadyExists(file.path().to_path_buf()));
    }

    file.ensure_dirs().await?;
    let db = seed::seeded(Utc::now());
    file.save(&db).await?;

    info!(path = %file.path().display(), replaced = exists, "Seeding complete!");
    info!("  Categories: {}", db.categories.len());
    info!("  Products: {}", db.products.len());

    Ok(())
}
