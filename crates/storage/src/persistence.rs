//! Where the state tree is kept between runs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::fs;

use crate::database::Database;
use crate::error::StorageError;

/// File name of the datastore inside the data directory.
pub const DATABASE_FILE: &str = "database.json";

/// Directory under the data directory holding product images.
pub const IMAGES_DIR: &str = "images";

/// Backend that loads and saves the whole state tree.
#[async_trait]
pub trait Persistence: Send + Sync + 'static {
    /// Load the saved state. `Ok(None)` means there is nothing usable to
    /// load and the store should start from the seed data.
    async fn load(&self) -> Result<Option<Database>, StorageError>;

    /// Replace the saved state with `db`.
    async fn save(&self, db: &Database) -> Result<(), StorageError>;
}

/// Persists to `<data_dir>/database.json` as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonFile {
    data_dir: PathBuf,
    path: PathBuf,
}

impl JsonFile {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let path = data_dir.join(DATABASE_FILE);
        Self { data_dir, path }
    }

    /// Path of the datastore file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the image directory.
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join(IMAGES_DIR)
    }

    /// Create the data and image directories.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Persistence` if a directory cannot be created.
    pub async fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(self.images_dir()).await?;
        Ok(())
    }

    /// Move an unreadable datastore out of the way so it survives the
    /// seed write.
    async fn quarantine(&self) -> Result<PathBuf, StorageError> {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".corrupt-{}", Utc::now().timestamp()));
        let aside = PathBuf::from(name);
        fs::rename(&self.path, &aside).await?;
        Ok(aside)
    }
}

#[async_trait]
impl Persistence for JsonFile {
    async fn load(&self) -> Result<Option<Database>, StorageError> {
        self.ensure_dirs().await?;

        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(fields)) => Ok(Some(decode_lenient(fields))),
            Ok(_) => {
                let aside = self.quarantine().await?;
                tracing::error!(
                    moved_to = %aside.display(),
                    "datastore is not a JSON object, moved aside"
                );
                Ok(None)
            }
            Err(e) => {
                let aside = self.quarantine().await?;
                tracing::error!(
                    error = %e,
                    moved_to = %aside.display(),
                    "datastore is not valid JSON, moved aside"
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, db: &Database) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(db)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &self.path).await?;
        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "datastore saved");
        Ok(())
    }
}

/// Build the state tree one record at a time.
///
/// A record that does not fit its collection is logged and dropped; the
/// rest of the file still loads. Missing collections come up empty.
fn decode_lenient(mut fields: Map<String, Value>) -> Database {
    let counters = fields
        .remove("counters")
        .and_then(|value| {
            serde_json::from_value(value)
                .inspect_err(|e| tracing::warn!(error = %e, "unreadable counters, recomputing"))
                .ok()
        })
        .unwrap_or_default();

    Database {
        categories: records(&mut fields, "categories"),
        products: records(&mut fields, "products"),
        cart_items: records(&mut fields, "cartItems"),
        orders: records(&mut fields, "orders"),
        settings: records(&mut fields, "settings"),
        users: records(&mut fields, "users"),
        sessions: records(&mut fields, "sessions"),
        reviews: records(&mut fields, "reviews"),
        counters,
    }
}

fn records<T: DeserializeOwned>(fields: &mut Map<String, Value>, collection: &str) -> Vec<T> {
    match fields.remove(collection) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(rows)) => rows
            .into_iter()
            .enumerate()
            .filter_map(|(index, row)| {
                serde_json::from_value(row)
                    .inspect_err(|e| {
                        tracing::warn!(collection, index, error = %e, "skipping unreadable record");
                    })
                    .ok()
            })
            .collect(),
        Some(_) => {
            tracing::warn!(collection, "collection is not a list, ignoring it");
            Vec::new()
        }
    }
}

/// Keeps nothing; every store starts from the seed data.
#[derive(Debug, Clone, Copy, Default)]
pub struct Volatile;

#[async_trait]
impl Persistence for Volatile {
    async fn load(&self) -> Result<Option<Database>, StorageError> {
        Ok(None)
    }

    async fn save(&self, _db: &Database) -> Result<(), StorageError> {
        Ok(())
    }
}
