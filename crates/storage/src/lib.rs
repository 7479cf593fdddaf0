//! Makhana Storage - JSON-file backed datastore.
//!
//! The whole dataset lives in memory and is written to a single
//! `database.json` after every change. Consumers talk to it through the
//! [`Storage`] trait, usually as an `Arc<dyn Storage>`.
//!
//! # Modules
//!
//! - [`database`] - The persisted state tree and its domain rules
//! - [`persistence`] - File and in-memory backends
//! - [`store`] - Locking and save-on-write around the state tree
//! - [`recommend`] - Product similarity scoring
//! - [`tracking`] - Order tracking numbers
//! - [`seed`] - Sample catalog for a fresh datastore
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), makhana_storage::StorageError> {
//! use makhana_storage::{JsonStorage, Storage};
//!
//! let store = JsonStorage::open_dir("./data").await?;
//! let featured = store.featured_products().await;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod database;
pub mod error;
pub mod password;
pub mod persistence;
pub mod recommend;
pub mod seed;
pub mod storage;
pub mod store;
pub mod token;
pub mod tracking;

pub use database::{Counters, Database};
pub use error::StorageError;
pub use persistence::{JsonFile, Persistence, Volatile};
pub use storage::Storage;
pub use store::{DEFAULT_SESSION_TTL, JsonStorage, MemoryStorage, Store};
