//! Makhana Core - Shared types library.
//!
//! This crate provides common types used across all Makhana components:
//! - `storage` - JSON-file backed datastore
//! - `storefront` - Public JSON API and admin back-office
//! - `cli` - Command-line tools for seeding and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no file access, no HTTP.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, ratings and statuses
//! - [`models`] - Entity records and their insert/update payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use types::*;
