//! Subcommand implementations.

pub mod password;
pub mod seed;
pub mod sessions;
pub mod stats;
