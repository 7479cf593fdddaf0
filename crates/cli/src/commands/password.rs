//! Produce an argon2 hash for `ADMIN_PASSWORD_HASH`.

use std::io::BufRead;

use thiserror::Error;

use makhana_storage::{StorageError, password};

/// Errors that can occur while hashing.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Nothing was read from stdin.
    #[error("Password must not be empty")]
    Empty,

    /// Reading stdin failed.
    #[error("Failed to read password: {0}")]
    Io(#[from] std::io::Error),

    /// Hashing failed.
    #[error("Failed to hash password: {0}")]
    Hash(#[from] StorageError),
}

/// Read one line from stdin and print its PHC-format hash to stdout.
///
/// # Errors
///
/// Returns `PasswordError` if stdin is empty or unreadable, or hashing fails.
#[allow(clippy::print_stdout)]
pub fn hash_from_stdin() -> Result<(), PasswordError> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let hash = hash_line(&line)?;
    println!("{hash}");
    Ok(())
}

fn hash_line(line: &str) -> Result<String, PasswordError> {
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }
    Ok(password::hash_password(password)?)
}
