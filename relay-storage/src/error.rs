//! Storage error types.
//!
//! Used by collections, stores and callers of storage APIs. Backend failures are
//! passed through untouched; retry policy belongs to the caller.

use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// Programmer error: the call broke a documented precondition.
    #[error("Precondition violated: {0}")]
    Precondition(String),
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;
