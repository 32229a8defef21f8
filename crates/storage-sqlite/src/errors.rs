//! Storage error types and their conversion into core errors.

use govlens_core::errors::{DatabaseError, Error};
use thiserror::Error as ThisError;

/// Errors raised inside the storage crate before they cross the core
/// boundary.
#[derive(Debug, ThisError)]
pub enum StorageError {
    #[error("Diesel error: {0}")]
    Diesel(#[from] diesel::result::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted column no longer parses into its domain type.
    #[error("Corrupt column value: {0}")]
    CorruptValue(String),
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Pool(e) => Error::Database(DatabaseError::Pool(e.to_string())),
            StorageError::Diesel(e) => Error::Database(DatabaseError::Query(e.to_string())),
            other => Error::Database(DatabaseError::Internal(other.to_string())),
        }
    }
}
