//! Error types shared across the core crate.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Persistence layer failure
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// External data provider failure
    #[error("Provider error: {0}")]
    Provider(String),

    /// Causal attribution contract violation
    #[error("Attribution error: {0}")]
    Attribution(#[from] AttributionError),

    /// Input that violates a domain invariant
    #[error("Validation error: {0}")]
    Validation(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence failure classes reported by storage implementations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{0}")]
    Internal(String),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),
}

/// Contract violations detected while attributing voting power changes.
#[derive(Debug, Error)]
pub enum AttributionError {
    /// Two candidate events share a log index within one transaction.
    /// Event log indexes are unique per transaction; picking either side
    /// arbitrarily would hide corrupted source data.
    #[error(
        "ambiguous cause for delta ({transaction_hash}, {log_index}): delegation and transfer \
         candidates both at log index {candidate_log_index}"
    )]
    AmbiguousCause {
        transaction_hash: String,
        log_index: i64,
        candidate_log_index: i64,
    },
}

impl Error {
    /// Create a provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
