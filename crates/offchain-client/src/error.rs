//! Error types for the off-chain hub client.

use thiserror::Error;

/// Result type alias for hub client operations.
pub type Result<T> = std::result::Result<T, OffchainApiError>;

/// Retry policy class for hub API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRetryClass {
    Retryable,
    Permanent,
}

/// Errors that can occur talking to the governance hub.
#[derive(Debug, Error)]
pub enum OffchainApiError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the hub
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl OffchainApiError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// HTTP status if this is an API error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify error for the sync engine's logging. The engine never
    /// retries inside a tick either way; the class only shapes the log.
    pub fn retry_class(&self) -> ApiRetryClass {
        match self {
            Self::Api { status, .. } => match *status {
                408 | 429 => ApiRetryClass::Retryable,
                500..=599 => ApiRetryClass::Retryable,
                _ => ApiRetryClass::Permanent,
            },
            Self::Http(_) => ApiRetryClass::Retryable,
            Self::Json(_) => ApiRetryClass::Permanent,
        }
    }
}

impl From<OffchainApiError> for govlens_core::Error {
    fn from(err: OffchainApiError) -> Self {
        govlens_core::Error::Provider(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        assert_eq!(
            OffchainApiError::api(503, "unavailable").retry_class(),
            ApiRetryClass::Retryable
        );
        assert_eq!(
            OffchainApiError::api(429, "rate limited").retry_class(),
            ApiRetryClass::Retryable
        );
    }

    #[test]
    fn client_errors_are_permanent() {
        assert_eq!(
            OffchainApiError::api(400, "bad cursor").retry_class(),
            ApiRetryClass::Permanent
        );
    }

    #[test]
    fn api_error_exposes_status() {
        assert_eq!(OffchainApiError::api(404, "missing").status_code(), Some(404));
    }
}
