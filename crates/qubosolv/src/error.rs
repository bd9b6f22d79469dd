//! Error types for the QUBO solver client.

use thiserror::Error;

/// Result type for solver client operations.
pub type QuboResult<T> = Result<T, QuboError>;

/// Errors that can occur when talking to the annealing service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuboError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the credential file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Credentials or token are missing or incomplete.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The identity provider or the API rejected the credentials.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// API error response.
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// The solver response lacks a field or holds a value of the wrong shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl QuboError {
    /// Shorthand for a [`QuboError::Configuration`].
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether this error stems from missing or incomplete credentials.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
