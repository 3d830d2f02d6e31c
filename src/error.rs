// src/error.rs

//! Unified error handling for the gateway.

use std::fmt;

use thiserror::Error;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// No document matched, or a requested document does not exist
    #[error("{0}")]
    NotFound(String),

    /// Malformed opaque token (resume cursor or article ID)
    #[error("Invalid token '{token}': {message}")]
    Decode { token: String, message: String },

    /// Unknown collection, term field or aggregation in the request path
    #[error("{0}")]
    InvalidPath(String),

    /// Malformed request body or query parameters
    #[error("{0}")]
    InvalidBody(String),

    /// The search engine rejected the query
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Search engine could not be reached
    #[error("Search backend unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Search engine did not answer in time
    #[error("Search backend timed out: {0}")]
    UpstreamTimeout(String),

    /// Search engine answered with an unexpected status or payload
    #[error("Search backend error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// Stored document is missing a required field
    #[error("Data integrity error for document {id}: {message}")]
    Integrity { id: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a token decoding error.
    pub fn decode(token: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Decode {
            token: token.into(),
            message: message.to_string(),
        }
    }

    /// Create an error for an unknown path segment.
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::InvalidPath(message.into())
    }

    /// Create an error for a malformed request body.
    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::InvalidBody(message.into())
    }

    /// Create an upstream error with the engine's status code.
    pub fn upstream(status: u16, message: impl fmt::Display) -> Self {
        Self::Upstream {
            status,
            message: message.to_string(),
        }
    }

    /// Create a data integrity error for a stored document.
    pub fn integrity(id: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Integrity {
            id: id.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the error means the search engine itself failed.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable(_) | Self::UpstreamTimeout(_) | Self::Upstream { .. }
        )
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::UpstreamTimeout(err.to_string())
        } else if let Some(status) = err.status() {
            Self::upstream(status.as_u16(), err)
        } else {
            Self::UpstreamUnavailable(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_keeps_token_and_reason() {
        let err = AppError::decode("@@", "invalid byte");
        let text = err.to_string();
        assert!(text.contains("@@"));
        assert!(text.contains("invalid byte"));
    }

    #[test]
    fn test_is_upstream() {
        assert!(AppError::UpstreamTimeout("slow".into()).is_upstream());
        assert!(AppError::upstream(503, "down").is_upstream());
        assert!(!AppError::not_found("nothing").is_upstream());
    }
}
