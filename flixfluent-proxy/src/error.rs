//! Proxy access errors
//!
//! These never reach the player: subtitle and word lookups turn every
//! [`ProxyError`] into their fallback content after logging it.

use thiserror::Error;

/// Errors raised while talking to the proxy service
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Configured base URL is unusable
    #[error("Invalid proxy base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// Offending URL
        url: String,
        /// Parse failure
        reason: String,
    },

    /// Request could not be sent or the response not read
    #[error("Proxy request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("Proxy returned status {status} for {endpoint}")]
    Status {
        /// Endpoint path
        endpoint: String,
        /// HTTP status code
        status: u16,
    },

    /// Service answered with an `error` field
    #[error("Proxy service error: {message}")]
    Service {
        /// Error message from the service
        message: String,
    },

    /// Body did not match the expected shape
    #[error("Failed to decode proxy response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Service answered successfully but had nothing for the request
    #[error("No results for {what}")]
    Empty {
        /// What was requested
        what: String,
    },
}

/// Result type alias for proxy operations
pub type ProxyResult<T> = Result<T, ProxyError>;

impl ProxyError {
    /// Get error code for categorization
    pub fn error_code(&self) -> &'static str {
        match self {
            ProxyError::InvalidBaseUrl { .. } => "INVALID_BASE_URL",
            ProxyError::Http(_) => "HTTP_ERROR",
            ProxyError::Status { .. } => "STATUS_ERROR",
            ProxyError::Service { .. } => "SERVICE_ERROR",
            ProxyError::Decode(_) => "DECODE_ERROR",
            ProxyError::Empty { .. } => "EMPTY_RESULT",
        }
    }
}
