//! Error types for FlixFluent

use std::time::Duration;
use thiserror::Error;

/// Main error type for FlixFluent player operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlayerError {
    /// Initialization error
    #[error("Initialization failed: {reason}")]
    Initialization {
        /// Reason for initialization failure
        reason: String,
    },

    /// Missing configuration error
    #[error("Missing required configuration: {field}")]
    MissingConfiguration {
        /// Missing configuration field
        field: String,
    },

    /// No URL was supplied
    #[error("Empty URL: please enter a valid video URL")]
    EmptyUrl,

    /// URL could not be understood as a video source
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl {
        /// URL as supplied by the caller
        url: String,
        /// Reason the URL was rejected
        reason: String,
    },

    /// Argument outside of its accepted range
    #[error("Invalid argument {name}: {reason}")]
    InvalidArgument {
        /// Argument name
        name: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A media backend call failed; the session keeps running
    #[error("Playback error during {operation}: {reason}")]
    Playback {
        /// Backend operation that failed
        operation: String,
        /// Reason reported by the backend
        reason: String,
    },

    /// The active backend does not support the operation
    #[error("Unsupported operation: {operation}")]
    UnsupportedOperation {
        /// Operation that is not supported
        operation: String,
    },

    /// The embed widget refused the video
    #[error("Embed rejected video (code {code}): {reason}")]
    EmbedRejected {
        /// Numeric code reported by the embed widget
        code: i32,
        /// Human-readable category
        reason: String,
    },

    /// The session hit a terminal error and no longer accepts commands
    #[error("Session terminated: {reason}")]
    SessionTerminated {
        /// Terminal error message
        reason: String,
    },

    /// No video is loaded
    #[error("No active playback session")]
    NoActiveSession,

    /// Invalid state error
    #[error("Invalid state: expected {expected}, got {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },

    /// Operation timed out error
    #[error("Operation timed out: {operation} after {duration:?}")]
    Timeout {
        /// Operation that timed out
        operation: String,
        /// Duration after which timeout occurred
        duration: Duration,
    },
}

/// Result alias used across the workspace
pub type PlayerResult<T> = Result<T, PlayerError>;

impl PlayerError {
    /// Get error code for programmatic handling
    pub fn error_code(&self) -> String {
        match self {
            PlayerError::Initialization { .. } => "INITIALIZATION_FAILED".to_string(),
            PlayerError::MissingConfiguration { .. } => "MISSING_CONFIGURATION".to_string(),
            PlayerError::EmptyUrl => "EMPTY_URL".to_string(),
            PlayerError::InvalidUrl { .. } => "INVALID_URL".to_string(),
            PlayerError::InvalidArgument { .. } => "INVALID_ARGUMENT".to_string(),
            PlayerError::Playback { .. } => "PLAYBACK_ERROR".to_string(),
            PlayerError::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION".to_string(),
            PlayerError::EmbedRejected { .. } => "EMBED_REJECTED".to_string(),
            PlayerError::SessionTerminated { .. } => "SESSION_TERMINATED".to_string(),
            PlayerError::NoActiveSession => "NO_ACTIVE_SESSION".to_string(),
            PlayerError::InvalidState { .. } => "INVALID_STATE".to_string(),
            PlayerError::Timeout { .. } => "TIMEOUT".to_string(),
        }
    }

    /// Whether the session survives this error.
    ///
    /// Backend hiccups and bad arguments are scoped to one call; embed
    /// rejections end the session.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            PlayerError::EmbedRejected { .. }
                | PlayerError::SessionTerminated { .. }
                | PlayerError::Initialization { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PlayerError::EmptyUrl.error_code(), "EMPTY_URL");
        assert_eq!(PlayerError::NoActiveSession.error_code(), "NO_ACTIVE_SESSION");

        let err = PlayerError::Playback {
            operation: "pause".to_string(),
            reason: "player not ready".to_string(),
        };
        assert_eq!(err.error_code(), "PLAYBACK_ERROR");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_embed_rejection_is_terminal() {
        let err = PlayerError::EmbedRejected {
            code: 150,
            reason: "This video cannot be embedded".to_string(),
        };
        assert!(!err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Embed rejected video (code 150): This video cannot be embedded"
        );
    }
}
