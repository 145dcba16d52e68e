//! Media backend error types and handling
//!
//! This module defines the errors raised by media backends and their host
//! bindings, with enough context for the player to decide whether a failure
//! is a passing hiccup or ends the session.

use crate::embedded::EmbedErrorCode;
use flixfluent_core::PlayerError;
use thiserror::Error;

/// Main error type for media backend operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MediaError {
    /// A backend call threw or the backend is not reachable
    #[error("Backend unavailable during {operation}: {reason}")]
    BackendUnavailable {
        /// Operation that failed
        operation: String,
        /// Failure reason
        reason: String,
    },

    /// The backend refused to start playback
    #[error("Playback rejected: {reason}")]
    PlaybackRejected {
        /// Rejection reason
        reason: String,
    },

    /// Backend exists but has not finished initializing
    #[error("Backend not ready for {operation}")]
    NotReady {
        /// Operation attempted too early
        operation: String,
    },

    /// The backend has no implementation of the operation
    #[error("Unsupported operation: {operation}")]
    UnsupportedOperation {
        /// Operation name
        operation: String,
    },

    /// The embed widget refused the video
    #[error("Embed error {}: {}", .code.code(), .code.message())]
    EmbedRejected {
        /// Embed error code
        code: EmbedErrorCode,
    },

    /// Text track index out of range
    #[error("Text track not found: {index}")]
    TextTrackNotFound {
        /// Requested track index
        index: usize,
    },

    /// Time value that cannot be sought to
    #[error("Invalid time: {value}")]
    InvalidTime {
        /// Offending value
        value: f64,
    },

    /// Backend event stream already handed out
    #[error("Backend event stream already taken")]
    EventStreamTaken,

    /// Error reported by the host binding
    #[error("Host error: {message}")]
    Host {
        /// Error message
        message: String,
    },
}

/// Result type alias for media operations
pub type MediaResult<T> = Result<T, MediaError>;

impl MediaError {
    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            MediaError::BackendUnavailable { .. } => true,
            MediaError::PlaybackRejected { .. } => true,
            MediaError::NotReady { .. } => true,
            MediaError::UnsupportedOperation { .. } => true,
            MediaError::TextTrackNotFound { .. } => true,
            MediaError::InvalidTime { .. } => true,
            MediaError::Host { .. } => true,
            MediaError::EmbedRejected { .. } => false,
            MediaError::EventStreamTaken => false,
        }
    }

    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            MediaError::BackendUnavailable { .. } => ErrorCategory::Backend,
            MediaError::PlaybackRejected { .. } => ErrorCategory::Playback,
            MediaError::NotReady { .. } => ErrorCategory::State,
            MediaError::UnsupportedOperation { .. } => ErrorCategory::Backend,
            MediaError::EmbedRejected { .. } => ErrorCategory::Embed,
            MediaError::TextTrackNotFound { .. } => ErrorCategory::Track,
            MediaError::InvalidTime { .. } => ErrorCategory::Data,
            MediaError::EventStreamTaken => ErrorCategory::State,
            MediaError::Host { .. } => ErrorCategory::Host,
        }
    }

    /// Name of the operation the error belongs to
    pub fn operation(&self) -> &str {
        match self {
            MediaError::BackendUnavailable { operation, .. }
            | MediaError::NotReady { operation }
            | MediaError::UnsupportedOperation { operation } => operation,
            MediaError::PlaybackRejected { .. } => "play",
            MediaError::EmbedRejected { .. } => "load",
            MediaError::TextTrackNotFound { .. } => "attach_text_track",
            MediaError::InvalidTime { .. } => "seek",
            MediaError::EventStreamTaken => "take_events",
            MediaError::Host { .. } => "host",
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Backend call failures
    Backend,
    /// Playback start refused
    Playback,
    /// Embed widget refusals
    Embed,
    /// Text track errors
    Track,
    /// Backend lifecycle errors
    State,
    /// Invalid values
    Data,
    /// Host binding errors
    Host,
}

impl From<MediaError> for PlayerError {
    fn from(error: MediaError) -> Self {
        match error {
            MediaError::UnsupportedOperation { operation } => {
                PlayerError::UnsupportedOperation { operation }
            }
            MediaError::EmbedRejected { code } => PlayerError::EmbedRejected {
                code: code.code(),
                reason: code.message().to_string(),
            },
            other => PlayerError::Playback {
                operation: other.operation().to_string(),
                reason: other.to_string(),
            },
        }
    }
}

/// Helper trait for converting host binding errors
pub trait IntoMediaError {
    /// Wrap `self` as a host error with some context
    fn into_media_error(self, context: &str) -> MediaError;
}

impl IntoMediaError for Box<dyn std::error::Error + Send + Sync> {
    fn into_media_error(self, context: &str) -> MediaError {
        MediaError::Host {
            message: format!("{}: {}", context, self),
        }
    }
}

impl IntoMediaError for String {
    fn into_media_error(self, context: &str) -> MediaError {
        MediaError::Host {
            message: format!("{}: {}", context, self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let unavailable = MediaError::BackendUnavailable {
            operation: "pause".to_string(),
            reason: "player not initialized".to_string(),
        };
        assert_eq!(unavailable.category(), ErrorCategory::Backend);
        assert!(unavailable.is_recoverable());

        let rejected = MediaError::EmbedRejected {
            code: EmbedErrorCode::NotFound,
        };
        assert_eq!(rejected.category(), ErrorCategory::Embed);
        assert!(!rejected.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let error = MediaError::EmbedRejected {
            code: EmbedErrorCode::EmbeddingDisallowed(150),
        };
        assert_eq!(
            error.to_string(),
            "Embed error 150: This video cannot be embedded"
        );
    }

    #[test]
    fn test_into_player_error() {
        let error: PlayerError = MediaError::BackendUnavailable {
            operation: "seek".to_string(),
            reason: "boom".to_string(),
        }
        .into();
        assert_eq!(error.error_code(), "PLAYBACK_ERROR");

        let error: PlayerError = MediaError::UnsupportedOperation {
            operation: "set_playback_rate".to_string(),
        }
        .into();
        assert_eq!(error.error_code(), "UNSUPPORTED_OPERATION");

        let error: PlayerError = MediaError::EmbedRejected {
            code: EmbedErrorCode::InvalidParameter,
        }
        .into();
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_host_error_conversion() {
        let error = "element detached".to_string().into_media_error("set_source");
        assert_eq!(error.to_string(), "Host error: set_source: element detached");
    }
}
