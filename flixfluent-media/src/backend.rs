//! Media backend contract
//!
//! The player drives every video through one [`MediaBackend`]. Two
//! implementations exist: [`crate::NativeBackend`] wraps a media element that
//! pushes time and state notifications, and [`crate::EmbeddedBackend`] wraps a
//! third-party embed widget that only answers pull queries and reports coarse
//! state changes. Which notifications arrive, and whether the player has to
//! poll, is decided by [`BackendKind`].

use crate::embedded::{EmbedErrorCode, EmbedPlayerState};
use crate::error::MediaResult;
use crate::tracks::TextTrack;
use async_trait::async_trait;
use flixfluent_core::PlaybackRate;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Which kind of backend plays the current video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    /// Media element with push notifications and built-in text tracks
    Native,
    /// Embed widget controlled through pull accessors
    Embedded,
}

impl BackendKind {
    /// Whether the player must poll the backend for time updates
    pub fn uses_polling(self) -> bool {
        matches!(self, BackendKind::Embedded)
    }
}

/// Notification pushed by a backend's host binding
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// Playback position advanced (native)
    TimeUpdate,
    /// Duration and tracks are known (native)
    MetadataLoaded,
    /// Playback started (native)
    Play,
    /// Playback paused (native)
    Pause,
    /// Active cues of the attached text track changed (native)
    CueChange {
        /// Texts of the currently active cues, in track order
        texts: Vec<String>,
    },
    /// Embed widget finished initializing (embedded)
    Ready,
    /// Embed widget state changed (embedded)
    StateChange {
        /// New widget state
        state: EmbedPlayerState,
    },
    /// Embed widget reported an error (embedded)
    Error {
        /// Widget error code
        code: EmbedErrorCode,
    },
}

impl BackendEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            BackendEvent::TimeUpdate => "time_update",
            BackendEvent::MetadataLoaded => "metadata_loaded",
            BackendEvent::Play => "play",
            BackendEvent::Pause => "pause",
            BackendEvent::CueChange { .. } => "cue_change",
            BackendEvent::Ready => "ready",
            BackendEvent::StateChange { .. } => "state_change",
            BackendEvent::Error { .. } => "error",
        }
    }
}

/// Stream of backend notifications for async iteration
#[derive(Debug)]
pub struct BackendEventStream {
    receiver: mpsc::UnboundedReceiver<BackendEvent>,
}

impl BackendEventStream {
    /// Create a connected sender / stream pair
    pub fn channel() -> (mpsc::UnboundedSender<BackendEvent>, Self) {
        let (tx, receiver) = mpsc::unbounded_channel();
        (tx, Self { receiver })
    }

    /// Get the next event from the stream
    pub async fn next(&mut self) -> Option<BackendEvent> {
        self.receiver.recv().await
    }

    /// Try to get the next event without blocking
    pub fn try_next(&mut self) -> Option<BackendEvent> {
        self.receiver.try_recv().ok()
    }

    /// Close the stream; later notifications are dropped
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

/// Uniform control surface over native and embedded playback.
///
/// Calls that reach into the host may fail at any time (the widget may not
/// be ready, the element may reject playback); implementations report those
/// failures as [`crate::MediaError`] and never panic.
#[async_trait]
pub trait MediaBackend: Send + Sync + std::fmt::Debug {
    /// Backend kind
    fn kind(&self) -> BackendKind;

    /// Hand out the notification stream; returns `None` after the first call
    fn take_events(&self) -> Option<BackendEventStream>;

    /// Current playback position in seconds
    async fn current_time(&self) -> MediaResult<f64>;

    /// Duration in seconds; NaN or 0 while unknown
    async fn duration(&self) -> MediaResult<f64>;

    /// Start playback
    async fn play(&self) -> MediaResult<()>;

    /// Pause playback
    async fn pause(&self) -> MediaResult<()>;

    /// Seek to an absolute position
    async fn seek_to(&self, seconds: f64, allow_seek_ahead: bool) -> MediaResult<()>;

    /// Change the playback speed
    async fn set_playback_rate(&self, rate: PlaybackRate) -> MediaResult<()>;

    /// Text tracks carried by the media
    fn text_tracks(&self) -> Vec<TextTrack> {
        Vec::new()
    }

    /// Start receiving cue changes from the track at `index`
    fn attach_text_track(&self, _index: usize) -> MediaResult<TextTrack> {
        Err(crate::MediaError::UnsupportedOperation {
            operation: "attach_text_track".to_string(),
        })
    }

    /// Stop receiving cue changes
    fn detach_text_track(&self) {}

    /// Release host resources; the backend is unusable afterwards
    async fn teardown(&self) {}
}
