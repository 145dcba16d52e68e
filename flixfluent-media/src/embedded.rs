//! Embedded video widget backend
//!
//! Wraps a third-party embed player (a YouTube iframe player in a browser
//! binding). The widget only answers pull queries for time and duration and
//! reports readiness, coarse state changes and errors through the
//! [`EmbedCallbacks`] triple, so the player polls it for progress.

use crate::backend::{BackendEvent, BackendEventStream, BackendKind, MediaBackend};
use crate::error::{MediaError, MediaResult};
use async_trait::async_trait;
use flixfluent_core::PlaybackRate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Widget state reported through the state-change callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbedPlayerState {
    /// -1
    Unstarted,
    /// 0
    Ended,
    /// 1
    Playing,
    /// 2
    Paused,
    /// 3
    Buffering,
    /// 5
    Cued,
    /// Any code the widget adds later
    Unknown(i32),
}

impl EmbedPlayerState {
    /// Decode a widget state code
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => EmbedPlayerState::Unstarted,
            0 => EmbedPlayerState::Ended,
            1 => EmbedPlayerState::Playing,
            2 => EmbedPlayerState::Paused,
            3 => EmbedPlayerState::Buffering,
            5 => EmbedPlayerState::Cued,
            other => EmbedPlayerState::Unknown(other),
        }
    }

    /// Widget state code
    pub fn code(self) -> i32 {
        match self {
            EmbedPlayerState::Unstarted => -1,
            EmbedPlayerState::Ended => 0,
            EmbedPlayerState::Playing => 1,
            EmbedPlayerState::Paused => 2,
            EmbedPlayerState::Buffering => 3,
            EmbedPlayerState::Cued => 5,
            EmbedPlayerState::Unknown(code) => code,
        }
    }
}

/// Widget error reported through the error callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmbedErrorCode {
    /// 2: the request contains an invalid parameter value
    InvalidParameter,
    /// 5: the content cannot be played in an HTML5 player
    Html5Unsupported,
    /// 100: the video was not found (removed or private)
    NotFound,
    /// 101 or 150: the owner does not allow embedded playback
    EmbeddingDisallowed(i32),
    /// Any other code
    Unknown(i32),
}

impl EmbedErrorCode {
    /// Decode a widget error code
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => EmbedErrorCode::InvalidParameter,
            5 => EmbedErrorCode::Html5Unsupported,
            100 => EmbedErrorCode::NotFound,
            101 | 150 => EmbedErrorCode::EmbeddingDisallowed(code),
            other => EmbedErrorCode::Unknown(other),
        }
    }

    /// Widget error code
    pub fn code(self) -> i32 {
        match self {
            EmbedErrorCode::InvalidParameter => 2,
            EmbedErrorCode::Html5Unsupported => 5,
            EmbedErrorCode::NotFound => 100,
            EmbedErrorCode::EmbeddingDisallowed(code) | EmbedErrorCode::Unknown(code) => code,
        }
    }

    /// User-facing message
    pub fn message(self) -> &'static str {
        match self {
            EmbedErrorCode::InvalidParameter => "Invalid video parameters",
            EmbedErrorCode::Html5Unsupported => "This video cannot be played in this player",
            EmbedErrorCode::NotFound => "Video not found",
            EmbedErrorCode::EmbeddingDisallowed(_) => "This video cannot be embedded",
            EmbedErrorCode::Unknown(_) => "An unknown error occurred",
        }
    }
}

impl fmt::Display for EmbedErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.message())
    }
}

/// Handle to the element the widget renders into
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerHandle(String);

impl ContainerHandle {
    /// Wrap a container element id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Container element id
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Player parameters passed to the widget on creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedOptions {
    /// CSS width
    pub width: String,
    /// CSS height
    pub height: String,
    /// Whether the widget shows its own captions by default
    pub show_captions: bool,
    /// Reduced widget branding
    pub modest_branding: bool,
    /// Related videos at the end
    pub show_related: bool,
    /// Widget's own control bar
    pub show_controls: bool,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            width: "100%".to_string(),
            height: "100%".to_string(),
            show_captions: false,
            modest_branding: true,
            show_related: false,
            show_controls: false,
        }
    }
}

impl EmbedOptions {
    /// Options as the widget's `playerVars` key/value pairs
    pub fn player_vars(&self) -> Vec<(&'static str, u8)> {
        vec![
            ("cc_load_policy", u8::from(self.show_captions)),
            ("modestbranding", u8::from(self.modest_branding)),
            ("rel", u8::from(self.show_related)),
            ("controls", u8::from(self.show_controls)),
        ]
    }
}

/// Host embed widget; mirrors the pull API of the iframe player
pub trait EmbedPlayer: Send + Sync {
    /// Current position in seconds
    fn get_current_time(&self) -> MediaResult<f64>;
    /// Duration in seconds, 0 until known
    fn get_duration(&self) -> MediaResult<f64>;
    /// Start playback
    fn play_video(&self) -> MediaResult<()>;
    /// Pause playback
    fn pause_video(&self) -> MediaResult<()>;
    /// Seek; `allow_seek_ahead` lets the widget fetch unbuffered data
    fn seek_to(&self, seconds: f64, allow_seek_ahead: bool) -> MediaResult<()>;
    /// Change the playback speed
    fn set_playback_rate(&self, rate: f64) -> MediaResult<()>;
    /// Point the widget at another video
    fn load_video_by_id(&self, video_id: &str) -> MediaResult<()>;
    /// Remove the widget from its container
    fn destroy(&self);
}

/// Creates embed widgets
pub trait EmbedHost: Send + Sync {
    /// Create a widget in `container` playing `video_id`, reporting through `callbacks`
    fn create_player(
        &self,
        container: &ContainerHandle,
        video_id: &str,
        options: &EmbedOptions,
        callbacks: EmbedCallbacks,
    ) -> MediaResult<Box<dyn EmbedPlayer>>;
}

/// Readiness / state-change / error notification triple given to the widget
#[derive(Debug, Clone)]
pub struct EmbedCallbacks {
    tx: mpsc::UnboundedSender<BackendEvent>,
}

impl EmbedCallbacks {
    /// Widget is ready to accept commands
    pub fn on_ready(&self) {
        self.send(BackendEvent::Ready);
    }

    /// Widget state changed
    pub fn on_state_change(&self, code: i32) {
        self.send(BackendEvent::StateChange {
            state: EmbedPlayerState::from_code(code),
        });
    }

    /// Widget reported an error
    pub fn on_error(&self, code: i32) {
        let code = EmbedErrorCode::from_code(code);
        warn!("📺 Embed player error: {}", code);
        self.send(BackendEvent::Error { code });
    }

    fn send(&self, event: BackendEvent) {
        if self.tx.send(event).is_err() {
            debug!("Embedded backend dropped; callback discarded");
        }
    }
}

/// Backend over an embed widget
pub struct EmbeddedBackend {
    player: Box<dyn EmbedPlayer>,
    video_id: Mutex<String>,
    container: ContainerHandle,
    events: Mutex<Option<BackendEventStream>>,
}

impl EmbeddedBackend {
    /// Create a widget for `video_id` in `container` through `host`
    pub fn create(
        host: &dyn EmbedHost,
        container: &ContainerHandle,
        video_id: &str,
        options: &EmbedOptions,
    ) -> MediaResult<Self> {
        let (tx, events) = BackendEventStream::channel();
        let player = host.create_player(container, video_id, options, EmbedCallbacks { tx })?;
        info!(
            "📺 Embed player created for {} in #{}",
            video_id,
            container.id()
        );

        Ok(Self {
            player,
            video_id: Mutex::new(video_id.to_string()),
            container: container.clone(),
            events: Mutex::new(Some(events)),
        })
    }

    /// Video id the widget is playing
    pub fn video_id(&self) -> String {
        self.video_id.lock().clone()
    }

    /// Reuse the widget for another video
    pub fn load_video_by_id(&self, video_id: &str) -> MediaResult<()> {
        self.player.load_video_by_id(video_id)?;
        *self.video_id.lock() = video_id.to_string();
        info!("📺 Embed player switched to {}", video_id);
        Ok(())
    }

    /// Container the widget renders into
    pub fn container(&self) -> &ContainerHandle {
        &self.container
    }
}

impl fmt::Debug for EmbeddedBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedBackend")
            .field("video_id", &*self.video_id.lock())
            .field("container", &self.container)
            .finish()
    }
}

#[async_trait]
impl MediaBackend for EmbeddedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Embedded
    }

    fn take_events(&self) -> Option<BackendEventStream> {
        self.events.lock().take()
    }

    async fn current_time(&self) -> MediaResult<f64> {
        self.player.get_current_time()
    }

    async fn duration(&self) -> MediaResult<f64> {
        self.player.get_duration()
    }

    async fn play(&self) -> MediaResult<()> {
        self.player.play_video()
    }

    async fn pause(&self) -> MediaResult<()> {
        self.player.pause_video()
    }

    async fn seek_to(&self, seconds: f64, allow_seek_ahead: bool) -> MediaResult<()> {
        if !seconds.is_finite() {
            return Err(MediaError::InvalidTime { value: seconds });
        }
        self.player.seek_to(seconds.max(0.0), allow_seek_ahead)
    }

    async fn set_playback_rate(&self, rate: PlaybackRate) -> MediaResult<()> {
        self.player.set_playback_rate(rate.as_f64())
    }

    async fn teardown(&self) {
        if let Some(mut events) = self.events.lock().take() {
            events.close();
        }
        self.player.destroy();
        debug!("Embed player for {} destroyed", self.video_id.lock());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(EmbedErrorCode::from_code(2), EmbedErrorCode::InvalidParameter);
        assert_eq!(EmbedErrorCode::from_code(5), EmbedErrorCode::Html5Unsupported);
        assert_eq!(EmbedErrorCode::from_code(100).message(), "Video not found");
        assert_eq!(
            EmbedErrorCode::from_code(101).message(),
            EmbedErrorCode::from_code(150).message()
        );
        assert_eq!(EmbedErrorCode::from_code(150).code(), 150);
        assert_eq!(
            EmbedErrorCode::from_code(42).message(),
            "An unknown error occurred"
        );
    }

    #[test]
    fn test_state_codes() {
        assert_eq!(EmbedPlayerState::from_code(1), EmbedPlayerState::Playing);
        assert_eq!(EmbedPlayerState::from_code(2), EmbedPlayerState::Paused);
        assert_eq!(EmbedPlayerState::from_code(-1).code(), -1);
        assert_eq!(EmbedPlayerState::from_code(9), EmbedPlayerState::Unknown(9));
    }

    #[test]
    fn test_default_player_vars() {
        let vars = EmbedOptions::default().player_vars();
        assert_eq!(
            vars,
            vec![
                ("cc_load_policy", 0),
                ("modestbranding", 1),
                ("rel", 0),
                ("controls", 0)
            ]
        );
    }
}
