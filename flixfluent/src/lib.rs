//! # FlixFluent - Language Learning Video Player
//!
//! FlixFluent plays videos with synchronized, clickable subtitles for
//! language learners. A user pastes a link; YouTube videos play through the
//! embed widget with subtitles fetched from a proxy service, any other URL
//! plays on a native media element with its own text tracks.
//!
//! ## Key Features
//!
//! - **One control surface**: play, seek, rate and fullscreen work the same
//!   on native and embedded playback
//! - **Subtitle sync**: pushed cue changes for native tracks, polled active
//!   cues for fetched subtitles
//! - **Word lookup**: every subtitle word can be analyzed or translated
//! - **Graceful degradation**: proxy failures fall back to a built-in script
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flixfluent::{FlixFluent, SimulatedEmbedHost};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut player = FlixFluent::from_env()
//!         .player()
//!         .embed_host(Arc::new(SimulatedEmbedHost::new()))
//!         .build()?;
//!
//!     let mut events = player.events();
//!     player.load("https://youtu.be/K3PDRB9R-YI").await?;
//!
//!     while let Some(event) = events.next().await {
//!         println!("Player event: {:?}", event);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core types for easy access
pub use flixfluent_core::{
    extract_youtube_video_id, format_timestamp, progress_percent, CueTrack, OverlapPolicy,
    PlaybackRate, PlayerError, PlayerResult, PollScheduler, SubtitleCue, VideoSource,
};

pub use flixfluent_media::{
    BackendKind, ContainerHandle, EmbedErrorCode, EmbedHost, EmbedOptions, EmbedPlayer,
    EmbedPlayerState, MediaBackend, MediaElement, MediaError, NativeEventSink, NativeHost,
    SimulatedEmbedHost, SimulatedEmbedPlayer, SimulatedMediaElement, SimulatedNativeHost,
    SimulatedOp, TextTrack,
};

pub use flixfluent_proxy::{
    fallback_subtitles, KoreanDictionary, ProxyClient, StaticSubtitleSource, SubtitleSource,
    SubtitleWord, WordAnalysis, WordLookup, WordTranslation,
};

// Public API modules
pub mod config;
pub mod event;
pub mod logging;
pub mod player;
pub mod session;
pub mod synchronizer;

// Re-export main API types
pub use config::{GlobalConfig, SyncConfig};
pub use event::{Event, EventFilter, EventHub, EventStream, FilteredEventStream};
pub use logging::init_logging;
pub use player::{VideoPlayer, VideoPlayerBuilder, DEMO_VIDEO_URLS};
pub use session::PlaybackSession;
pub use synchronizer::{FullscreenHost, PlaybackSynchronizer, SessionServices};

/// Main entry point for FlixFluent
#[derive(Debug, Clone)]
pub struct FlixFluent {
    inner: std::sync::Arc<FlixFluentInner>,
}

#[derive(Debug)]
struct FlixFluentInner {
    config: GlobalConfig,
}

impl FlixFluent {
    /// Initialize FlixFluent with default settings
    ///
    /// # Example
    /// ```rust
    /// use flixfluent::FlixFluent;
    ///
    /// let flix = FlixFluent::init();
    /// assert!(flix.config().proxy_url.is_none());
    /// ```
    pub fn init() -> Self {
        Self::init_with(GlobalConfig::default())
    }

    /// Initialize with settings read from the environment
    pub fn from_env() -> Self {
        Self::init_with(GlobalConfig::from_env())
    }

    /// Initialize with custom global configuration
    pub fn init_with(config: GlobalConfig) -> Self {
        Self {
            inner: std::sync::Arc::new(FlixFluentInner { config }),
        }
    }

    /// Global configuration
    pub fn config(&self) -> &GlobalConfig {
        &self.inner.config
    }

    /// Install the log subscriber for this configuration
    pub fn init_logging(&self) -> PlayerResult<()> {
        logging::init_logging(&self.inner.config)
    }

    /// Create a player builder
    ///
    /// # Example
    /// ```rust
    /// use flixfluent::{FlixFluent, SimulatedNativeHost};
    /// use std::sync::Arc;
    ///
    /// let player = FlixFluent::init()
    ///     .player()
    ///     .native_host(Arc::new(SimulatedNativeHost::new()))
    ///     .build()?;
    /// # Ok::<(), flixfluent::PlayerError>(())
    /// ```
    pub fn player(&self) -> VideoPlayerBuilder {
        VideoPlayerBuilder::new(self)
    }
}
