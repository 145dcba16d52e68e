//! Video player API
//!
//! [`VideoPlayer`] is what a UI holds on to. It turns a user-entered URL into
//! a playback session on the right backend, fetches subtitles for embedded
//! videos, and answers word lookups for the subtitle overlay.

use crate::config::GlobalConfig;
use crate::event::{EventHub, EventStream};
use crate::session::PlaybackSession;
use crate::synchronizer::{FullscreenHost, PlaybackSynchronizer, SessionServices};
use crate::FlixFluent;
use flixfluent_core::{PlaybackRate, PlayerError, PlayerResult, PollScheduler, VideoSource};
use flixfluent_media::{
    ContainerHandle, EmbedHost, EmbedOptions, EmbeddedBackend, MediaBackend, NativeBackend,
    NativeHost,
};
use flixfluent_proxy::{
    annotate_subtitle, DictionaryWordLookup, KoreanDictionary, ProxyClient, ProxySubtitleSource,
    ProxyWordLookup, StaticSubtitleSource, SubtitleSource, SubtitleWord, WordAnalysis,
    WordLookup, WordTranslation,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Videos offered as quick picks in the URL bar
pub const DEMO_VIDEO_URLS: [&str; 3] = [
    "https://youtu.be/K3PDRB9R-YI?si=_ZHKj-EBSun9SsSp",
    "https://youtu.be/GJMG5Aj9rM8?si=tLn0wP2dtqTRN4KG",
    "https://youtu.be/p0U6qZBLoFs?si=mU0vN3jxpo2A2AE7",
];

/// Fluent builder for a [`VideoPlayer`]
pub struct VideoPlayerBuilder {
    config: GlobalConfig,
    native_host: Option<Arc<dyn NativeHost>>,
    embed_host: Option<Arc<dyn EmbedHost>>,
    fullscreen_host: Option<Arc<dyn FullscreenHost>>,
    subtitle_source: Option<Arc<dyn SubtitleSource>>,
    word_lookup: Option<Arc<dyn WordLookup>>,
    dictionary: KoreanDictionary,
}

impl std::fmt::Debug for VideoPlayerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPlayerBuilder")
            .field("config", &self.config)
            .field("has_native_host", &self.native_host.is_some())
            .field("has_embed_host", &self.embed_host.is_some())
            .finish()
    }
}

impl VideoPlayerBuilder {
    pub(crate) fn new(flix: &FlixFluent) -> Self {
        Self::with_config(flix.config().clone())
    }

    /// Builder over an explicit configuration
    pub fn with_config(config: GlobalConfig) -> Self {
        Self {
            config,
            native_host: None,
            embed_host: None,
            fullscreen_host: None,
            subtitle_source: None,
            word_lookup: None,
            dictionary: KoreanDictionary::default(),
        }
    }

    /// Host that creates media elements for direct URLs
    pub fn native_host(mut self, host: Arc<dyn NativeHost>) -> Self {
        self.native_host = Some(host);
        self
    }

    /// Host that creates embed widgets for YouTube videos
    pub fn embed_host(mut self, host: Arc<dyn EmbedHost>) -> Self {
        self.embed_host = Some(host);
        self
    }

    /// Host that switches the player in and out of fullscreen
    pub fn fullscreen_host(mut self, host: Arc<dyn FullscreenHost>) -> Self {
        self.fullscreen_host = Some(host);
        self
    }

    /// Override where subtitles for embedded videos come from
    pub fn subtitle_source(mut self, source: Arc<dyn SubtitleSource>) -> Self {
        self.subtitle_source = Some(source);
        self
    }

    /// Override how selected words are analyzed
    pub fn word_lookup(mut self, lookup: Arc<dyn WordLookup>) -> Self {
        self.word_lookup = Some(lookup);
        self
    }

    /// Dictionary used for subtitle glosses
    pub fn dictionary(mut self, dictionary: KoreanDictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    /// Build the player.
    ///
    /// Without explicit sources, a configured proxy URL selects the proxy
    /// service; otherwise the player runs offline on the built-in script and
    /// dictionary.
    pub fn build(self) -> PlayerResult<VideoPlayer> {
        let client = match self.config.proxy_url.as_deref() {
            Some(url) => Some(ProxyClient::new(url, self.config.request_timeout).map_err(|e| {
                PlayerError::Initialization {
                    reason: format!("Failed to create proxy client: {}", e),
                }
            })?),
            None => None,
        };

        let subtitle_source = match (self.subtitle_source, &client) {
            (Some(source), _) => source,
            (None, Some(client)) => Arc::new(ProxySubtitleSource::new(client.clone())),
            (None, None) => Arc::new(StaticSubtitleSource::default()),
        };
        let word_lookup = match (self.word_lookup, client) {
            (Some(lookup), _) => lookup,
            (None, Some(client)) => Arc::new(ProxyWordLookup::new(client)),
            (None, None) => Arc::new(DictionaryWordLookup::new(self.dictionary.clone())),
        };

        info!(
            "🚀 Video player ready (proxy: {})",
            self.config.proxy_url.as_deref().unwrap_or("offline")
        );

        Ok(VideoPlayer {
            config: self.config,
            native_host: self.native_host,
            embed_host: self.embed_host,
            fullscreen_host: self.fullscreen_host,
            subtitle_source,
            word_lookup,
            dictionary: self.dictionary,
            scheduler: PollScheduler::new(),
            events: EventHub::new(),
            session: None,
        })
    }
}

/// Plays one video at a time with synchronized subtitles
pub struct VideoPlayer {
    config: GlobalConfig,
    native_host: Option<Arc<dyn NativeHost>>,
    embed_host: Option<Arc<dyn EmbedHost>>,
    fullscreen_host: Option<Arc<dyn FullscreenHost>>,
    subtitle_source: Arc<dyn SubtitleSource>,
    word_lookup: Arc<dyn WordLookup>,
    dictionary: KoreanDictionary,
    scheduler: PollScheduler,
    events: EventHub,
    session: Option<PlaybackSynchronizer>,
}

impl std::fmt::Debug for VideoPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPlayer")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("active_timers", &self.scheduler.total_active())
            .finish()
    }
}

impl VideoPlayer {
    /// Start building a player with `config`
    pub fn builder(config: GlobalConfig) -> VideoPlayerBuilder {
        VideoPlayerBuilder::with_config(config)
    }

    /// Configuration the player runs with
    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Subscribe to player events.
    ///
    /// Subscribers see events of every session loaded from now on.
    pub fn events(&self) -> EventStream {
        self.events.subscribe()
    }

    /// Current session, if a video is loaded
    pub fn session(&self) -> Option<&PlaybackSynchronizer> {
        self.session.as_ref()
    }

    fn active(&self) -> PlayerResult<&PlaybackSynchronizer> {
        self.session.as_ref().ok_or(PlayerError::NoActiveSession)
    }

    /// Load `url`, replacing the current video.
    ///
    /// YouTube links and bare video ids play through the embed host and get
    /// subtitles from the subtitle source; anything else must be an absolute
    /// URL and plays on the native host with its own text tracks. An input
    /// that fails to parse leaves the current video playing.
    pub async fn load(&mut self, url: &str) -> PlayerResult<PlaybackSynchronizer> {
        let source = VideoSource::parse(url)?;
        self.unload().await;

        let backend: Arc<dyn MediaBackend> = match &source {
            VideoSource::YouTube { video_id } => {
                let host = self.embed_host.as_deref().ok_or_else(|| {
                    PlayerError::MissingConfiguration {
                        field: "embed_host".to_string(),
                    }
                })?;
                let container = ContainerHandle::new(self.config.embed_container.clone());
                Arc::new(EmbeddedBackend::create(
                    host,
                    &container,
                    video_id,
                    &EmbedOptions::default(),
                )?)
            }
            VideoSource::Direct { url } => {
                let host = self.native_host.as_deref().ok_or_else(|| {
                    PlayerError::MissingConfiguration {
                        field: "native_host".to_string(),
                    }
                })?;
                Arc::new(NativeBackend::open(host, url.as_str())?)
            }
        };

        let services = SessionServices {
            scheduler: self.scheduler.clone(),
            events: self.events.clone(),
            fullscreen: self.fullscreen_host.clone(),
        };
        let session =
            PlaybackSynchronizer::start(backend, source.clone(), self.config.sync.clone(), services)?;

        if let VideoSource::YouTube { video_id } = source {
            self.spawn_subtitle_fetch(&session, video_id);
        }

        self.session = Some(session.clone());
        Ok(session)
    }

    fn spawn_subtitle_fetch(&self, session: &PlaybackSynchronizer, video_id: String) {
        let session = session.clone();
        let source = Arc::clone(&self.subtitle_source);
        let language = self.config.preferred_language.clone();

        tokio::spawn(async move {
            match session
                .load_subtitles(source.as_ref(), &video_id, &language)
                .await
            {
                Ok(count) => debug!("Subtitles for {} installed ({} cues)", video_id, count),
                Err(e) => debug!("Subtitles for {} not installed: {}", video_id, e),
            }
        });
    }

    /// Shut down the current session, if any
    pub async fn unload(&mut self) {
        if let Some(session) = self.session.take() {
            session.shutdown().await;
        }
    }

    /// Copy of the current session state
    pub fn snapshot(&self) -> PlayerResult<PlaybackSession> {
        Ok(self.active()?.snapshot())
    }

    /// Play / pause the current video
    pub async fn toggle_play(&self) -> PlayerResult<()> {
        self.active()?.toggle_play().await
    }

    /// Seek relative to the current position
    pub async fn seek_by(&self, delta_seconds: f64) -> PlayerResult<f64> {
        self.active()?.seek_by(delta_seconds).await
    }

    /// Skip forward by the configured step
    pub async fn skip_forward(&self) -> PlayerResult<f64> {
        self.active()?.skip_forward().await
    }

    /// Skip back by the configured step
    pub async fn skip_backward(&self) -> PlayerResult<f64> {
        self.active()?.skip_backward().await
    }

    /// Seek to a fraction of the duration, as from a progress-bar click
    pub async fn seek_to_fraction(&self, fraction: f64) -> PlayerResult<f64> {
        self.active()?.seek_to_fraction(fraction).await
    }

    /// Advance to the next playback rate
    pub async fn cycle_playback_rate(&self) -> PlayerResult<PlaybackRate> {
        self.active()?.cycle_playback_rate().await
    }

    /// Enter or leave fullscreen
    pub fn toggle_fullscreen(&self) -> PlayerResult<bool> {
        self.active()?.toggle_fullscreen()
    }

    /// Show or hide subtitles
    pub fn toggle_subtitle_visibility(&self) -> PlayerResult<bool> {
        Ok(self.active()?.toggle_subtitle_visibility())
    }

    /// Split `text` into words with dictionary glosses
    pub fn annotate(&self, text: &str) -> Vec<SubtitleWord> {
        annotate_subtitle(text, &self.dictionary)
    }

    /// Words of the active subtitle; empty while hidden
    pub fn current_subtitle_words(&self) -> Vec<SubtitleWord> {
        match &self.session {
            Some(session) => {
                let state = session.snapshot();
                if state.subtitles_visible {
                    self.annotate(&state.active_cue)
                } else {
                    Vec::new()
                }
            }
            None => Vec::new(),
        }
    }

    /// Detailed analysis of a word picked from the subtitles
    pub async fn analyze_word(&self, word: &str) -> WordAnalysis {
        let translation = self.dictionary.translate(word).to_string();
        debug!("🔍 Analyzing {}", word);
        self.word_lookup.lookup(word, &translation).await
    }

    /// Short translation of a word
    pub async fn translate_word(&self, word: &str) -> WordTranslation {
        let translation = self.word_lookup.translate(word).await;
        if translation == WordTranslation::unavailable() {
            warn!("Translation of {} unavailable", word);
        }
        translation
    }

    /// Live poll timers registered under `name`
    pub fn active_timer_count(&self, name: &str) -> usize {
        self.scheduler.active_count(name)
    }

    /// Live poll timers across all names
    pub fn total_active_timers(&self) -> usize {
        self.scheduler.total_active()
    }
}
