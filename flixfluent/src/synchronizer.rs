//! Video / subtitle synchronization
//!
//! A [`PlaybackSynchronizer`] owns one playback session. It keeps the session
//! state in line with the backend's real position using whatever the backend
//! offers:
//!
//! - native backends push time, metadata and play/pause notifications, and
//!   an attached text track pushes cue changes;
//! - embedded backends only report readiness and coarse state changes, so
//!   the synchronizer polls them for progress (every second, from readiness)
//!   and for the active subtitle (every 500 ms, while cues are loaded).
//!
//! Backend failures never end the session. They are reported as
//! [`Event::PlaybackError`] and polling carries on. The exception is an embed
//! rejection, which is reported once as [`Event::TerminalError`] and stops
//! the session's timers.

use crate::config::SyncConfig;
use crate::event::{Event, EventHub};
use crate::session::PlaybackSession;
use flixfluent_core::{
    CueTrack, PlaybackRate, PlayerError, PlayerResult, PollScheduler, PollHandle, SubtitleCue,
    VideoSource,
};
use flixfluent_media::{
    BackendEvent, BackendEventStream, BackendKind, EmbedErrorCode, EmbedPlayerState,
    MediaBackend, MediaError,
};
use flixfluent_proxy::SubtitleSource;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Poll name of the active-subtitle poll
pub const SUBTITLE_POLL: &str = "subtitle";

/// Poll name of the progress poll
pub const PROGRESS_POLL: &str = "progress";

/// Host side of fullscreen handling
pub trait FullscreenHost: Send + Sync {
    /// Ask the host to enter fullscreen
    fn request_fullscreen(&self) -> PlayerResult<()>;
    /// Ask the host to leave fullscreen
    fn exit_fullscreen(&self) -> PlayerResult<()>;
}

/// Shared services a session runs on
#[derive(Clone, Default)]
pub struct SessionServices {
    /// Spawns and counts the session's polls
    pub scheduler: PollScheduler,
    /// Where session events go
    pub events: EventHub,
    /// Fullscreen host, if the UI has one
    pub fullscreen: Option<Arc<dyn FullscreenHost>>,
}

impl fmt::Debug for SessionServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionServices")
            .field("scheduler", &self.scheduler)
            .field("has_fullscreen_host", &self.fullscreen.is_some())
            .finish()
    }
}

#[derive(Default)]
struct Polls {
    subtitle: Option<PollHandle>,
    progress: Option<PollHandle>,
}

struct SyncInner {
    backend: Arc<dyn MediaBackend>,
    config: SyncConfig,
    state: Mutex<PlaybackSession>,
    cues: Mutex<CueTrack>,
    polls: Mutex<Polls>,
    services: SessionServices,
    token: CancellationToken,
    pump: Mutex<Option<JoinHandle<()>>>,
    tracks_checked: AtomicBool,
    failing_polls: Mutex<HashSet<&'static str>>,
    closed: AtomicBool,
}

/// Keeps one playback session in sync with its media backend.
///
/// Cloning gives another handle to the same session.
#[derive(Clone)]
pub struct PlaybackSynchronizer {
    inner: Arc<SyncInner>,
}

impl fmt::Debug for PlaybackSynchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("PlaybackSynchronizer")
            .field("session_id", &state.session_id)
            .field("backend", &self.inner.backend)
            .field("is_playing", &state.is_playing)
            .field("closed", &self.inner.closed.load(Ordering::Acquire))
            .finish()
    }
}

impl PlaybackSynchronizer {
    /// Start a session for `source` on `backend`.
    ///
    /// Takes the backend's event stream; fails if it was already taken.
    pub fn start(
        backend: Arc<dyn MediaBackend>,
        source: VideoSource,
        config: SyncConfig,
        services: SessionServices,
    ) -> PlayerResult<Self> {
        let stream = backend.take_events().ok_or(MediaError::EventStreamTaken)?;
        let kind = backend.kind();
        let session = PlaybackSession::new(source.clone(), kind);
        let session_id = session.session_id;

        let inner = Arc::new(SyncInner {
            cues: Mutex::new(CueTrack::with_policy(Vec::new(), config.overlap_policy)),
            backend,
            config,
            state: Mutex::new(session),
            polls: Mutex::new(Polls::default()),
            services,
            token: CancellationToken::new(),
            pump: Mutex::new(None),
            tracks_checked: AtomicBool::new(false),
            failing_polls: Mutex::new(HashSet::new()),
            closed: AtomicBool::new(false),
        });

        let pump = spawn_event_pump(&inner, stream);
        *inner.pump.lock() = Some(pump);

        info!("🎬 Session {} started for {} ({:?})", session_id, source, kind);
        inner.publish(Event::SessionLoaded {
            session_id,
            source,
            backend: kind,
        });

        Ok(Self { inner })
    }

    /// Session id
    pub fn session_id(&self) -> Uuid {
        self.inner.state.lock().session_id
    }

    /// Kind of backend driving the session
    pub fn backend_kind(&self) -> BackendKind {
        self.inner.backend.kind()
    }

    /// Copy of the current session state
    pub fn snapshot(&self) -> PlaybackSession {
        self.inner.state.lock().clone()
    }

    /// Text of the active cue, empty when none
    pub fn active_cue(&self) -> String {
        self.inner.state.lock().active_cue.clone()
    }

    /// Whether the session ended on an embed rejection
    pub fn is_terminated(&self) -> bool {
        self.inner.state.lock().is_terminated()
    }

    /// Whether [`Self::shutdown`] ran
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Play when paused, pause when playing.
    ///
    /// The playing flag only moves when the backend confirms; a failed call
    /// leaves it untouched and is reported once.
    pub async fn toggle_play(&self) -> PlayerResult<()> {
        let is_playing = self.inner.state.lock().is_playing;
        if is_playing {
            self.pause().await
        } else {
            self.play().await
        }
    }

    /// Start playback
    pub async fn play(&self) -> PlayerResult<()> {
        self.inner.ensure_active()?;
        self.inner
            .backend
            .play()
            .await
            .map_err(|e| self.inner.fail("play", e))
    }

    /// Pause playback
    pub async fn pause(&self) -> PlayerResult<()> {
        self.inner.ensure_active()?;
        self.inner
            .backend
            .pause()
            .await
            .map_err(|e| self.inner.fail("pause", e))
    }

    /// Seek relative to the current position; returns the requested time.
    ///
    /// The target is clamped to `[0, duration]`, or to `>= 0` while the
    /// duration is unknown.
    pub async fn seek_by(&self, delta_seconds: f64) -> PlayerResult<f64> {
        self.inner.ensure_active()?;
        if !delta_seconds.is_finite() {
            return Err(PlayerError::InvalidArgument {
                name: "delta_seconds".to_string(),
                reason: format!("{} is not a finite number", delta_seconds),
            });
        }

        let current = self
            .inner
            .backend
            .current_time()
            .await
            .map_err(|e| self.inner.fail("current_time", e))?;
        let mut target = (current + delta_seconds).max(0.0);
        if let Some(duration) = self.inner.known_duration().await {
            target = target.min(duration);
        }
        self.inner.seek(target).await
    }

    /// Skip forward by the configured step
    pub async fn skip_forward(&self) -> PlayerResult<f64> {
        self.seek_by(self.inner.config.seek_step_seconds).await
    }

    /// Skip back by the configured step
    pub async fn skip_backward(&self) -> PlayerResult<f64> {
        self.seek_by(-self.inner.config.seek_step_seconds).await
    }

    /// Seek to `fraction` of the duration; returns the requested time.
    ///
    /// `fraction` is clamped to `[0, 1]`. While the duration is unknown the
    /// target is 0.
    pub async fn seek_to_fraction(&self, fraction: f64) -> PlayerResult<f64> {
        self.inner.ensure_active()?;
        if fraction.is_nan() {
            return Err(PlayerError::InvalidArgument {
                name: "fraction".to_string(),
                reason: "NaN is not a position".to_string(),
            });
        }
        let fraction = fraction.clamp(0.0, 1.0);

        let duration = self
            .inner
            .backend
            .duration()
            .await
            .map_err(|e| self.inner.fail("duration", e))?;
        let target = if duration.is_finite() && duration > 0.0 {
            fraction * duration
        } else {
            0.0
        };
        self.inner.seek(target).await
    }

    /// Advance to the next playback rate, wrapping after 2x.
    ///
    /// The selected rate advances even when the backend refuses it; the
    /// refusal is reported as a recoverable error.
    pub async fn cycle_playback_rate(&self) -> PlayerResult<PlaybackRate> {
        self.inner.ensure_active()?;
        let rate = {
            let mut state = self.inner.state.lock();
            state.playback_rate = state.playback_rate.next();
            state.playback_rate
        };
        self.inner.publish(Event::PlaybackRateChanged { rate });

        if let Err(e) = self.inner.backend.set_playback_rate(rate).await {
            self.inner
                .report("set_playback_rate", &PlayerError::from(e));
        }
        Ok(rate)
    }

    /// Enter or leave fullscreen through the fullscreen host
    pub fn toggle_fullscreen(&self) -> PlayerResult<bool> {
        let host = self.inner.services.fullscreen.as_ref().ok_or_else(|| {
            PlayerError::UnsupportedOperation {
                operation: "toggle_fullscreen".to_string(),
            }
        })?;

        let entering = !self.inner.state.lock().is_fullscreen;
        let result = if entering {
            host.request_fullscreen()
        } else {
            host.exit_fullscreen()
        };
        if let Err(e) = result {
            self.inner.report("toggle_fullscreen", &e);
            return Err(e);
        }

        self.inner.set_fullscreen(entering);
        Ok(entering)
    }

    /// Record the fullscreen state the host actually ended up in
    pub fn notify_fullscreen_change(&self, is_fullscreen: bool) {
        self.inner.set_fullscreen(is_fullscreen);
    }

    /// Show or hide subtitles; returns the new visibility
    pub fn toggle_subtitle_visibility(&self) -> bool {
        let visible = {
            let mut state = self.inner.state.lock();
            state.subtitles_visible = !state.subtitles_visible;
            state.subtitles_visible
        };
        self.inner
            .publish(Event::SubtitleVisibilityChanged { visible });
        visible
    }

    /// Replace the cue list; restarts the subtitle poll. Returns the number
    /// of usable cues.
    pub fn set_cues(&self, cues: Vec<SubtitleCue>) -> usize {
        self.inner.set_cues(cues)
    }

    /// Fetch cues from `source` and install them.
    ///
    /// A fetch that completes after the session was shut down is dropped.
    pub async fn load_subtitles(
        &self,
        source: &dyn SubtitleSource,
        video_id: &str,
        language: &str,
    ) -> PlayerResult<usize> {
        self.inner.ensure_active()?;
        let token = self.inner.token.clone();

        let cues = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            cues = source.fetch(video_id, language) => Some(cues),
        };

        match cues {
            Some(cues) if !token.is_cancelled() => Ok(self.inner.set_cues(cues)),
            _ => {
                debug!("Dropping subtitles for {} fetched after session end", video_id);
                Err(PlayerError::SessionTerminated {
                    reason: "session was replaced before subtitles arrived".to_string(),
                })
            }
        }
    }

    /// Stop timers, detach listeners and release the backend
    pub async fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.inner.token.cancel();
        self.inner.stop_polls();
        self.inner.backend.detach_text_track();
        self.inner.backend.teardown().await;

        let pump = self.inner.pump.lock().take();
        if let Some(pump) = pump {
            if let Err(e) = pump.await {
                warn!("Backend event pump ended abnormally: {}", e);
            }
        }

        let session_id = self.session_id();
        info!("🧹 Session {} ended", session_id);
        self.inner.services.events.publish(Event::SessionEnded { session_id });
    }
}

fn spawn_event_pump(inner: &Arc<SyncInner>, mut stream: BackendEventStream) -> JoinHandle<()> {
    let weak = Arc::downgrade(inner);
    let token = inner.token.clone();

    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                event = stream.next() => event,
            };
            let Some(event) = event else {
                break;
            };
            let Some(inner) = weak.upgrade() else {
                break;
            };
            inner.handle_backend_event(event).await;
        }
        debug!("Backend event pump stopped");
    })
}

impl SyncInner {
    fn publish(&self, event: Event) {
        self.services.events.publish(event);
    }

    fn ensure_active(&self) -> PlayerResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(PlayerError::SessionTerminated {
                reason: "session was shut down".to_string(),
            });
        }
        match &self.state.lock().terminal_error {
            Some(reason) => Err(PlayerError::SessionTerminated {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn is_terminated(&self) -> bool {
        self.token.is_cancelled() || self.state.lock().is_terminated()
    }

    /// Report a non-fatal failure
    fn report(&self, operation: &str, error: &PlayerError) {
        if self.token.is_cancelled() {
            debug!("Ignoring {} failure after session end: {}", operation, error);
            return;
        }
        warn!("⚠️ {} failed: {}", operation, error);
        self.publish(Event::PlaybackError {
            operation: operation.to_string(),
            error: error.to_string(),
            recoverable: error.is_recoverable(),
        });
    }

    fn fail(&self, operation: &str, error: MediaError) -> PlayerError {
        let error = PlayerError::from(error);
        self.report(operation, &error);
        error
    }

    /// Report a poll failure once until that same poll succeeds again
    fn note_poll_result(&self, operation: &'static str, result: PlayerResult<()>) {
        match result {
            Ok(()) => {
                self.failing_polls.lock().remove(operation);
            }
            Err(e) => {
                let first = self.failing_polls.lock().insert(operation);
                if first {
                    self.report(operation, &e);
                } else {
                    debug!("{} still failing: {}", operation, e);
                }
            }
        }
    }

    async fn known_duration(&self) -> Option<f64> {
        match self.backend.duration().await {
            Ok(d) if d.is_finite() && d > 0.0 => Some(d),
            _ => self.state.lock().duration_seconds,
        }
    }

    async fn seek(&self, target: f64) -> PlayerResult<f64> {
        self.backend
            .seek_to(target, true)
            .await
            .map_err(|e| self.fail("seek", e))?;

        let event = {
            let mut state = self.state.lock();
            state.record_time(target, f64::NAN);
            Self::time_event(&state)
        };
        self.publish(event);

        let text = {
            let cues = self.cues.lock();
            (!cues.is_empty()).then(|| cues.active_text(target).to_string())
        };
        if let Some(text) = text {
            self.set_active_cue(text);
        }
        debug!("⏩ Seeked to {:.1}s", target);
        Ok(target)
    }

    fn time_event(state: &PlaybackSession) -> Event {
        Event::TimeUpdated {
            current_time: state.current_time_seconds,
            duration: state.duration_seconds,
            progress_percent: state.progress_percent,
        }
    }

    fn set_active_cue(&self, text: String) {
        {
            let mut state = self.state.lock();
            if state.active_cue == text {
                return;
            }
            state.active_cue = text.clone();
        }
        self.publish(Event::SubtitleChanged { text });
    }

    fn set_playing(&self, is_playing: bool) {
        {
            let mut state = self.state.lock();
            if state.is_playing == is_playing {
                return;
            }
            state.is_playing = is_playing;
        }
        if is_playing {
            debug!("▶️ Playback started");
        } else {
            debug!("⏸️ Playback paused");
        }
        self.publish(Event::PlaybackStateChanged { is_playing });
    }

    fn set_fullscreen(&self, is_fullscreen: bool) {
        {
            let mut state = self.state.lock();
            if state.is_fullscreen == is_fullscreen {
                return;
            }
            state.is_fullscreen = is_fullscreen;
        }
        self.publish(Event::FullscreenChanged { is_fullscreen });
    }

    fn stop_polls(&self) {
        let polls = std::mem::take(&mut *self.polls.lock());
        drop(polls);
    }

    fn set_cues(self: &Arc<Self>, cues: Vec<SubtitleCue>) -> usize {
        let track = CueTrack::with_policy(cues, self.config.overlap_policy);
        let count = track.len();
        *self.cues.lock() = track;
        self.state.lock().cue_count = count;

        // the old poll must be gone before a new one starts
        self.polls.lock().subtitle = None;
        if count > 0 && !self.is_terminated() && !self.closed.load(Ordering::Acquire) {
            self.start_subtitle_poll();
        } else {
            self.set_active_cue(String::new());
        }

        info!("📝 {} subtitle cues loaded", count);
        self.publish(Event::SubtitlesLoaded { count });
        count
    }

    fn start_subtitle_poll(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let handle = self.services.scheduler.spawn(
            SUBTITLE_POLL,
            self.config.subtitle_poll_interval,
            move || poll_tick(weak.clone(), |inner| async move {
                let result = inner.refresh_subtitle().await;
                inner.note_poll_result("subtitle_poll", result);
            }),
        );
        self.polls.lock().subtitle = Some(handle);
    }

    fn start_progress_poll(self: &Arc<Self>) {
        if self.is_terminated() {
            return;
        }
        let weak = Arc::downgrade(self);
        let handle = self.services.scheduler.spawn(
            PROGRESS_POLL,
            self.config.progress_poll_interval,
            move || poll_tick(weak.clone(), |inner| async move {
                let result = inner.refresh_progress().await;
                inner.note_poll_result("progress_poll", result);
            }),
        );
        self.polls.lock().progress = Some(handle);
    }

    async fn refresh_subtitle(&self) -> PlayerResult<()> {
        let current = self.backend.current_time().await?;
        let text = self.cues.lock().active_text(current).to_string();
        self.set_active_cue(text);
        Ok(())
    }

    async fn refresh_progress(&self) -> PlayerResult<()> {
        let current = self.backend.current_time().await?;
        let duration = self.backend.duration().await?;
        let event = {
            let mut state = self.state.lock();
            state.record_time(current, duration);
            Self::time_event(&state)
        };
        self.publish(event);
        Ok(())
    }

    async fn handle_backend_event(self: &Arc<Self>, event: BackendEvent) {
        if self.token.is_cancelled() {
            return;
        }
        let terminated = self.state.lock().is_terminated();
        if terminated {
            debug!("Ignoring {} after terminal error", event.event_type());
            return;
        }

        match event {
            BackendEvent::TimeUpdate => {
                let result = self.refresh_progress().await;
                self.note_poll_result("time_update", result);
            }
            BackendEvent::MetadataLoaded => self.on_metadata_loaded().await,
            BackendEvent::Play => self.set_playing(true),
            BackendEvent::Pause => self.set_playing(false),
            BackendEvent::CueChange { texts } => {
                self.set_active_cue(texts.into_iter().next().unwrap_or_default())
            }
            BackendEvent::Ready => self.on_ready().await,
            BackendEvent::StateChange { state } => match state {
                EmbedPlayerState::Playing => self.set_playing(true),
                EmbedPlayerState::Paused | EmbedPlayerState::Ended => self.set_playing(false),
                other => debug!("Embed player state {:?}", other),
            },
            BackendEvent::Error { code } => self.on_embed_error(code),
        }
    }

    async fn on_metadata_loaded(self: &Arc<Self>) {
        let duration = match self.backend.duration().await {
            Ok(duration) => duration,
            Err(e) => {
                self.report("duration", &PlayerError::from(e));
                f64::NAN
            }
        };
        let duration = {
            let mut state = self.state.lock();
            state.record_duration(duration);
            state.is_loaded = true;
            state.duration_seconds
        };
        info!("🎞️ Metadata loaded, duration {:?}", duration);
        self.publish(Event::MetadataLoaded { duration });

        if !self.tracks_checked.swap(true, Ordering::AcqRel) {
            self.schedule_track_detection();
        }
    }

    fn schedule_track_detection(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let token = self.token.clone();
        let delay = self.config.track_detect_delay;

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            if let Some(inner) = weak.upgrade() {
                inner.detect_text_tracks();
            }
        });
    }

    fn detect_text_tracks(&self) {
        if self.is_terminated() {
            return;
        }

        let tracks = self.backend.text_tracks();
        let Some(first) = tracks.first() else {
            info!("💬 No embedded subtitles found");
            self.publish(Event::NoSubtitleTrack);
            return;
        };

        match self.backend.attach_text_track(first.index) {
            Ok(track) => {
                self.state.lock().has_text_track = true;
                self.publish(Event::TextTrackAttached {
                    label: track.label,
                    language: track.language,
                });
            }
            Err(e) => {
                self.report("attach_text_track", &PlayerError::from(e));
                self.publish(Event::NoSubtitleTrack);
            }
        }
    }

    async fn on_ready(self: &Arc<Self>) {
        let duration = match self.backend.duration().await {
            Ok(duration) => duration,
            Err(e) => {
                debug!("Duration unavailable at readiness: {}", e);
                f64::NAN
            }
        };
        let duration = {
            let mut state = self.state.lock();
            state.record_duration(duration);
            state.is_loaded = true;
            state.duration_seconds
        };
        info!("📺 Embed player ready");
        self.publish(Event::PlayerReady { duration });

        self.start_progress_poll();
        if self.config.autoplay {
            if let Err(e) = self.backend.play().await {
                self.report("autoplay", &PlayerError::from(e));
            }
        }
    }

    fn on_embed_error(&self, code: EmbedErrorCode) {
        let message = code.message().to_string();
        {
            let mut state = self.state.lock();
            if state.terminal_error.is_some() {
                debug!("Embed error {} after terminal error ignored", code.code());
                return;
            }
            state.terminal_error = Some(message.clone());
            state.is_playing = false;
        }

        self.stop_polls();
        warn!("⛔ Embed player rejected the video: {}", code);
        self.publish(Event::TerminalError {
            code: code.code(),
            message,
        });
    }
}

impl Drop for SyncInner {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// One poll tick against a session that may already be gone
async fn poll_tick<F, Fut>(weak: Weak<SyncInner>, tick: F) -> ControlFlow<()>
where
    F: FnOnce(Arc<SyncInner>) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    match weak.upgrade() {
        Some(inner) => {
            tick(inner).await;
            ControlFlow::Continue(())
        }
        None => ControlFlow::Break(()),
    }
}
