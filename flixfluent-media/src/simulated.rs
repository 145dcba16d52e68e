//! In-process hosts for headless playback
//!
//! [`SimulatedNativeHost`] and [`SimulatedEmbedHost`] stand in for a browser
//! binding. They keep a virtual playhead that only moves when the caller
//! advances it, fire the same notifications a real element or widget would,
//! and can be told to fail individual operations.

use crate::embedded::{ContainerHandle, EmbedCallbacks, EmbedHost, EmbedOptions, EmbedPlayer};
use crate::error::{MediaError, MediaResult};
use crate::native::{MediaElement, NativeEventSink, NativeHost};
use crate::tracks::{TextTrack, TextTrackMode};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Operation a simulated host can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulatedOp {
    /// Start playback
    Play,
    /// Pause playback
    Pause,
    /// Seek
    Seek,
    /// Change rate
    SetRate,
    /// Read the position
    CurrentTime,
    /// Read the duration
    Duration,
}

impl SimulatedOp {
    fn name(self) -> &'static str {
        match self {
            SimulatedOp::Play => "play",
            SimulatedOp::Pause => "pause",
            SimulatedOp::Seek => "seek",
            SimulatedOp::SetRate => "set_playback_rate",
            SimulatedOp::CurrentTime => "current_time",
            SimulatedOp::Duration => "duration",
        }
    }

    fn failure(self) -> MediaError {
        match self {
            SimulatedOp::Play => MediaError::PlaybackRejected {
                reason: "simulated rejection".to_string(),
            },
            other => MediaError::BackendUnavailable {
                operation: other.name().to_string(),
                reason: "simulated failure".to_string(),
            },
        }
    }
}

#[derive(Debug)]
struct ElementState {
    source: Option<String>,
    position: f64,
    duration: f64,
    rate: f64,
    playing: bool,
    tracks: Vec<(TextTrack, TextTrackMode)>,
    failures: HashSet<SimulatedOp>,
}

/// Media element with a virtual playhead
#[derive(Debug, Clone)]
pub struct SimulatedMediaElement {
    state: Arc<Mutex<ElementState>>,
    sink: NativeEventSink,
}

impl SimulatedMediaElement {
    fn new(sink: NativeEventSink) -> Self {
        Self {
            state: Arc::new(Mutex::new(ElementState {
                source: None,
                position: 0.0,
                duration: f64::NAN,
                rate: 1.0,
                playing: false,
                tracks: Vec::new(),
                failures: HashSet::new(),
            })),
            sink,
        }
    }

    /// Finish loading metadata with the given duration
    pub fn load_metadata(&self, duration: f64) {
        self.state.lock().duration = duration;
        self.sink.loaded_metadata();
    }

    /// Move the playhead by `seconds` of wall time if playing
    pub fn advance(&self, seconds: f64) {
        {
            let mut state = self.state.lock();
            if !state.playing {
                return;
            }
            let mut position = state.position + seconds * state.rate;
            if state.duration.is_finite() {
                position = position.min(state.duration);
            }
            state.position = position;
        }
        self.sink.time_update();
    }

    /// Add a text track to the element
    pub fn add_text_track(&self, track: TextTrack) {
        self.state.lock().tracks.push((track, TextTrackMode::Disabled));
    }

    /// Fire a cue change on the track at `index`
    pub fn emit_cue_change(&self, index: usize, texts: &[&str]) {
        let texts = texts.iter().map(|t| t.to_string()).collect();
        self.sink.cue_change(index, texts);
    }

    /// Mode of the track at `index`
    pub fn text_track_mode(&self, index: usize) -> Option<TextTrackMode> {
        self.state
            .lock()
            .tracks
            .iter()
            .find(|(track, _)| track.index == index)
            .map(|(_, mode)| *mode)
    }

    /// Make `op` fail until [`Self::recover`] is called
    pub fn fail(&self, op: SimulatedOp) {
        self.state.lock().failures.insert(op);
    }

    /// Let `op` succeed again
    pub fn recover(&self, op: SimulatedOp) {
        self.state.lock().failures.remove(&op);
    }

    /// Whether the element is playing
    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    /// Current playback rate
    pub fn rate(&self) -> f64 {
        self.state.lock().rate
    }

    /// Loaded source URL
    pub fn source(&self) -> Option<String> {
        self.state.lock().source.clone()
    }

    fn check(&self, op: SimulatedOp) -> MediaResult<()> {
        if self.state.lock().failures.contains(&op) {
            return Err(op.failure());
        }
        Ok(())
    }
}

impl MediaElement for SimulatedMediaElement {
    fn set_source(&self, url: &str) -> MediaResult<()> {
        let mut state = self.state.lock();
        state.source = Some(url.to_string());
        state.position = 0.0;
        state.duration = f64::NAN;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.state.lock().position
    }

    fn set_current_time(&self, seconds: f64) -> MediaResult<()> {
        self.check(SimulatedOp::Seek)?;
        self.state.lock().position = seconds;
        self.sink.time_update();
        Ok(())
    }

    fn duration(&self) -> f64 {
        self.state.lock().duration
    }

    fn play(&self) -> MediaResult<()> {
        self.check(SimulatedOp::Play)?;
        self.state.lock().playing = true;
        self.sink.played();
        Ok(())
    }

    fn pause(&self) -> MediaResult<()> {
        self.check(SimulatedOp::Pause)?;
        self.state.lock().playing = false;
        self.sink.paused();
        Ok(())
    }

    fn set_playback_rate(&self, rate: f64) -> MediaResult<()> {
        self.check(SimulatedOp::SetRate)?;
        self.state.lock().rate = rate;
        Ok(())
    }

    fn text_tracks(&self) -> Vec<TextTrack> {
        self.state
            .lock()
            .tracks
            .iter()
            .map(|(track, _)| track.clone())
            .collect()
    }

    fn set_text_track_mode(&self, index: usize, mode: TextTrackMode) -> MediaResult<()> {
        let mut state = self.state.lock();
        let entry = state
            .tracks
            .iter_mut()
            .find(|(track, _)| track.index == index)
            .ok_or(MediaError::TextTrackNotFound { index })?;
        entry.1 = mode;
        Ok(())
    }
}

/// Native host handing out [`SimulatedMediaElement`]s
#[derive(Debug, Default)]
pub struct SimulatedNativeHost {
    elements: Mutex<Vec<SimulatedMediaElement>>,
}

impl SimulatedNativeHost {
    /// Create a host
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently created element
    pub fn last_element(&self) -> Option<SimulatedMediaElement> {
        self.elements.lock().last().cloned()
    }

    /// Number of elements created so far
    pub fn created(&self) -> usize {
        self.elements.lock().len()
    }
}

impl NativeHost for SimulatedNativeHost {
    fn create_element(
        &self,
        url: &str,
        sink: NativeEventSink,
    ) -> MediaResult<Box<dyn MediaElement>> {
        debug!("Simulated element created for {}", url);
        let element = SimulatedMediaElement::new(sink);
        self.elements.lock().push(element.clone());
        Ok(Box::new(element))
    }
}

#[derive(Debug)]
struct WidgetState {
    video_id: String,
    position: f64,
    duration: f64,
    rate: f64,
    playing: bool,
    destroyed: bool,
    failures: HashSet<SimulatedOp>,
}

/// Embed widget with a virtual playhead
#[derive(Debug, Clone)]
pub struct SimulatedEmbedPlayer {
    state: Arc<Mutex<WidgetState>>,
    callbacks: EmbedCallbacks,
}

impl SimulatedEmbedPlayer {
    fn new(video_id: &str, duration: f64, callbacks: EmbedCallbacks) -> Self {
        Self {
            state: Arc::new(Mutex::new(WidgetState {
                video_id: video_id.to_string(),
                position: 0.0,
                duration,
                rate: 1.0,
                playing: false,
                destroyed: false,
                failures: HashSet::new(),
            })),
            callbacks,
        }
    }

    /// Move the playhead by `seconds` of wall time if playing
    pub fn advance(&self, seconds: f64) {
        let ended = {
            let mut state = self.state.lock();
            if !state.playing {
                return;
            }
            state.position += seconds * state.rate;
            if state.duration > 0.0 && state.position >= state.duration {
                state.position = state.duration;
                state.playing = false;
                true
            } else {
                false
            }
        };
        if ended {
            self.callbacks.on_state_change(0);
        }
    }

    /// Fire the readiness callback
    pub fn fire_ready(&self) {
        self.callbacks.on_ready();
    }

    /// Fire the error callback with a raw widget code
    pub fn fire_error(&self, code: i32) {
        self.callbacks.on_error(code);
    }

    /// Fire a raw state change
    pub fn fire_state_change(&self, code: i32) {
        self.callbacks.on_state_change(code);
    }

    /// Set the duration reported once known
    pub fn set_duration(&self, duration: f64) {
        self.state.lock().duration = duration;
    }

    /// Make `op` fail until [`Self::recover`] is called
    pub fn fail(&self, op: SimulatedOp) {
        self.state.lock().failures.insert(op);
    }

    /// Let `op` succeed again
    pub fn recover(&self, op: SimulatedOp) {
        self.state.lock().failures.remove(&op);
    }

    /// Video id the widget was created for
    pub fn video_id(&self) -> String {
        self.state.lock().video_id.clone()
    }

    /// Whether the widget is playing
    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    /// Current playback rate
    pub fn rate(&self) -> f64 {
        self.state.lock().rate
    }

    /// Whether the widget was destroyed
    pub fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    fn check(&self, op: SimulatedOp) -> MediaResult<()> {
        let state = self.state.lock();
        if state.destroyed {
            return Err(MediaError::BackendUnavailable {
                operation: op.name().to_string(),
                reason: "player destroyed".to_string(),
            });
        }
        if state.failures.contains(&op) {
            return Err(op.failure());
        }
        Ok(())
    }
}

impl EmbedPlayer for SimulatedEmbedPlayer {
    fn get_current_time(&self) -> MediaResult<f64> {
        self.check(SimulatedOp::CurrentTime)?;
        Ok(self.state.lock().position)
    }

    fn get_duration(&self) -> MediaResult<f64> {
        self.check(SimulatedOp::Duration)?;
        Ok(self.state.lock().duration)
    }

    fn play_video(&self) -> MediaResult<()> {
        self.check(SimulatedOp::Play)?;
        self.state.lock().playing = true;
        self.callbacks.on_state_change(1);
        Ok(())
    }

    fn pause_video(&self) -> MediaResult<()> {
        self.check(SimulatedOp::Pause)?;
        self.state.lock().playing = false;
        self.callbacks.on_state_change(2);
        Ok(())
    }

    fn seek_to(&self, seconds: f64, _allow_seek_ahead: bool) -> MediaResult<()> {
        self.check(SimulatedOp::Seek)?;
        self.state.lock().position = seconds;
        Ok(())
    }

    fn set_playback_rate(&self, rate: f64) -> MediaResult<()> {
        self.check(SimulatedOp::SetRate)?;
        self.state.lock().rate = rate;
        Ok(())
    }

    fn load_video_by_id(&self, video_id: &str) -> MediaResult<()> {
        self.check(SimulatedOp::Seek)?;
        let mut state = self.state.lock();
        state.video_id = video_id.to_string();
        state.position = 0.0;
        state.playing = false;
        Ok(())
    }

    fn destroy(&self) {
        let mut state = self.state.lock();
        state.destroyed = true;
        state.playing = false;
    }
}

/// Embed host handing out [`SimulatedEmbedPlayer`]s
#[derive(Debug)]
pub struct SimulatedEmbedHost {
    auto_ready: bool,
    duration: f64,
    reject_code: Option<i32>,
    players: Mutex<Vec<SimulatedEmbedPlayer>>,
}

impl Default for SimulatedEmbedHost {
    fn default() -> Self {
        Self {
            auto_ready: true,
            duration: 0.0,
            reject_code: None,
            players: Mutex::new(Vec::new()),
        }
    }
}

impl SimulatedEmbedHost {
    /// Host whose widgets become ready immediately with unknown duration
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether new widgets fire readiness on creation
    pub fn with_auto_ready(mut self, auto_ready: bool) -> Self {
        self.auto_ready = auto_ready;
        self
    }

    /// Duration new widgets report
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Make every new widget report `code` through its error callback
    pub fn rejecting(mut self, code: i32) -> Self {
        self.reject_code = Some(code);
        self
    }

    /// Most recently created widget
    pub fn last_player(&self) -> Option<SimulatedEmbedPlayer> {
        self.players.lock().last().cloned()
    }

    /// Every widget created so far
    pub fn players(&self) -> Vec<SimulatedEmbedPlayer> {
        self.players.lock().clone()
    }
}

impl EmbedHost for SimulatedEmbedHost {
    fn create_player(
        &self,
        container: &ContainerHandle,
        video_id: &str,
        _options: &EmbedOptions,
        callbacks: EmbedCallbacks,
    ) -> MediaResult<Box<dyn EmbedPlayer>> {
        debug!(
            "Simulated embed player created for {} in #{}",
            video_id,
            container.id()
        );
        let player = SimulatedEmbedPlayer::new(video_id, self.duration, callbacks);
        match self.reject_code {
            Some(code) => player.fire_error(code),
            None if self.auto_ready => player.fire_ready(),
            None => {}
        }
        self.players.lock().push(player.clone());
        Ok(Box::new(player))
    }
}
