//! Native media element backend
//!
//! Wraps a host media element (an HTML video element in a browser binding).
//! The element pushes time, metadata and play/pause notifications through a
//! [`NativeEventSink`] handed to the host when the element is created.

use crate::backend::{BackendEvent, BackendEventStream, BackendKind, MediaBackend};
use crate::error::{MediaError, MediaResult};
use crate::tracks::{TextTrack, TextTrackMode};
use async_trait::async_trait;
use flixfluent_core::PlaybackRate;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Host media element
pub trait MediaElement: Send + Sync {
    /// Point the element at a media URL
    fn set_source(&self, url: &str) -> MediaResult<()>;
    /// Current position in seconds
    fn current_time(&self) -> f64;
    /// Move the playback position
    fn set_current_time(&self, seconds: f64) -> MediaResult<()>;
    /// Duration in seconds, NaN before metadata is loaded
    fn duration(&self) -> f64;
    /// Start playback; an error means the element rejected the request
    fn play(&self) -> MediaResult<()>;
    /// Pause playback
    fn pause(&self) -> MediaResult<()>;
    /// Change the playback speed
    fn set_playback_rate(&self, rate: f64) -> MediaResult<()>;
    /// Text tracks currently attached to the element
    fn text_tracks(&self) -> Vec<TextTrack>;
    /// Change how a text track is treated
    fn set_text_track_mode(&self, index: usize, mode: TextTrackMode) -> MediaResult<()>;
}

/// Creates media elements for direct video URLs
pub trait NativeHost: Send + Sync {
    /// Create an element for `url` whose listeners report through `sink`
    fn create_element(&self, url: &str, sink: NativeEventSink) -> MediaResult<Box<dyn MediaElement>>;
}

/// Listener side of a native backend, held by the host binding
#[derive(Debug, Clone)]
pub struct NativeEventSink {
    tx: mpsc::UnboundedSender<BackendEvent>,
    attached_track: Arc<Mutex<Option<usize>>>,
}

impl NativeEventSink {
    /// Playback position advanced
    pub fn time_update(&self) {
        self.send(BackendEvent::TimeUpdate);
    }

    /// Metadata finished loading
    pub fn loaded_metadata(&self) {
        self.send(BackendEvent::MetadataLoaded);
    }

    /// Playback started
    pub fn played(&self) {
        self.send(BackendEvent::Play);
    }

    /// Playback paused
    pub fn paused(&self) {
        self.send(BackendEvent::Pause);
    }

    /// Active cues of the track at `track_index` changed.
    ///
    /// Dropped unless that track is the attached one.
    pub fn cue_change(&self, track_index: usize, active_texts: Vec<String>) {
        if *self.attached_track.lock() != Some(track_index) {
            debug!("Ignoring cue change from unattached track {}", track_index);
            return;
        }
        self.send(BackendEvent::CueChange {
            texts: active_texts,
        });
    }

    /// Whether the backend side is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, event: BackendEvent) {
        if self.tx.send(event).is_err() {
            debug!("Native backend dropped; notification discarded");
        }
    }
}

/// Backend over a native media element
pub struct NativeBackend {
    element: Box<dyn MediaElement>,
    source_url: String,
    events: Mutex<Option<BackendEventStream>>,
    attached_track: Arc<Mutex<Option<usize>>>,
}

impl NativeBackend {
    /// Create an element for `url` through `host` and load the source
    pub fn open(host: &dyn NativeHost, url: &str) -> MediaResult<Self> {
        let (tx, events) = BackendEventStream::channel();
        let attached_track = Arc::new(Mutex::new(None));
        let sink = NativeEventSink {
            tx,
            attached_track: Arc::clone(&attached_track),
        };

        let element = host.create_element(url, sink)?;
        element.set_source(url)?;
        info!("🎞️ Native media element loading {}", url);

        Ok(Self {
            element,
            source_url: url.to_string(),
            events: Mutex::new(Some(events)),
            attached_track,
        })
    }

    /// URL the element is playing
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Index of the attached text track, if any
    pub fn attached_track(&self) -> Option<usize> {
        *self.attached_track.lock()
    }
}

impl fmt::Debug for NativeBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeBackend")
            .field("source_url", &self.source_url)
            .field("attached_track", &self.attached_track())
            .finish()
    }
}

#[async_trait]
impl MediaBackend for NativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    fn take_events(&self) -> Option<BackendEventStream> {
        self.events.lock().take()
    }

    async fn current_time(&self) -> MediaResult<f64> {
        Ok(self.element.current_time())
    }

    async fn duration(&self) -> MediaResult<f64> {
        Ok(self.element.duration())
    }

    async fn play(&self) -> MediaResult<()> {
        self.element.play()
    }

    async fn pause(&self) -> MediaResult<()> {
        self.element.pause()
    }

    async fn seek_to(&self, seconds: f64, _allow_seek_ahead: bool) -> MediaResult<()> {
        if !seconds.is_finite() {
            return Err(MediaError::InvalidTime { value: seconds });
        }
        self.element.set_current_time(seconds.max(0.0))
    }

    async fn set_playback_rate(&self, rate: PlaybackRate) -> MediaResult<()> {
        self.element.set_playback_rate(rate.as_f64())
    }

    fn text_tracks(&self) -> Vec<TextTrack> {
        self.element.text_tracks()
    }

    fn attach_text_track(&self, index: usize) -> MediaResult<TextTrack> {
        let track = self
            .element
            .text_tracks()
            .into_iter()
            .find(|t| t.index == index)
            .ok_or(MediaError::TextTrackNotFound { index })?;

        // Hidden keeps cue events flowing without the element drawing cues
        self.element.set_text_track_mode(index, TextTrackMode::Hidden)?;
        *self.attached_track.lock() = Some(index);
        info!("💬 Attached text track {} ({})", index, track.label);
        Ok(track)
    }

    fn detach_text_track(&self) {
        let Some(index) = self.attached_track.lock().take() else {
            return;
        };
        if let Err(e) = self.element.set_text_track_mode(index, TextTrackMode::Disabled) {
            warn!("Failed to disable text track {}: {}", index, e);
        }
        debug!("Detached text track {}", index);
    }

    async fn teardown(&self) {
        self.detach_text_track();
        if let Some(mut events) = self.events.lock().take() {
            events.close();
        }
        debug!("Native backend for {} torn down", self.source_url);
    }
}
