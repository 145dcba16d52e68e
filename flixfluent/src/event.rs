//! Event system for playback sessions
//!
//! Every state change a UI would render from is published as an [`Event`].
//! Subscribers get their own [`EventStream`]; a dropped stream is pruned on
//! the next publish.

use flixfluent_core::{PlaybackRate, VideoSource};
use flixfluent_media::BackendKind;
use futures::Stream;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::trace;
use uuid::Uuid;

/// Events emitted by the player and its sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A video was loaded into a new session
    SessionLoaded {
        /// New session id
        session_id: Uuid,
        /// Parsed video source
        source: VideoSource,
        /// Backend driving the session
        backend: BackendKind,
    },
    /// A session was torn down
    SessionEnded {
        /// Ended session id
        session_id: Uuid,
    },
    /// Embed widget finished initializing
    PlayerReady {
        /// Duration reported at readiness, if known
        duration: Option<f64>,
    },
    /// Media metadata is available
    MetadataLoaded {
        /// Duration in seconds, if known
        duration: Option<f64>,
    },
    /// Playback started or stopped
    PlaybackStateChanged {
        /// Whether the video is playing
        is_playing: bool,
    },
    /// Playback position advanced
    TimeUpdated {
        /// Position in seconds
        current_time: f64,
        /// Duration in seconds, if known
        duration: Option<f64>,
        /// Progress in percent, 0 while duration is unknown
        progress_percent: f64,
    },
    /// The displayed subtitle text changed
    SubtitleChanged {
        /// New text, empty when no cue is active
        text: String,
    },
    /// A cue list was installed
    SubtitlesLoaded {
        /// Number of cues
        count: usize,
    },
    /// A text track of the media was attached
    TextTrackAttached {
        /// Track label
        label: String,
        /// Track language, if declared
        language: Option<String>,
    },
    /// The media carries no text track
    NoSubtitleTrack,
    /// Playback rate changed
    PlaybackRateChanged {
        /// New rate
        rate: PlaybackRate,
    },
    /// Fullscreen state changed
    FullscreenChanged {
        /// Whether the player is fullscreen
        is_fullscreen: bool,
    },
    /// Subtitle display was shown or hidden
    SubtitleVisibilityChanged {
        /// Whether subtitles are displayed
        visible: bool,
    },
    /// A backend call failed; the session keeps running
    PlaybackError {
        /// Operation that failed
        operation: String,
        /// Error message
        error: String,
        /// Whether the session survives the error
        recoverable: bool,
    },
    /// The embed widget rejected the video; the session is over
    TerminalError {
        /// Widget error code
        code: i32,
        /// User-facing message
        message: String,
    },
}

impl Event {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::SessionLoaded { .. } => "session_loaded",
            Event::SessionEnded { .. } => "session_ended",
            Event::PlayerReady { .. } => "player_ready",
            Event::MetadataLoaded { .. } => "metadata_loaded",
            Event::PlaybackStateChanged { .. } => "playback_state_changed",
            Event::TimeUpdated { .. } => "time_updated",
            Event::SubtitleChanged { .. } => "subtitle_changed",
            Event::SubtitlesLoaded { .. } => "subtitles_loaded",
            Event::TextTrackAttached { .. } => "text_track_attached",
            Event::NoSubtitleTrack => "no_subtitle_track",
            Event::PlaybackRateChanged { .. } => "playback_rate_changed",
            Event::FullscreenChanged { .. } => "fullscreen_changed",
            Event::SubtitleVisibilityChanged { .. } => "subtitle_visibility_changed",
            Event::PlaybackError { .. } => "playback_error",
            Event::TerminalError { .. } => "terminal_error",
        }
    }

    /// Check if this is a session lifecycle event
    pub fn is_session_event(&self) -> bool {
        matches!(
            self,
            Event::SessionLoaded { .. }
                | Event::SessionEnded { .. }
                | Event::PlayerReady { .. }
                | Event::MetadataLoaded { .. }
        )
    }

    /// Check if this is a playback-related event
    pub fn is_playback_event(&self) -> bool {
        matches!(
            self,
            Event::PlaybackStateChanged { .. }
                | Event::TimeUpdated { .. }
                | Event::PlaybackRateChanged { .. }
                | Event::FullscreenChanged { .. }
        )
    }

    /// Check if this is a subtitle-related event
    pub fn is_subtitle_event(&self) -> bool {
        matches!(
            self,
            Event::SubtitleChanged { .. }
                | Event::SubtitlesLoaded { .. }
                | Event::TextTrackAttached { .. }
                | Event::NoSubtitleTrack
                | Event::SubtitleVisibilityChanged { .. }
        )
    }

    /// Check if this is an error event
    pub fn is_error_event(&self) -> bool {
        matches!(
            self,
            Event::PlaybackError { .. } | Event::TerminalError { .. }
        )
    }
}

/// Fan-out publisher shared by the player and its sessions
#[derive(Debug, Clone, Default)]
pub struct EventHub {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<Event>>>>,
}

impl EventHub {
    /// Create a hub with no subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new stream receiving every event published from now on
    pub fn subscribe(&self) -> EventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        EventStream::new(rx)
    }

    /// Publish `event` to every live subscriber
    pub fn publish(&self, event: Event) {
        trace!("📡 Publishing event: {}", event.event_type());
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }
}

/// Stream of player events for async iteration
#[derive(Debug)]
pub struct EventStream {
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl EventStream {
    /// Create a new event stream with a receiver
    pub fn new(receiver: mpsc::UnboundedReceiver<Event>) -> Self {
        Self { receiver }
    }

    /// Get the next event from the stream
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Try to get the next event without blocking
    pub fn try_next(&mut self) -> Result<Option<Event>, mpsc::error::TryRecvError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => {
                Err(mpsc::error::TryRecvError::Disconnected)
            }
        }
    }

    /// Drain every event already queued
    pub fn drain(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Close the event stream
    pub fn close(&mut self) {
        self.receiver.close();
    }

    /// Check if the event stream is closed
    pub fn is_closed(&self) -> bool {
        self.receiver.is_closed()
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        self.receiver.poll_recv(cx)
    }
}

/// Event filter for selective event processing
#[derive(Debug, Clone)]
pub struct EventFilter {
    /// Whether to include session lifecycle events
    pub include_session_events: bool,
    /// Whether to include playback events
    pub include_playback_events: bool,
    /// Whether to include subtitle events
    pub include_subtitle_events: bool,
    /// Whether to include error events
    pub include_error_events: bool,
    /// Specific event types to include (if specified, overrides other filters)
    pub specific_event_types: Option<Vec<String>>,
}

impl EventFilter {
    /// Create a filter that includes all events
    pub fn all() -> Self {
        Self {
            include_session_events: true,
            include_playback_events: true,
            include_subtitle_events: true,
            include_error_events: true,
            specific_event_types: None,
        }
    }

    /// Create a filter that includes only subtitle events
    pub fn subtitles_only() -> Self {
        Self {
            include_subtitle_events: true,
            ..Self::none()
        }
    }

    /// Create a filter that includes only error events
    pub fn errors_only() -> Self {
        Self {
            include_error_events: true,
            ..Self::none()
        }
    }

    /// Create a filter for specific event types
    pub fn specific(event_types: Vec<String>) -> Self {
        Self {
            specific_event_types: Some(event_types),
            ..Self::none()
        }
    }

    fn none() -> Self {
        Self {
            include_session_events: false,
            include_playback_events: false,
            include_subtitle_events: false,
            include_error_events: false,
            specific_event_types: None,
        }
    }

    /// Check if an event should be included based on this filter
    pub fn should_include(&self, event: &Event) -> bool {
        if let Some(ref specific_types) = self.specific_event_types {
            return specific_types.iter().any(|t| t == event.event_type());
        }

        (self.include_session_events && event.is_session_event())
            || (self.include_playback_events && event.is_playback_event())
            || (self.include_subtitle_events && event.is_subtitle_event())
            || (self.include_error_events && event.is_error_event())
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

/// Filtered event stream that only yields events matching a filter
#[derive(Debug)]
pub struct FilteredEventStream {
    stream: EventStream,
    filter: EventFilter,
}

impl FilteredEventStream {
    /// Create a new filtered event stream
    pub fn new(stream: EventStream, filter: EventFilter) -> Self {
        Self { stream, filter }
    }

    /// Get the next event that matches the filter
    pub async fn next(&mut self) -> Option<Event> {
        while let Some(event) = self.stream.next().await {
            if self.filter.should_include(&event) {
                return Some(event);
            }
        }
        None
    }

    /// Try to get the next filtered event without blocking
    pub fn try_next(&mut self) -> Result<Option<Event>, mpsc::error::TryRecvError> {
        while let Some(event) = self.stream.try_next()? {
            if self.filter.should_include(&event) {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }

    /// Update the filter
    pub fn set_filter(&mut self, filter: EventFilter) {
        self.filter = filter;
    }

    /// Get the current filter
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn test_event_type_classification() {
        let subtitle = Event::SubtitleChanged {
            text: "안녕하세요".to_string(),
        };
        assert!(subtitle.is_subtitle_event());
        assert!(!subtitle.is_playback_event());

        let error = Event::TerminalError {
            code: 100,
            message: "Video not found".to_string(),
        };
        assert!(error.is_error_event());
        assert!(!error.is_session_event());

        assert!(Event::PlaybackRateChanged {
            rate: PlaybackRate::Double
        }
        .is_playback_event());
    }

    #[test]
    fn test_event_filter() {
        let subtitle = Event::SubtitleChanged {
            text: String::new(),
        };
        let playing = Event::PlaybackStateChanged { is_playing: true };

        assert!(EventFilter::all().should_include(&playing));
        assert!(EventFilter::subtitles_only().should_include(&subtitle));
        assert!(!EventFilter::subtitles_only().should_include(&playing));

        let specific = EventFilter::specific(vec!["playback_state_changed".to_string()]);
        assert!(specific.should_include(&playing));
        assert!(!specific.should_include(&subtitle));
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_value(Event::SubtitleVisibilityChanged { visible: false }).unwrap();
        assert_eq!(json["type"], "subtitle_visibility_changed");
        assert_eq!(json["visible"], false);
    }

    #[tokio::test]
    async fn test_hub_fans_out_and_prunes() {
        let hub = EventHub::new();
        let mut first = hub.subscribe();
        let second = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);

        drop(second);
        hub.publish(Event::NoSubtitleTrack);
        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(first.next().await, Some(Event::NoSubtitleTrack));
    }

    #[tokio::test]
    async fn test_event_stream_is_a_stream() {
        let hub = EventHub::new();
        let stream = hub.subscribe();
        hub.publish(Event::NoSubtitleTrack);
        hub.publish(Event::SubtitleVisibilityChanged { visible: true });
        drop(hub);

        let types: Vec<_> = stream.map(|e| e.event_type()).collect().await;
        assert_eq!(types, vec!["no_subtitle_track", "subtitle_visibility_changed"]);
    }

    #[tokio::test]
    async fn test_filtered_event_stream() {
        let hub = EventHub::new();
        let mut filtered = FilteredEventStream::new(hub.subscribe(), EventFilter::errors_only());

        hub.publish(Event::PlaybackStateChanged { is_playing: true });
        hub.publish(Event::PlaybackError {
            operation: "pause".to_string(),
            error: "boom".to_string(),
            recoverable: true,
        });

        assert_eq!(filtered.next().await.unwrap().event_type(), "playback_error");
        assert!(filtered.try_next().unwrap().is_none());
    }
}
