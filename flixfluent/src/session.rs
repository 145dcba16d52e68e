//! Playback session state

use chrono::{DateTime, Utc};
use flixfluent_core::{progress_percent, PlaybackRate, VideoSource};
use flixfluent_media::BackendKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State of one loaded video, as a UI would render it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSession {
    /// Session id, fresh for every load
    pub session_id: Uuid,
    /// When the video was loaded
    pub started_at: DateTime<Utc>,
    /// What is playing
    pub source: VideoSource,
    /// Backend driving playback
    pub backend_kind: BackendKind,
    /// Whether the backend reported playback
    pub is_playing: bool,
    /// Last known position in seconds
    pub current_time_seconds: f64,
    /// Duration in seconds once known
    pub duration_seconds: Option<f64>,
    /// Progress in percent, never NaN
    pub progress_percent: f64,
    /// Selected playback rate
    pub playback_rate: PlaybackRate,
    /// Whether the player is fullscreen
    pub is_fullscreen: bool,
    /// Whether subtitles are displayed
    pub subtitles_visible: bool,
    /// Whether metadata / readiness arrived
    pub is_loaded: bool,
    /// Text of the active cue, empty when none
    pub active_cue: String,
    /// Number of loaded cues
    pub cue_count: usize,
    /// Whether a media text track drives the subtitles
    pub has_text_track: bool,
    /// Terminal error that ended the session
    pub terminal_error: Option<String>,
}

impl PlaybackSession {
    /// Fresh session for `source`
    pub fn new(source: VideoSource, backend_kind: BackendKind) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            source,
            backend_kind,
            is_playing: false,
            current_time_seconds: 0.0,
            duration_seconds: None,
            progress_percent: 0.0,
            playback_rate: PlaybackRate::default(),
            is_fullscreen: false,
            subtitles_visible: true,
            is_loaded: false,
            active_cue: String::new(),
            cue_count: 0,
            has_text_track: false,
            terminal_error: None,
        }
    }

    /// Record a position / duration reading and recompute progress.
    ///
    /// A duration that is NaN, infinite or not positive is treated as unknown.
    pub fn record_time(&mut self, current_time: f64, duration: f64) {
        if current_time.is_finite() {
            self.current_time_seconds = current_time.max(0.0);
        }
        self.record_duration(duration);
        self.progress_percent = progress_percent(
            self.current_time_seconds,
            self.duration_seconds.unwrap_or(f64::NAN),
        );
    }

    /// Record a duration reading
    pub fn record_duration(&mut self, duration: f64) {
        if duration.is_finite() && duration > 0.0 {
            self.duration_seconds = Some(duration);
        }
    }

    /// Whether the session ended on a terminal error
    pub fn is_terminated(&self) -> bool {
        self.terminal_error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> PlaybackSession {
        PlaybackSession::new(
            VideoSource::parse("dQw4w9WgXcQ").unwrap(),
            BackendKind::Embedded,
        )
    }

    #[test]
    fn test_progress_is_zero_without_duration() {
        let mut session = session();
        session.record_time(12.0, f64::NAN);
        assert_eq!(session.progress_percent, 0.0);
        assert_eq!(session.duration_seconds, None);

        session.record_time(12.0, 0.0);
        assert_eq!(session.progress_percent, 0.0);
    }

    #[test]
    fn test_progress_with_duration() {
        let mut session = session();
        session.record_time(30.0, 120.0);
        assert_eq!(session.progress_percent, 25.0);
        assert_eq!(session.duration_seconds, Some(120.0));

        // an unknown reading keeps the last known duration
        session.record_time(60.0, f64::NAN);
        assert_eq!(session.progress_percent, 50.0);
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        assert_ne!(session().session_id, session().session_id);
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(session()).unwrap();
        assert_eq!(json["playback_rate"], "Normal");
        assert_eq!(json["subtitles_visible"], true);
        assert!(json["duration_seconds"].is_null());
    }
}
