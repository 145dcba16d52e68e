//! # FlixFluent Core
//!
//! Playback primitives shared by every FlixFluent crate.
//! This crate holds the pieces of the player that do not depend on a
//! particular media backend: subtitle cues and active-cue lookup, the
//! playback-rate cycle, progress math, video-source classification and the
//! cancellable poll scheduler that drives pull-based backends.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod cue;
pub mod error;
pub mod poll;
pub mod progress;
pub mod rate;
pub mod source;

// Re-export main types
pub use cue::{CueTrack, OverlapPolicy, SubtitleCue};
pub use error::{PlayerError, PlayerResult};
pub use poll::{PollHandle, PollScheduler};
pub use progress::{format_timestamp, progress_percent};
pub use rate::PlaybackRate;
pub use source::{extract_youtube_video_id, VideoSource};
