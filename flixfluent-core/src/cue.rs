//! Subtitle cues and active-cue lookup

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A time-bounded subtitle text span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// Start of the span in seconds
    pub start: f64,
    /// End of the span in seconds (inclusive)
    pub end: f64,
    /// Subtitle text
    pub text: String,
}

impl SubtitleCue {
    /// Create a new cue
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Whether `time` falls inside `[start, end]`
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    /// Length of the span in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    fn is_well_formed(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.end >= self.start
    }
}

/// How to pick a cue when several intervals contain the same instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverlapPolicy {
    /// First containing cue in list order wins
    #[default]
    FirstMatch,
    /// Latest-starting containing cue wins, so a newer line replaces an
    /// older one that has not ended yet
    LatestStart,
}

/// Ordered cue list owned by one playback session
#[derive(Debug, Clone, Default)]
pub struct CueTrack {
    cues: Vec<SubtitleCue>,
    policy: OverlapPolicy,
}

impl CueTrack {
    /// Build a track from cues as listed.
    ///
    /// List order is kept; malformed cues (non-finite bounds or
    /// `end < start`) are dropped.
    pub fn new(cues: Vec<SubtitleCue>) -> Self {
        Self::with_policy(cues, OverlapPolicy::default())
    }

    /// Build a track with an explicit overlap policy
    pub fn with_policy(cues: Vec<SubtitleCue>, policy: OverlapPolicy) -> Self {
        let total = cues.len();
        let cues: Vec<SubtitleCue> = cues.into_iter().filter(|c| c.is_well_formed()).collect();
        if cues.len() != total {
            debug!(
                "🧹 Dropped {} malformed subtitle cues",
                total - cues.len()
            );
        }

        Self { cues, policy }
    }

    /// Overlap policy in use
    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// All cues in list order
    pub fn cues(&self) -> &[SubtitleCue] {
        &self.cues
    }

    /// Number of cues
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// Whether the track has no cues
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Cue whose interval contains `time`, if any
    pub fn active_cue(&self, time: f64) -> Option<&SubtitleCue> {
        if !time.is_finite() {
            return None;
        }

        match self.policy {
            OverlapPolicy::FirstMatch => self.cues.iter().find(|c| c.contains(time)),
            // ties on start go to the later cue in the list
            OverlapPolicy::LatestStart => self
                .cues
                .iter()
                .filter(|c| c.contains(time))
                .fold(None, |best: Option<&SubtitleCue>, c| match best {
                    Some(b) if b.start > c.start => Some(b),
                    _ => Some(c),
                }),
        }
    }

    /// Text of the active cue, or the empty string when none matches
    pub fn active_text(&self, time: f64) -> &str {
        self.active_cue(time).map(|c| c.text.as_str()).unwrap_or("")
    }
}

impl From<Vec<SubtitleCue>> for CueTrack {
    fn from(cues: Vec<SubtitleCue>) -> Self {
        Self::new(cues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cues() -> CueTrack {
        CueTrack::new(vec![
            SubtitleCue::new(0.0, 5.0, "A"),
            SubtitleCue::new(5.0, 10.0, "B"),
        ])
    }

    #[test]
    fn test_active_cue_lookup() {
        let track = two_cues();
        assert_eq!(track.active_text(3.0), "A");
        assert_eq!(track.active_text(7.0), "B");
        assert_eq!(track.active_text(12.0), "");
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let track = two_cues();
        assert_eq!(track.active_text(0.0), "A");
        // Shared boundary goes to the earlier cue
        assert_eq!(track.active_text(5.0), "A");
        assert_eq!(track.active_text(10.0), "B");
        assert_eq!(track.active_text(10.01), "");
    }

    #[test]
    fn test_list_order_is_kept() {
        let track = CueTrack::new(vec![
            SubtitleCue::new(10.0, 15.0, "C"),
            SubtitleCue::new(0.0, 5.0, "A"),
            SubtitleCue::new(5.0, 10.0, "B"),
        ]);
        let texts: Vec<&str> = track.cues().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["C", "A", "B"]);
        assert_eq!(track.active_text(12.0), "C");
        assert_eq!(track.active_text(3.0), "A");
    }

    #[test]
    fn test_unsorted_overlap_first_match_uses_list_order() {
        let cues = vec![
            SubtitleCue::new(4.0, 6.0, "short"),
            SubtitleCue::new(0.0, 10.0, "long"),
        ];

        let first = CueTrack::new(cues.clone());
        assert_eq!(first.active_text(5.0), "short");
        assert_eq!(first.active_text(8.0), "long");

        let latest = CueTrack::with_policy(cues, OverlapPolicy::LatestStart);
        assert_eq!(latest.active_text(5.0), "short");
        assert_eq!(latest.active_text(2.0), "long");
    }

    #[test]
    fn test_malformed_cues_dropped() {
        let track = CueTrack::new(vec![
            SubtitleCue::new(4.0, 2.0, "backwards"),
            SubtitleCue::new(f64::NAN, 2.0, "nan"),
            SubtitleCue::new(1.0, 2.0, "ok"),
        ]);
        assert_eq!(track.len(), 1);
        assert_eq!(track.active_text(1.5), "ok");
    }

    #[test]
    fn test_overlap_policies() {
        let cues = vec![
            SubtitleCue::new(0.0, 10.0, "long"),
            SubtitleCue::new(4.0, 6.0, "short"),
        ];

        let first = CueTrack::with_policy(cues.clone(), OverlapPolicy::FirstMatch);
        assert_eq!(first.active_text(5.0), "long");

        let latest = CueTrack::with_policy(cues, OverlapPolicy::LatestStart);
        assert_eq!(latest.active_text(5.0), "short");
        assert_eq!(latest.active_text(8.0), "long");
    }

    #[test]
    fn test_empty_track_and_nan_time() {
        let track = CueTrack::default();
        assert!(track.is_empty());
        assert_eq!(track.active_text(1.0), "");
        assert_eq!(two_cues().active_text(f64::NAN), "");
    }
}
