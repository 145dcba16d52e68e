//! Text track abstractions for native media elements

use serde::{Deserialize, Serialize};

/// Kind of an embedded text track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextTrackKind {
    /// Translated dialogue
    Subtitles,
    /// Dialogue plus sound effects
    Captions,
    /// Audio descriptions
    Descriptions,
    /// Chapter titles
    Chapters,
    /// Script-only data
    Metadata,
}

/// How the element treats a text track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextTrackMode {
    /// Not loaded, no cue events
    #[default]
    Disabled,
    /// Cue events fire, element does not draw cues
    Hidden,
    /// Element draws cues itself
    Showing,
}

/// Text track exposed by a native media element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextTrack {
    /// Position in the element's track list
    pub index: usize,
    /// Track kind
    pub kind: TextTrackKind,
    /// Display label
    pub label: String,
    /// BCP 47 language tag, if declared
    pub language: Option<String>,
}

impl TextTrack {
    /// Create a subtitles track
    pub fn subtitles(index: usize, label: impl Into<String>, language: Option<&str>) -> Self {
        Self {
            index,
            kind: TextTrackKind::Subtitles,
            label: label.into(),
            language: language.map(str::to_string),
        }
    }

    /// Whether the track carries dialogue the player can display
    pub fn is_dialogue(&self) -> bool {
        matches!(self.kind, TextTrackKind::Subtitles | TextTrackKind::Captions)
    }
}
