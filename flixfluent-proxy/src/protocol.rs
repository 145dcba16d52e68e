//! Proxy wire format

use flixfluent_core::SubtitleCue;
use serde::{Deserialize, Serialize};

/// Cue length used when an entry carries no usable `dur`
pub const DEFAULT_CUE_SECONDS: f64 = 5.0;

/// Response of `GET /subtitles`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubtitleResponse {
    /// Caption entries, in track order
    #[serde(default)]
    pub subtitles: Vec<WireSubtitle>,
    /// Error reported by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Seconds value sent either as a JSON number or as a numeric string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireSeconds {
    /// `12.5`
    Number(f64),
    /// `"12.5"`
    Text(String),
}

impl WireSeconds {
    /// Numeric value, if it parses
    pub fn seconds(&self) -> Option<f64> {
        match self {
            WireSeconds::Number(n) => Some(*n),
            WireSeconds::Text(s) => s.trim().parse().ok(),
        }
        .filter(|n: &f64| n.is_finite())
    }
}

/// One caption entry on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireSubtitle {
    /// Start in seconds
    pub start: WireSeconds,
    /// Length in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dur: Option<WireSeconds>,
    /// Caption text
    pub text: String,
}

impl WireSubtitle {
    /// Convert to a cue; `None` when `start` is not a number.
    ///
    /// A missing, empty, unparseable or zero `dur` counts as
    /// [`DEFAULT_CUE_SECONDS`].
    pub fn to_cue(&self) -> Option<SubtitleCue> {
        let start = self.start.seconds()?;
        let dur = self
            .dur
            .as_ref()
            .and_then(WireSeconds::seconds)
            .filter(|d| *d != 0.0)
            .unwrap_or(DEFAULT_CUE_SECONDS);
        Some(SubtitleCue::new(start, start + dur, self.text.clone()))
    }
}

impl SubtitleResponse {
    /// Cues from every entry with a numeric start
    pub fn into_cues(self) -> Vec<SubtitleCue> {
        self.subtitles.iter().filter_map(WireSubtitle::to_cue).collect()
    }
}

/// One morpheme of a word breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deconstruction {
    /// Surface form of the component
    pub component: String,
    /// What the component contributes
    pub explanation: String,
}

/// Example sentence pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleSentence {
    /// Korean sentence
    pub korean: String,
    /// English translation
    pub english: String,
}

/// Lexical breakdown of a subtitle word, as returned by `GET /analyze-word`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordAnalysis {
    /// Latin transcription
    pub romanization: String,
    /// Part of speech
    pub part_of_speech: String,
    /// Glosses
    #[serde(default)]
    pub meaning: Vec<String>,
    /// Morphological decomposition
    #[serde(default)]
    pub deconstruction: Vec<Deconstruction>,
    /// Example sentences
    #[serde(default)]
    pub examples: Vec<ExampleSentence>,
}

impl WordAnalysis {
    /// Record shown when no analysis could be fetched
    pub fn unavailable(word: &str, translation: &str) -> Self {
        Self {
            romanization: word.to_string(),
            part_of_speech: "unknown".to_string(),
            meaning: vec![translation.to_string()],
            deconstruction: vec![Deconstruction {
                component: word.to_string(),
                explanation: "No detailed analysis available.".to_string(),
            }],
            examples: vec![ExampleSentence {
                korean: "예문이 없습니다.".to_string(),
                english: "No examples available.".to_string(),
            }],
        }
    }
}

/// Text shown when no translation could be fetched
pub const TRANSLATION_NOT_AVAILABLE: &str = "Translation not available";

/// Word translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordTranslation {
    /// Translated text
    pub translated_text: String,
    /// Pronunciation guide
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    /// Part of speech
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    /// Example sentences
    #[serde(default)]
    pub examples: Vec<ExampleSentence>,
}

impl WordTranslation {
    /// Translation with only a text
    pub fn text(translated_text: impl Into<String>) -> Self {
        Self {
            translated_text: translated_text.into(),
            pronunciation: None,
            part_of_speech: None,
            examples: Vec::new(),
        }
    }

    /// Placeholder used when translation failed
    pub fn unavailable() -> Self {
        Self::text(TRANSLATION_NOT_AVAILABLE)
    }
}

/// Response of `GET /translate-openai`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationResponse {
    /// Translation payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<TranslationPayload>,
    /// Error reported by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Translation payload with every field optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationPayload {
    /// Translated text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,
    /// Pronunciation guide
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    /// Part of speech
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    /// Example sentences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<ExampleSentence>>,
}

impl From<TranslationPayload> for WordTranslation {
    fn from(payload: TranslationPayload) -> Self {
        Self {
            translated_text: payload
                .translated_text
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "No translation".to_string()),
            pronunciation: payload.pronunciation,
            part_of_speech: payload.part_of_speech,
            examples: payload.examples.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtitle_entries_accept_numbers_and_strings() {
        let body = r#"{"subtitles":[
            {"start":"1.5","dur":"2","text":"안녕하세요"},
            {"start":4,"text":"감사합니다"},
            {"start":"x","dur":1,"text":"dropped"},
            {"start":10,"dur":"","text":"빈 길이"}
        ]}"#;
        let response: SubtitleResponse = serde_json::from_str(body).unwrap();
        let cues = response.into_cues();

        assert_eq!(cues.len(), 3);
        assert_eq!(cues[0], SubtitleCue::new(1.5, 3.5, "안녕하세요"));
        assert_eq!(cues[1], SubtitleCue::new(4.0, 9.0, "감사합니다"));
        assert_eq!(cues[2].end, 15.0);
    }

    #[test]
    fn test_error_field_is_read() {
        let response: SubtitleResponse =
            serde_json::from_str(r#"{"error":"No captions"}"#).unwrap();
        assert!(response.subtitles.is_empty());
        assert_eq!(response.error.as_deref(), Some("No captions"));
    }

    #[test]
    fn test_word_analysis_uses_camel_case() {
        let analysis = WordAnalysis::unavailable("학교", "school");
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["partOfSpeech"], "unknown");
        assert_eq!(json["meaning"][0], "school");
        assert_eq!(
            json["deconstruction"][0]["explanation"],
            "No detailed analysis available."
        );
    }

    #[test]
    fn test_translation_payload_defaults() {
        let translation: WordTranslation = TranslationPayload::default().into();
        assert_eq!(translation.translated_text, "No translation");
        assert!(translation.examples.is_empty());
    }
}
