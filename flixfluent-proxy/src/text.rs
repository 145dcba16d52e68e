//! Subtitle text helpers

use crate::lexicon::KoreanDictionary;
use serde::{Deserialize, Serialize};

fn is_korean_char(c: char) -> bool {
    matches!(c,
        '\u{AC00}'..='\u{D7AF}'   // syllables
        | '\u{1100}'..='\u{11FF}' // jamo
        | '\u{3130}'..='\u{318F}' // compatibility jamo
        | '\u{A960}'..='\u{A97F}' // jamo extended-A
        | '\u{D7B0}'..='\u{D7FF}' // jamo extended-B
    )
}

/// Whether `text` contains any Hangul
pub fn contains_korean(text: &str) -> bool {
    text.chars().any(is_korean_char)
}

/// Split subtitle text into selectable words
pub fn segment_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// One displayable piece of a subtitle line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleWord {
    /// Text as shown
    pub text: String,
    /// Hover gloss; `None` for non-selectable text
    pub translation: Option<String>,
}

impl SubtitleWord {
    /// Whether the user can select this piece for analysis
    pub fn is_selectable(&self) -> bool {
        self.translation.is_some()
    }
}

/// Break a subtitle line into display pieces.
///
/// Korean lines become one selectable word per whitespace-separated token with
/// its dictionary gloss; other lines stay a single plain piece.
pub fn annotate_subtitle(text: &str, dictionary: &KoreanDictionary) -> Vec<SubtitleWord> {
    if text.is_empty() {
        return Vec::new();
    }
    if !contains_korean(text) {
        return vec![SubtitleWord {
            text: text.to_string(),
            translation: None,
        }];
    }

    segment_words(text)
        .into_iter()
        .map(|word| SubtitleWord {
            text: word.to_string(),
            translation: Some(dictionary.translate(word).to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_korean() {
        assert!(contains_korean("안녕하세요"));
        assert!(contains_korean("Hello ㅋㅋ"));
        assert!(contains_korean("\u{1100}"));
        assert!(contains_korean("\u{D7B0}"));
        assert!(!contains_korean("Hello world"));
        assert!(!contains_korean("こんにちは"));
        assert!(!contains_korean(""));
    }

    #[test]
    fn test_segment_words_drops_empties() {
        assert_eq!(
            segment_words("  좋은   하루\t되세요 "),
            vec!["좋은", "하루", "되세요"]
        );
        assert!(segment_words("   ").is_empty());
    }

    #[test]
    fn test_annotate_korean_line() {
        let dictionary = KoreanDictionary::default();
        let words = annotate_subtitle("좋은 하루 되세요", &dictionary);
        assert_eq!(words.len(), 3);
        assert!(words.iter().all(SubtitleWord::is_selectable));
        assert_eq!(words[1].translation.as_deref(), Some("Day"));
    }

    #[test]
    fn test_annotate_plain_line() {
        let dictionary = KoreanDictionary::default();
        let words = annotate_subtitle("Have a nice day", &dictionary);
        assert_eq!(words.len(), 1);
        assert!(!words[0].is_selectable());
        assert!(annotate_subtitle("", &dictionary).is_empty());
    }
}
