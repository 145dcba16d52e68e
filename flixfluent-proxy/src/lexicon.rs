//! Word lookups for selected subtitle words

use crate::client::ProxyClient;
use crate::error::ProxyError;
use crate::protocol::{TranslationResponse, WordAnalysis, WordTranslation, TRANSLATION_NOT_AVAILABLE};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Looks up analyses and translations for single words
#[async_trait]
pub trait WordLookup: Send + Sync {
    /// Breakdown of `word`; `translation` is the gloss already shown. Never fails.
    async fn lookup(&self, word: &str, translation: &str) -> WordAnalysis;

    /// Translation of `word`. Never fails.
    async fn translate(&self, _word: &str) -> WordTranslation {
        WordTranslation::unavailable()
    }
}

/// Lookup backed by the proxy's `/analyze-word` and `/translate-openai` endpoints
#[derive(Debug, Clone)]
pub struct ProxyWordLookup {
    client: ProxyClient,
}

impl ProxyWordLookup {
    /// Lookup through `client`
    pub fn new(client: ProxyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WordLookup for ProxyWordLookup {
    async fn lookup(&self, word: &str, translation: &str) -> WordAnalysis {
        match self
            .client
            .get_json::<WordAnalysis>("analyze-word", &[("word", word)])
            .await
        {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("🔍 Word analysis for '{}' failed, using fallback: {}", word, e);
                WordAnalysis::unavailable(word, translation)
            }
        }
    }

    async fn translate(&self, word: &str) -> WordTranslation {
        let response = self
            .client
            .get_json::<TranslationResponse>("translate-openai", &[("word", word)])
            .await
            .and_then(|mut response| match response.error.take() {
                Some(message) => Err(ProxyError::Service { message }),
                None => Ok(response),
            });

        match response {
            Ok(TranslationResponse {
                translation: Some(payload),
                ..
            }) => payload.into(),
            Ok(_) => {
                debug!("Translation response for '{}' carried no payload", word);
                WordTranslation::unavailable()
            }
            Err(e) => {
                warn!("🔍 Translation of '{}' failed: {}", word, e);
                WordTranslation::unavailable()
            }
        }
    }
}

/// Offline lookup answering from a [`KoreanDictionary`]
#[derive(Debug, Clone, Default)]
pub struct DictionaryWordLookup {
    dictionary: KoreanDictionary,
}

impl DictionaryWordLookup {
    /// Lookup over `dictionary`
    pub fn new(dictionary: KoreanDictionary) -> Self {
        Self { dictionary }
    }
}

#[async_trait]
impl WordLookup for DictionaryWordLookup {
    async fn lookup(&self, word: &str, translation: &str) -> WordAnalysis {
        WordAnalysis::unavailable(word, translation)
    }

    async fn translate(&self, word: &str) -> WordTranslation {
        WordTranslation::text(self.dictionary.translate(word))
    }
}

const BUILTIN_ENTRIES: &[(&str, &str)] = &[
    ("안녕하세요", "Hello"),
    ("안녕히", "Peacefully"),
    ("계세요", "Stay (goodbye to someone staying)"),
    ("감사합니다", "Thank you"),
    ("한국어", "Korean language"),
    ("한국어를", "Korean language (object)"),
    ("학습에", "To learning"),
    ("학습을", "Learning (object)"),
    ("오신", "Came (honorific)"),
    ("것을", "The thing (object)"),
    ("것입니다", "It is the thing"),
    ("환영합니다", "Welcome"),
    ("이", "This"),
    ("이것은", "This (topic)"),
    ("비디오는", "The video (topic)"),
    ("위한", "For"),
    ("오늘", "Today"),
    ("우리는", "We (topic)"),
    ("기본", "Basic"),
    ("표현을", "Expressions (object)"),
    ("배울", "Will learn"),
    ("배우는데", "In learning"),
    ("여러분이", "Everyone (subject)"),
    ("도움이", "Help (subject)"),
    ("될", "Will become"),
    ("좋은", "Good"),
    ("하루", "Day"),
    ("되세요", "Have (a ...)"),
    ("다음", "Next"),
    ("시간에", "At the time"),
    ("뵙겠습니다", "Will see you (humble)"),
];

/// Static word → gloss table for quick hover translations
#[derive(Debug, Clone)]
pub struct KoreanDictionary {
    entries: HashMap<String, String>,
}

impl Default for KoreanDictionary {
    fn default() -> Self {
        Self::from_entries(BUILTIN_ENTRIES.iter().copied())
    }
}

impl KoreanDictionary {
    /// Empty dictionary
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Dictionary from `(word, gloss)` pairs
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(word, gloss)| (word.to_string(), gloss.to_string()))
                .collect(),
        }
    }

    /// Add or replace an entry
    pub fn insert(&mut self, word: impl Into<String>, gloss: impl Into<String>) {
        self.entries.insert(word.into(), gloss.into());
    }

    /// Gloss for `word`, if known
    pub fn get(&self, word: &str) -> Option<&str> {
        self.entries.get(word).map(String::as_str)
    }

    /// Gloss for `word`, or "Translation not available"
    pub fn translate(&self, word: &str) -> &str {
        self.get(word).unwrap_or(TRANSLATION_NOT_AVAILABLE)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_dictionary() {
        let dictionary = KoreanDictionary::default();
        assert_eq!(dictionary.translate("감사합니다"), "Thank you");
        assert_eq!(dictionary.translate("컴퓨터"), "Translation not available");
    }

    #[test]
    fn test_insert_overrides() {
        let mut dictionary = KoreanDictionary::empty();
        assert!(dictionary.is_empty());
        dictionary.insert("학교", "School");
        dictionary.insert("학교", "School (building)");
        assert_eq!(dictionary.len(), 1);
        assert_eq!(dictionary.get("학교"), Some("School (building)"));
    }

    #[tokio::test]
    async fn test_dictionary_lookup_is_offline() {
        let lookup = DictionaryWordLookup::default();
        let analysis = lookup.lookup("하루", "Day").await;
        assert_eq!(analysis, WordAnalysis::unavailable("하루", "Day"));
        assert_eq!(lookup.translate("하루").await.translated_text, "Day");
    }

    struct AnalysisOnly;

    #[async_trait]
    impl WordLookup for AnalysisOnly {
        async fn lookup(&self, word: &str, translation: &str) -> WordAnalysis {
            WordAnalysis::unavailable(word, translation)
        }
    }

    #[tokio::test]
    async fn test_translate_defaults_to_unavailable() {
        assert_eq!(
            AnalysisOnly.translate("하루").await,
            WordTranslation::unavailable()
        );
    }
}
