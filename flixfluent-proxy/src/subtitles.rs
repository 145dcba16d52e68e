//! Subtitle sources
//!
//! A [`SubtitleSource`] always produces cues. When the proxy has nothing for
//! a video, or cannot be reached, the caller gets the fallback script.

use crate::client::ProxyClient;
use crate::error::{ProxyError, ProxyResult};
use crate::protocol::SubtitleResponse;
use async_trait::async_trait;
use flixfluent_core::SubtitleCue;
use tracing::{debug, info, warn};

/// Languages tried after the preferred one
const FALLBACK_LANGUAGES: [&str; 3] = ["ko", "en", "auto"];

/// Fallback script, one line every five seconds
const FALLBACK_SCRIPT: [&str; 9] = [
    "안녕하세요",
    "한국어 학습에 오신 것을 환영합니다",
    "이 비디오는 한국어 학습을 위한 것입니다",
    "오늘 우리는 기본 표현을 배울 것입니다",
    "감사합니다",
    "이것은 여러분이 한국어를 배우는데 도움이 될 것입니다",
    "좋은 하루 되세요",
    "다음 시간에 뵙겠습니다",
    "안녕히 계세요",
];

/// Cues used whenever no real subtitles are available
pub fn fallback_subtitles() -> Vec<SubtitleCue> {
    FALLBACK_SCRIPT
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let start = i as f64 * 5.0;
            SubtitleCue::new(start, start + 5.0, *text)
        })
        .collect()
}

/// Languages to request, in order, without duplicates
pub fn languages_to_try(preferred: &str) -> Vec<String> {
    let mut languages: Vec<String> = Vec::with_capacity(FALLBACK_LANGUAGES.len() + 1);
    for language in std::iter::once(preferred).chain(FALLBACK_LANGUAGES) {
        if !language.is_empty() && !languages.iter().any(|l| l == language) {
            languages.push(language.to_string());
        }
    }
    languages
}

/// Supplies subtitle cues for a video
#[async_trait]
pub trait SubtitleSource: Send + Sync {
    /// Cues for `video_id`, preferring `language`. Never fails.
    async fn fetch(&self, video_id: &str, language: &str) -> Vec<SubtitleCue>;
}

/// Subtitle source backed by the proxy's `/subtitles` endpoint
#[derive(Debug, Clone)]
pub struct ProxySubtitleSource {
    client: ProxyClient,
    fallback: Vec<SubtitleCue>,
}

impl ProxySubtitleSource {
    /// Source falling back to [`fallback_subtitles`]
    pub fn new(client: ProxyClient) -> Self {
        Self::with_fallback(client, fallback_subtitles())
    }

    /// Source with a custom fallback list
    pub fn with_fallback(client: ProxyClient, fallback: Vec<SubtitleCue>) -> Self {
        Self { client, fallback }
    }

    /// Request cues in exactly one language
    pub async fn fetch_language(
        &self,
        video_id: &str,
        language: &str,
    ) -> ProxyResult<Vec<SubtitleCue>> {
        let response: SubtitleResponse = self
            .client
            .get_json("subtitles", &[("videoId", video_id), ("lang", language)])
            .await?;

        if let Some(message) = response.error {
            return Err(ProxyError::Service { message });
        }

        let cues = response.into_cues();
        if cues.is_empty() {
            return Err(ProxyError::Empty {
                what: format!("subtitles of {} in {}", video_id, language),
            });
        }
        Ok(cues)
    }
}

#[async_trait]
impl SubtitleSource for ProxySubtitleSource {
    async fn fetch(&self, video_id: &str, language: &str) -> Vec<SubtitleCue> {
        for lang in languages_to_try(language) {
            match self.fetch_language(video_id, &lang).await {
                Ok(cues) => {
                    info!(
                        "📝 Loaded {} subtitles for {} in '{}'",
                        cues.len(),
                        video_id,
                        lang
                    );
                    return cues;
                }
                Err(e) => debug!("No subtitles for {} in '{}': {}", video_id, lang, e),
            }
        }

        warn!(
            "📝 All subtitle requests for {} failed, using fallback subtitles",
            video_id
        );
        self.fallback.clone()
    }
}

/// Subtitle source serving a fixed list
#[derive(Debug, Clone)]
pub struct StaticSubtitleSource {
    cues: Vec<SubtitleCue>,
}

impl StaticSubtitleSource {
    /// Serve `cues` for every video
    pub fn new(cues: Vec<SubtitleCue>) -> Self {
        Self { cues }
    }
}

impl Default for StaticSubtitleSource {
    fn default() -> Self {
        Self::new(fallback_subtitles())
    }
}

#[async_trait]
impl SubtitleSource for StaticSubtitleSource {
    async fn fetch(&self, _video_id: &str, _language: &str) -> Vec<SubtitleCue> {
        self.cues.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_script_timing() {
        let cues = fallback_subtitles();
        assert_eq!(cues.len(), 9);
        assert_eq!(cues[0], SubtitleCue::new(0.0, 5.0, "안녕하세요"));
        assert_eq!(cues[8], SubtitleCue::new(40.0, 45.0, "안녕히 계세요"));
    }

    #[test]
    fn test_languages_are_deduplicated() {
        assert_eq!(languages_to_try("ja"), vec!["ja", "ko", "en", "auto"]);
        assert_eq!(languages_to_try("en"), vec!["en", "ko", "auto"]);
        assert_eq!(languages_to_try("auto"), vec!["auto", "ko", "en"]);
        assert_eq!(languages_to_try(""), vec!["ko", "en", "auto"]);
    }

    #[tokio::test]
    async fn test_static_source_ignores_video() {
        let source = StaticSubtitleSource::new(vec![SubtitleCue::new(0.0, 1.0, "x")]);
        assert_eq!(source.fetch("abc", "ko").await.len(), 1);
    }
}
