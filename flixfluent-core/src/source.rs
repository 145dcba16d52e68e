//! Video source classification
//!
//! A loaded URL is either a YouTube video, played through the embed widget,
//! or a direct media URL, played through a native media element. The choice
//! is made once per load from the shape of the URL.

use crate::{PlayerError, PlayerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Length of a bare YouTube video id
const YOUTUBE_ID_LEN: usize = 11;

/// Where a video comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoSource {
    /// YouTube video played through the embed widget
    YouTube {
        /// YouTube video id
        video_id: String,
    },
    /// Media file played by a native element
    Direct {
        /// Absolute media URL
        url: Url,
    },
}

impl VideoSource {
    /// Classify user input as a video source
    pub fn parse(input: &str) -> PlayerResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(PlayerError::EmptyUrl);
        }

        if let Some(video_id) = extract_youtube_video_id(input) {
            return Ok(VideoSource::YouTube { video_id });
        }

        Url::parse(input)
            .map(|url| VideoSource::Direct { url })
            .map_err(|e| PlayerError::InvalidUrl {
                url: input.to_string(),
                reason: format!("please enter a valid URL including http:// or https:// ({})", e),
            })
    }

    /// Whether this source needs the embed widget
    pub fn is_embedded(&self) -> bool {
        matches!(self, VideoSource::YouTube { .. })
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoSource::YouTube { video_id } => write!(f, "youtube:{}", video_id),
            VideoSource::Direct { url } => write!(f, "{}", url),
        }
    }
}

/// Extract a YouTube video id from a URL or a bare id.
///
/// Accepts `youtube.com/watch?v=ID` style URLs (any host containing
/// `youtube.com`), `youtu.be/ID` short links, and bare 11-character ids.
pub fn extract_youtube_video_id(input: &str) -> Option<String> {
    if input.chars().count() == YOUTUBE_ID_LEN && !input.contains('/') && !input.contains('.') {
        return Some(input.to_string());
    }

    let url = Url::parse(input).ok()?;
    let host = url.host_str()?;

    if host.contains("youtube.com") {
        return url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .filter(|id| !id.is_empty());
    }

    if host == "youtu.be" {
        let id = url.path().trim_start_matches('/');
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_youtube_video_id("https://www.youtube.com/watch?v=K3PDRB9R-YI&t=10"),
            Some("K3PDRB9R-YI".to_string())
        );
        assert_eq!(
            extract_youtube_video_id("https://m.youtube.com/watch?feature=share&v=abc"),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_short_link() {
        assert_eq!(
            extract_youtube_video_id("https://youtu.be/GJMG5Aj9rM8?si=tLn0wP2dtqTRN4KG"),
            Some("GJMG5Aj9rM8".to_string())
        );
        assert_eq!(extract_youtube_video_id("https://youtu.be/"), None);
    }

    #[test]
    fn test_bare_id() {
        assert_eq!(
            extract_youtube_video_id("p0U6qZBLoFs"),
            Some("p0U6qZBLoFs".to_string())
        );
        assert_eq!(extract_youtube_video_id("p0U6qZBLoF"), None);
        assert_eq!(extract_youtube_video_id("clip.mp4abc"), None);
    }

    #[test]
    fn test_non_youtube() {
        assert_eq!(extract_youtube_video_id("https://cdn.example.com/a.mp4"), None);
        assert_eq!(extract_youtube_video_id("https://www.youtube.com/feed"), None);
        assert_eq!(extract_youtube_video_id("not a url"), None);
    }

    #[test]
    fn test_parse_sources() {
        assert_eq!(
            VideoSource::parse("https://youtu.be/K3PDRB9R-YI").unwrap(),
            VideoSource::YouTube {
                video_id: "K3PDRB9R-YI".to_string()
            }
        );

        let direct = VideoSource::parse(" https://cdn.example.com/drama.mp4 ").unwrap();
        assert!(!direct.is_embedded());
        assert_eq!(direct.to_string(), "https://cdn.example.com/drama.mp4");

        assert_eq!(VideoSource::parse("   "), Err(PlayerError::EmptyUrl));
        match VideoSource::parse("drama.mp4") {
            Err(PlayerError::InvalidUrl { url, .. }) => assert_eq!(url, "drama.mp4"),
            other => panic!("expected InvalidUrl, got {:?}", other),
        }
    }
}
