//! Configuration types and defaults

use flixfluent_core::OverlapPolicy;
use std::time::Duration;

/// Environment variable holding the proxy base URL
pub const PROXY_URL_ENV: &str = "FLIXFLUENT_PROXY_URL";

/// Environment variable switching on debug logging
pub const DEBUG_ENV: &str = "FLIXFLUENT_DEBUG";

/// Global FlixFluent configuration
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    /// Enable debug logging
    pub debug_logging: bool,
    /// Base URL of the subtitle / word-analysis proxy
    pub proxy_url: Option<String>,
    /// Timeout for each proxy request
    pub request_timeout: Duration,
    /// Subtitle language tried first
    pub preferred_language: String,
    /// Element id the embed widget renders into
    pub embed_container: String,
    /// Synchronizer timings and policies
    pub sync: SyncConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            debug_logging: false,
            proxy_url: None,
            request_timeout: Duration::from_secs(10),
            preferred_language: "auto".to_string(),
            embed_container: "youtube-player".to_string(),
            sync: SyncConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Defaults overridden by `FLIXFLUENT_PROXY_URL` and `FLIXFLUENT_DEBUG`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        config.proxy_url = lookup(PROXY_URL_ENV)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        config.debug_logging = lookup(DEBUG_ENV)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        config
    }
}

/// Timings and policies of a playback session
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Subtitle poll period while cues are loaded
    pub subtitle_poll_interval: Duration,
    /// Progress poll period for embedded playback
    pub progress_poll_interval: Duration,
    /// Wait after metadata before inspecting text tracks
    pub track_detect_delay: Duration,
    /// Step used by skip forward / back
    pub seek_step_seconds: f64,
    /// Start embedded playback as soon as the widget is ready
    pub autoplay: bool,
    /// Which cue wins when cues overlap
    pub overlap_policy: OverlapPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            subtitle_poll_interval: Duration::from_millis(500),
            progress_poll_interval: Duration::from_millis(1000),
            track_detect_delay: Duration::from_millis(1000),
            seek_step_seconds: 10.0,
            autoplay: true,
            overlap_policy: OverlapPolicy::FirstMatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GlobalConfig::default();
        assert!(config.proxy_url.is_none());
        assert_eq!(config.sync.subtitle_poll_interval, Duration::from_millis(500));
        assert_eq!(config.sync.progress_poll_interval, Duration::from_secs(1));
        assert_eq!(config.sync.seek_step_seconds, 10.0);
    }

    #[test]
    fn test_from_lookup() {
        let config = GlobalConfig::from_lookup(|key| match key {
            PROXY_URL_ENV => Some(" https://proxy.example.com ".to_string()),
            DEBUG_ENV => Some("TRUE".to_string()),
            _ => None,
        });
        assert_eq!(config.proxy_url.as_deref(), Some("https://proxy.example.com"));
        assert!(config.debug_logging);

        let config = GlobalConfig::from_lookup(|key| match key {
            PROXY_URL_ENV => Some("   ".to_string()),
            _ => None,
        });
        assert!(config.proxy_url.is_none());
        assert!(!config.debug_logging);
    }
}
