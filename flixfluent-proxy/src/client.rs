//! HTTP client bound to the proxy base URL

use crate::error::{ProxyError, ProxyResult};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the subtitle / word-analysis proxy
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ProxyClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> ProxyResult<Self> {
        let base_url = Url::parse(base_url.trim()).map_err(|e| ProxyError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ProxyError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            });
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    /// Base URL requests are made against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for `endpoint` with the given query pairs
    pub fn endpoint_url(&self, endpoint: &str, query: &[(&str, &str)]) -> ProxyResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProxyError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .push(endpoint);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// GET `endpoint` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> ProxyResult<T> {
        let url = self.endpoint_url(endpoint, query)?;
        debug!("🌐 GET {}", url);

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_encodes_query() {
        let client = ProxyClient::new("https://proxy.example.com", DEFAULT_REQUEST_TIMEOUT).unwrap();
        let url = client
            .endpoint_url("analyze-word", &[("word", "안녕 하세요")])
            .unwrap();
        assert_eq!(url.path(), "/analyze-word");
        assert_eq!(
            url.query_pairs().next().map(|(_, v)| v.into_owned()),
            Some("안녕 하세요".to_string())
        );
    }

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let client =
            ProxyClient::new("https://proxy.example.com/api/", DEFAULT_REQUEST_TIMEOUT).unwrap();
        let url = client.endpoint_url("subtitles", &[]).unwrap();
        assert_eq!(url.as_str(), "https://proxy.example.com/api/subtitles");
    }

    #[test]
    fn test_invalid_base_url() {
        let error = ProxyClient::new("not a url", DEFAULT_REQUEST_TIMEOUT).unwrap_err();
        assert_eq!(error.error_code(), "INVALID_BASE_URL");

        let error = ProxyClient::new("mailto:someone@example.com", DEFAULT_REQUEST_TIMEOUT)
            .unwrap_err();
        assert_eq!(error.error_code(), "INVALID_BASE_URL");
    }
}
