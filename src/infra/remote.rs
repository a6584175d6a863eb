//! Remote baseline fetching
//!
//! Fetches deployed `meta.json` and `index.html` documents over HTTP, retrying
//! with exponential backoff.

use std::future::Future;
use std::time::Duration;

use crate::config::defaults;
use crate::core::baseline::Baseline;
use crate::error::FetchError;

/// HTTP fetcher for remote baselines
#[derive(Debug, Clone)]
pub struct RemoteBaseline {
    client: reqwest::Client,
    max_retries: u32,
    base_delay_ms: u64,
}

impl Default for RemoteBaseline {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteBaseline {
    /// Create a fetcher with default retry settings
    pub fn new() -> Self {
        Self::with_config(defaults::MAX_FETCH_RETRIES, defaults::FETCH_RETRY_DELAY_MS)
    }

    /// Create a fetcher with custom retry settings
    pub fn with_config(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .connect_timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            max_retries,
            base_delay_ms,
        }
    }

    /// Fetch `url`, retrying failed attempts
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let mut attempts = 0;
        let mut last_error = None;
        let mut delay_ms = self.base_delay_ms;

        while attempts < self.max_retries {
            attempts += 1;

            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    tracing::debug!("Attempt {attempts}/{} failed: {e}", self.max_retries);
                    last_error = Some(e);

                    if attempts < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms = (delay_ms * 2).min(10_000);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::MaxRetriesExceeded {
            url: url.to_string(),
            retries: self.max_retries,
        }))
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                error: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Network {
            url: url.to_string(),
            error: e.to_string(),
        })
    }
}

impl Baseline for RemoteBaseline {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send {
        self.fetch_text(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/prod/meta.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"modules\":{}}"))
            .mount(&server)
            .await;

        let body = RemoteBaseline::with_config(1, 1)
            .fetch_text(&format!("{}/prod/meta.json", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "{\"modules\":{}}");
    }

    #[tokio::test]
    async fn test_status_error_after_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/index.html"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let err = RemoteBaseline::with_config(3, 1)
            .fetch_text(&format!("{}/index.html", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }
}
