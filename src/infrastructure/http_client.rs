//! HTTP client for fetching product pages.
//!
//! A thin wrapper over reqwest with a scraping-friendly configuration:
//! browser-ish user agent, cookie jar, gzip, bounded retries with
//! exponential backoff. Fetching returns the body as a string; parsing
//! into a `scraper::Html` stays a separate synchronous step because the
//! parsed document is not `Send` and must not be held across await points.

use std::time::Duration;

use anyhow::{Result, anyhow};
use reqwest::{Client, ClientBuilder};
use scraper::Html;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for HTTP client behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum number of attempts for failed requests.
    pub max_retries: u32,
    /// User agent string.
    pub user_agent: String,
    /// Whether to follow redirects.
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_retries: 3,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            follow_redirects: true,
        }
    }
}

/// HTTP client with retry and backoff.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }

    /// Fetch a page body with automatic retry and exponential backoff.
    pub async fn fetch_html_string(&self, url: &str) -> Result<String> {
        let mut last_error = None;

        for attempt in 1..=self.config.max_retries {
            match self.fetch_once(url).await {
                Ok(body) => {
                    debug!("fetched {url} on attempt {attempt}");
                    return Ok(body);
                }
                Err(e) => {
                    warn!("attempt {attempt} failed for {url}: {e}");
                    last_error = Some(e);
                    if attempt < self.config.max_retries {
                        let delay = 2_u64.pow(attempt - 1);
                        sleep(Duration::from_secs(delay)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow!("Unknown error while fetching {url}")))
    }

    /// Parse a fetched body into a queryable document (non-async).
    pub fn parse_html(&self, body: &str) -> Html {
        Html::parse_document(body)
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("HTTP request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP error {status}: {url}"));
        }

        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response body: {}", e))?;

        if body.is_empty() {
            return Err(anyhow!("Empty response from {url}"));
        }

        Ok(body)
    }
}
