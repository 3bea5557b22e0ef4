//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the user agent, timeout and proxy settings
//! - GET requests for HTML pages and listing API JSON
//! - Retry logic for transient failures
//! - Error classification

use crate::config::{CrawlerConfig, ProxyConfig, UserAgentConfig};
use crate::FetchError;
use reqwest::{Client, Proxy, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// A fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - Timeout settings
/// * `proxy` - Optional proxy every request is routed through
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
    proxy: Option<&ProxyConfig>,
) -> Result<Client, FetchError> {
    let mut builder = Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy_config) = proxy {
        let mut proxy = Proxy::all(proxy_config.url.as_str()).map_err(FetchError::Client)?;
        if let Some(username) = &proxy_config.username {
            proxy = proxy.basic_auth(username, proxy_config.password.as_deref().unwrap_or(""));
        }
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(FetchError::Client)
}

/// HTTP fetch layer shared by every handler
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Success |
/// | HTTP 5xx | Retry up to `max-retries` times, `retry-delay-ms` apart |
/// | Timeout | Retry up to `max-retries` times, `retry-delay-ms` apart |
/// | Other HTTP status | Immediate failure |
/// | Connection refused, TLS error | Immediate failure |
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(client: Client, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            max_retries,
            retry_delay,
        }
    }

    /// Builds the client from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
        proxy: Option<&ProxyConfig>,
    ) -> Result<Self, FetchError> {
        let client = build_http_client(user_agent, crawler, proxy)?;
        Ok(Self::new(
            client,
            crawler.max_retries,
            Duration::from_millis(crawler.retry_delay_ms),
        ))
    }

    /// Fetches an HTML page
    pub async fn fetch_html(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self.get_with_retry(url).await?;
        let final_url = response.url().clone();

        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(FetchedPage { final_url, body })
    }

    /// Fetches and decodes a JSON document
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let response = self.get_with_retry(url).await?;
        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Sends a GET, retrying 5xx responses and timeouts
    async fn get_with_retry(&self, url: &Url) -> Result<Response, FetchError> {
        let mut attempt = 0;

        loop {
            let result = match self.client.get(url.clone()).send().await {
                Ok(response) => check_status(url, response),
                Err(e) => Err(classify_error(url, e)),
            };

            match result {
                Err(e) if is_retryable(&e) && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::debug!(
                        "Retrying {} ({}/{}) after error: {}",
                        url,
                        attempt,
                        self.max_retries,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                other => return other,
            }
        }
    }
}

fn check_status(url: &Url, response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

fn is_retryable(error: &FetchError) -> bool {
    match error {
        FetchError::Timeout { .. } => true,
        FetchError::Status { status, .. } => StatusCode::from_u16(*status)
            .map(|s| s.is_server_error())
            .unwrap_or(false),
        _ => false,
    }
}
