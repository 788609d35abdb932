//! HTTP client for fetching search result pages
//!
//! Sends a realistic browser header profile, applies a per-request timeout
//! and classifies HTTP 403 as a block so the extractor can degrade instead
//! of failing.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder, StatusCode};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::infrastructure::config::ScraperConfig;

/// Transport failures for a single page fetch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Access denied as automated traffic
    #[error("request blocked with HTTP {status}: {url}")]
    Blocked { status: u16, url: String },

    #[error("HTTP error {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("HTTP request failed for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Failed to build HTTP client: {message}")]
    Client { message: String },
}

impl FetchError {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// Classify a non-success status
    pub fn from_status(status: StatusCode, url: &str) -> Self {
        if status == StatusCode::FORBIDDEN {
            Self::Blocked {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else {
            Self::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            }
        }
    }
}

/// Fetches one document body
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError>;
}

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl HttpClientConfig {
    pub fn from_scraper_config(scraper: &ScraperConfig) -> Self {
        Self {
            timeout: scraper.request_timeout(),
            max_redirects: scraper.max_redirects,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_scraper_config(&ScraperConfig::default())
    }
}

/// reqwest-backed page fetcher
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn with_config(config: HttpClientConfig) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .default_headers(browser_headers())
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| FetchError::Client { message: e.to_string() })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchError> {
        info!("🌐 HTTP GET: {}", url);

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!("⚠️ Network error for {}: {}", url, e);
            FetchError::Network {
                url: url.to_string(),
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error = FetchError::from_status(status, url.as_str());
            if error.is_blocked() {
                warn!("🚫 Request blocked ({}): {}", status, url);
            } else {
                error!("❌ HTTP error {}: {}", status, url);
            }
            return Err(error);
        }

        let body = response.text().await.map_err(|e| FetchError::Network {
            url: url.to_string(),
            message: format!("Failed to read response body: {e}"),
        })?;

        // An empty page parses to zero records like any other page without results
        if body.is_empty() {
            warn!("Empty response body from {}", url);
        }

        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

/// Header profile of a current desktop Chrome
fn browser_headers() -> HeaderMap {
    const PROFILE: &[(&str, &str)] = &[
        (
            "user-agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
        ),
        (
            "accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
        ),
        ("accept-language", "en-US,en;q=0.9"),
        ("cache-control", "max-age=0"),
        ("sec-ch-ua", "\"Not A(Brand\";v=\"99\", \"Google Chrome\";v=\"121\", \"Chromium\";v=\"121\""),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "none"),
        ("sec-fetch-user", "?1"),
        ("upgrade-insecure-requests", "1"),
    ];

    let mut headers = HeaderMap::new();
    for &(name, value) in PROFILE {
        headers.insert(name, HeaderValue::from_static(value));
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port
    async fn serve_once(response: &'static [u8]) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            socket.write_all(response).await.unwrap();
            let _ = socket.shutdown().await;
        });
        Url::parse(&format!("http://{addr}/search?q=x&type=users&p=1")).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = HttpClient::with_config(HttpClientConfig::default());
        assert!(client.is_ok());
        assert_eq!(client.unwrap().config().timeout, Duration::from_secs(15));
    }

    #[test]
    fn forbidden_is_classified_as_blocked() {
        let error = FetchError::from_status(StatusCode::FORBIDDEN, "https://github.com/search");
        assert!(error.is_blocked());
        assert_eq!(
            error,
            FetchError::Blocked { status: 403, url: "https://github.com/search".to_string() }
        );
    }

    #[test]
    fn other_statuses_are_not_blocks() {
        for status in [StatusCode::TOO_MANY_REQUESTS, StatusCode::NOT_FOUND, StatusCode::BAD_GATEWAY] {
            assert!(!FetchError::from_status(status, "https://github.com").is_blocked());
        }
    }

    #[test]
    fn header_profile_looks_like_a_browser() {
        let headers = browser_headers();
        assert!(headers[header::USER_AGENT].to_str().unwrap().starts_with("Mozilla/5.0"));
        assert_eq!(headers["sec-fetch-mode"], "navigate");
        assert_eq!(headers[header::ACCEPT_LANGUAGE], "en-US,en;q=0.9");
    }

    #[tokio::test]
    async fn empty_success_body_is_returned_as_empty_page() {
        let url = serve_once(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").await;
        let client = HttpClient::with_config(HttpClientConfig::default()).unwrap();

        assert_eq!(client.fetch_page(&url).await.unwrap(), "");
    }

    #[tokio::test]
    async fn forbidden_response_is_blocked() {
        let url = serve_once(b"HTTP/1.1 403 Forbidden\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").await;
        let client = HttpClient::with_config(HttpClientConfig::default()).unwrap();

        let error = client.fetch_page(&url).await.unwrap_err();
        assert!(matches!(error, FetchError::Blocked { status: 403, .. }));
    }
}
