//! Document fetching
//!
//! This module is the seam between the crawl core and whatever turns a URL
//! into a queryable document. The shipped implementation is a plain HTTP
//! client; a rendering/automation backend would implement the same [`Fetch`]
//! trait. The page-load timeout is the only bounded wait in the pipeline,
//! and its expiry surfaces as a [`FetchError::Timeout`].

mod document;

pub use document::{Block, Document};

use crate::config::{CrawlerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Expected HTML for {url}, got {content_type}")]
    NotHtml { url: String, content_type: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Turns a URL into a queryable document
///
/// The crawl core holds exactly one fetcher and issues one load at a time.
#[async_trait]
pub trait Fetch {
    async fn load(&self, url: &str) -> FetchResult<Document>;
}

/// HTTP-backed fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with the configured user agent and timeouts
    pub fn new(user_agent: &UserAgentConfig, crawler: &CrawlerConfig) -> FetchResult<Self> {
        let client = Client::builder()
            .user_agent(user_agent.header_value())
            .timeout(Duration::from_millis(crawler.page_load_timeout_ms))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn load(&self, url: &str) -> FetchResult<Document> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    return Err(FetchError::Timeout {
                        url: url.to_string(),
                    });
                }
                return Err(FetchError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty() && !content_type.contains("text/html") {
            return Err(FetchError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                if e.is_timeout() {
                    return Err(FetchError::Timeout {
                        url: url.to_string(),
                    });
                }
                return Err(FetchError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                });
            }
        };

        Ok(Document::parse(&body, url))
    }
}

impl FetchError {
    /// Whether this failure is a missing page rather than a transient fault
    pub fn is_gone(&self) -> bool {
        matches!(
            self,
            FetchError::Http {
                status,
                ..
            } if *status == StatusCode::NOT_FOUND.as_u16() || *status == StatusCode::GONE.as_u16()
        )
    }
}
