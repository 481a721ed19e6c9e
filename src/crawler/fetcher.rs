//! HTTP fetcher implementation
//!
//! This module is the boundary to the network. The engine only sees the
//! [`PageFetcher`] trait; [`HttpFetcher`] implements it with reqwest:
//! - Building HTTP clients with the crawler's user agent
//! - Optional certificate/hostname validation bypass
//! - Reading the body of HTML pages only
//! - Reducing `Content-Type` to its media type

use crate::config::{Config, TlsConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Media type of crawlable pages
pub const HTML_MEDIA_TYPE: &str = "text/html";

/// Media type assumed when a response carries no `Content-Type`
const DEFAULT_MEDIA_TYPE: &str = "text/plain";

/// Response of a completed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,

    /// Lowercased media type, without parameters
    pub content_type: String,

    /// Page body (empty when the body was not worth reading)
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Returns true for 2xx status codes
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true if the page is HTML
    pub fn is_html(&self) -> bool {
        self.content_type == HTML_MEDIA_TYPE
    }
}

/// Errors raised when a page could not be retrieved at all
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("fetch of {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

/// Retrieves pages over the network
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`, following redirects
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        (**self).fetch(url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `tls` - TLS settings; `accept_invalid_certs` disables certificate and
///   hostname validation
/// * `timeout` - Overall request deadline
///
/// # Example
///
/// ```no_run
/// use link_spider::config::{TlsConfig, UserAgentConfig};
/// use link_spider::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(
///     &UserAgentConfig::default(),
///     &TlsConfig::default(),
///     Duration::from_secs(30),
/// )
/// .unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    tls: &TlsConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    if tls.accept_invalid_certs {
        tracing::warn!("TLS certificate and hostname validation is DISABLED");
    }

    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .danger_accept_invalid_certs(tls.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Reduces a `Content-Type` header value to its lowercased media type
///
/// A missing or empty header is treated as `text/plain`.
pub fn media_type(header: Option<&str>) -> String {
    let media = header
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if media.is_empty() {
        DEFAULT_MEDIA_TYPE.to_string()
    } else {
        media
    }
}

/// reqwest-backed [`PageFetcher`]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Wraps a client whose requests time out after `timeout`
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Builds the client described by the configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.crawler.fetch_timeout);
        let client = build_http_client(&config.user_agent, &config.tls, timeout)?;
        Ok(Self::new(client, timeout))
    }

    fn classify_error(&self, url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify_error(url, e))?;

        let status = response.status().as_u16();
        let content_type = media_type(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );

        // Only successful HTML bodies are stored or parsed
        let body = if (200..300).contains(&status) && content_type == HTML_MEDIA_TYPE {
            response
                .bytes()
                .await
                .map_err(|e| self.classify_error(url, e))?
                .to_vec()
        } else {
            Vec::new()
        };

        Ok(FetchResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(
            &UserAgentConfig::default(),
            &TlsConfig::default(),
            Duration::from_secs(5),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_insecure_client() {
        let tls = TlsConfig {
            accept_invalid_certs: true,
        };
        let client = build_http_client(&UserAgentConfig::default(), &tls, Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_media_type() {
        assert_eq!(media_type(Some("text/html")), "text/html");
        assert_eq!(media_type(Some("text/html; charset=utf-8")), "text/html");
        assert_eq!(media_type(Some("Text/HTML ;charset=UTF-8")), "text/html");
        assert_eq!(media_type(Some("application/pdf")), "application/pdf");
        assert_eq!(media_type(Some("")), "text/plain");
        assert_eq!(media_type(None), "text/plain");
    }

    #[test]
    fn test_response_predicates() {
        let response = FetchResponse {
            status: 200,
            content_type: "text/html".to_string(),
            body: Vec::new(),
        };
        assert!(response.is_success());
        assert!(response.is_html());

        let response = FetchResponse {
            status: 301,
            content_type: "application/pdf".to_string(),
            body: Vec::new(),
        };
        assert!(!response.is_success());
        assert!(!response.is_html());
    }
}
