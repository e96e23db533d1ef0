//! Page fetching
//!
//! [`PageFetcher`] is the seam between the execution engine and the network:
//! workers and the search path call it, everything else treats its output as
//! opaque extracted content. [`HttpFetcher`] is the shipped implementation
//! built on reqwest plus the extraction pipeline.

use crate::config::UserAgentConfig;
use crate::extract::{extract_page, ExtractedPage};
use crate::jobs::PageResult;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors a single page fetch can produce
///
/// These are recovered locally by the crawl worker; only a frontier where
/// every fetch fails surfaces to the client.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}")]
    Connect { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML for {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },
}

/// A successfully fetched and extracted page
#[derive(Debug)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,

    /// Extraction output, including discovered links
    pub extracted: ExtractedPage,
}

impl FetchedPage {
    /// Converts into the immutable result appended to a job
    pub fn into_page_result(self) -> PageResult {
        PageResult {
            url: self.final_url.to_string(),
            content: self.extracted.content,
            markdown: self.extracted.markdown,
            metadata: self.extracted.metadata,
        }
    }
}

/// Capability to fetch and extract one page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Builds the HTTP client the default fetcher uses
///
/// User agent format: `ServiceName/Version (+ContactURL)`.
pub fn build_http_client(
    config: &UserAgentConfig,
    fetch_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{})",
        config.service_name, config.service_version, config.contact_url
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(fetch_timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Default fetcher: GET, require an HTML content type, extract
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &UserAgentConfig, fetch_timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, fetch_timeout)?,
        })
    }

    /// Wraps an existing client, e.g. one shared across engines
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let url_str = url.to_string();

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_request_error(&url_str, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url_str,
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
            return Err(FetchError::ContentMismatch {
                url: url_str,
                content_type,
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Http {
            url: url_str,
            source: e,
        })?;

        tracing::debug!(url = %final_url, bytes = body.len(), "fetched page");

        Ok(FetchedPage {
            extracted: extract_page(&body, &final_url),
            final_url,
        })
    }
}

fn classify_request_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
