//! Smolder: a web scrape-and-crawl service engine
//!
//! This crate implements the execution core of a scraping service: clients
//! submit a single URL or a crawl root, the engine fetches pages, extracts
//! normalized content/markdown/metadata, and returns results either
//! synchronously (scrape, search) or asynchronously via a polled job
//! (crawl, preview-crawl).

pub mod auth;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod jobs;
pub mod url;

use thiserror::Error;

/// Main error type for engine operations
///
/// Ordering matters at the service boundary: `Unauthorized` always surfaces
/// before `PolicyBlocked`, which surfaces before any job is created.
#[derive(Debug, Error)]
pub enum SmolderError {
    #[error("Unauthorized: missing or invalid credential")]
    Unauthorized,

    #[error("{reason}")]
    PolicyBlocked { reason: String },

    #[error("Job not found: {id}")]
    JobNotFound { id: String },

    #[error("Timeout exceeded")]
    TimeoutExceeded,

    #[error("Scrape failed for {url}: {message}")]
    ScrapeFailed { url: String, message: String },

    #[error("Search provider error: {0}")]
    Search(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, SmolderError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use auth::{Account, AuthService, Identity, PREVIEW_TOKEN};
pub use config::ServiceConfig;
pub use crawler::{CrawlerOptions, HttpFetcher, Orchestrator, PageFetcher, SearchProvider};
pub use jobs::{JobStatus, JobView, PageResult};
pub use url::{check_url, extract_domain, normalize_url, PolicyDecision};
