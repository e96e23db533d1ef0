use serde::Deserialize;

/// Main configuration structure for the engine
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub auth: AuthConfig,
}

/// Crawl and scrape execution bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Default job deadline offset when the client omits a timeout
    #[serde(rename = "default-timeout-ms")]
    pub default_timeout_ms: u64,

    /// Default wait bound for synchronous single-page scrapes
    #[serde(rename = "scrape-timeout-ms")]
    pub scrape_timeout_ms: u64,

    /// Page limit applied when the client omits one; never unbounded
    #[serde(rename = "default-page-limit")]
    pub default_page_limit: usize,

    /// Hard ceiling on the per-job page limit
    #[serde(rename = "max-page-limit")]
    pub max_page_limit: usize,

    /// Concurrent page fetches per job
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: usize,

    /// Per-request HTTP timeout
    #[serde(rename = "fetch-timeout-ms")]
    pub fetch_timeout_ms: u64,

    /// Result URLs fetched per search when the client omits a limit
    #[serde(rename = "search-result-limit")]
    pub search_result_limit: usize,

    /// Bound on the whole search aggregation
    #[serde(rename = "search-timeout-ms")]
    pub search_timeout_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: 600_000,
            scrape_timeout_ms: 30_000,
            default_page_limit: 100,
            max_page_limit: 1_000,
            max_concurrent_fetches: 8,
            fetch_timeout_ms: 30_000,
            search_result_limit: 5,
            search_timeout_ms: 60_000,
        }
    }
}

/// Identification sent with every outbound request
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    #[serde(rename = "service-name")]
    pub service_name: String,

    #[serde(rename = "service-version")]
    pub service_version: String,

    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            service_name: "Smolder".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/bot".to_string(),
        }
    }
}

/// API key table for the in-memory auth service
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub keys: Vec<ApiKeyEntry>,
}

/// One registered API key, stored as a SHA-256 hex digest
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeyEntry {
    #[serde(rename = "key-hash")]
    pub key_hash: String,

    pub tier: String,

    #[serde(default)]
    pub credits: i64,
}
