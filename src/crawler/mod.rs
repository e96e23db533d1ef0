//! The execution engine: fetcher, crawl worker, orchestrator, search path
//!
//! The orchestrator is the public face: it enforces the auth-then-policy
//! ordering, creates jobs, starts workers, and answers status queries with
//! the lazy deadline check. Workers run as spawned tasks and interact with
//! job state only through the [`JobStore`](crate::jobs::JobStore).

mod fetcher;
mod orchestrator;
mod search;
mod worker;

pub use fetcher::{build_http_client, FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use orchestrator::Orchestrator;
pub use search::SearchProvider;

use serde::Deserialize;

/// Client-supplied options bounding a crawl job
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlerOptions {
    /// Maximum pages for the job; capped by the service maximum and
    /// defaulted from config when omitted
    pub limit: Option<usize>,

    /// Job deadline offset in milliseconds; service default when omitted
    pub timeout_ms: Option<u64>,

    /// When true, failed page fetches consume page budget instead of only
    /// being skipped
    pub count_failures_toward_limit: bool,
}

/// Client-supplied options for a single-page scrape
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScrapeOptions {
    /// How long the caller is willing to wait, in milliseconds
    pub timeout_ms: Option<u64>,
}

/// Client-supplied options for a search request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
    /// Maximum result URLs to fetch
    pub limit: Option<usize>,

    /// Bound on the whole search aggregation, in milliseconds
    pub timeout_ms: Option<u64>,
}
