//! Search provider seam
//!
//! Query execution lives outside the engine; the orchestrator only needs an
//! ordered sequence of result URLs, which it then fetches the same way a
//! crawl worker fetches frontier pages, without a persisted job.

use crate::Result;
use async_trait::async_trait;
use url::Url;

/// External search-engine backend
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Executes a query, returning result URLs in ranking order
    async fn query(&self, query: &str) -> Result<Vec<Url>>;
}
