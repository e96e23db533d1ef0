//! Job orchestrator
//!
//! The public engine surface. Every entry point enforces the same ordering:
//! authorization first, then the URL policy filter, then any resource
//! commitment. Job creation registers the job before spawning its worker
//! and returns the id immediately; status reads apply the lazy deadline
//! check and never wait on workers.

use crate::auth::{self, AuthService, Identity};
use crate::config::ServiceConfig;
use crate::crawler::worker::CrawlWorker;
use crate::crawler::{CrawlerOptions, PageFetcher, ScrapeOptions, SearchOptions, SearchProvider};
use crate::jobs::{Job, JobStatus, JobStore, JobView, PageResult};
use crate::url::{check_url, normalize_url};
use crate::{Result, SmolderError};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;
use uuid::Uuid;

/// The public-facing execution engine
pub struct Orchestrator {
    config: ServiceConfig,
    store: Arc<JobStore>,
    auth: Arc<dyn AuthService>,
    fetcher: Arc<dyn PageFetcher>,
    search: Option<Arc<dyn SearchProvider>>,
}

impl Orchestrator {
    pub fn new(
        config: ServiceConfig,
        auth: Arc<dyn AuthService>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        Self {
            config,
            store: Arc::new(JobStore::new()),
            auth,
            fetcher,
            search: None,
        }
    }

    pub fn with_search_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(provider);
        self
    }

    /// Fetches a single page synchronously, waiting up to the deadline
    ///
    /// Internally a crawl with an implicit frontier of size one; the
    /// deadline cutover is the same lazy transition a polled crawl gets.
    pub async fn scrape(
        &self,
        credential: Option<&str>,
        url: &str,
        options: &ScrapeOptions,
    ) -> Result<PageResult> {
        let (identity, url) = self.admit(credential, url, true).await?;
        let timeout_ms = options
            .timeout_ms
            .unwrap_or(self.config.crawler.scrape_timeout_ms);

        let id = self.spawn_job(&identity, url.clone(), 1, timeout_ms, false);
        tracing::debug!(job_id = %id, url = %url, timeout_ms, "scrape started");

        loop {
            let view = self
                .store
                .view(&id, Utc::now())
                .ok_or_else(|| SmolderError::JobNotFound { id: id.to_string() })?;
            match view.status {
                JobStatus::Active => tokio::time::sleep(Duration::from_millis(20)).await,
                JobStatus::TimedOut => return Err(SmolderError::TimeoutExceeded),
                JobStatus::Failed => {
                    return Err(SmolderError::ScrapeFailed {
                        url: url.to_string(),
                        message: view.error.unwrap_or_else(|| "fetch failed".to_string()),
                    })
                }
                JobStatus::Completed => {
                    return view.pages.into_iter().next().ok_or_else(|| {
                        SmolderError::ScrapeFailed {
                            url: url.to_string(),
                            message: "no page produced".to_string(),
                        }
                    })
                }
            }
        }
    }

    /// Creates a crawl job and returns its id without waiting on any fetch
    ///
    /// Requires a standard key; the preview tier must use
    /// [`create_preview_crawl`](Self::create_preview_crawl).
    pub async fn create_crawl(
        &self,
        credential: Option<&str>,
        url: &str,
        options: &CrawlerOptions,
    ) -> Result<Uuid> {
        let (identity, url) = self.admit(credential, url, false).await?;
        Ok(self.start_crawl(&identity, url, options))
    }

    /// Creates a crawl job under the reduced-capability preview tier
    pub async fn create_preview_crawl(
        &self,
        credential: Option<&str>,
        url: &str,
        options: &CrawlerOptions,
    ) -> Result<Uuid> {
        let (identity, url) = self.admit(credential, url, true).await?;
        Ok(self.start_crawl(&identity, url, options))
    }

    /// Reads a job's status, applying the deadline cutover if due
    ///
    /// Malformed and unknown ids are indistinguishable to the caller.
    pub async fn job_status(&self, credential: Option<&str>, job_id: &str) -> Result<JobView> {
        auth::classify(self.auth.as_ref(), credential).await?;

        let id = Uuid::parse_str(job_id).map_err(|_| SmolderError::JobNotFound {
            id: job_id.to_string(),
        })?;
        // Issued ids are always canonical hyphenated v4; anything else can
        // never name a job.
        if id.get_version_num() != 4 || !job_id.eq_ignore_ascii_case(&id.to_string()) {
            return Err(SmolderError::JobNotFound {
                id: job_id.to_string(),
            });
        }
        self.store
            .view(&id, Utc::now())
            .ok_or_else(|| SmolderError::JobNotFound {
                id: job_id.to_string(),
            })
    }

    /// Runs a search query and fetches each result URL, job-less
    ///
    /// Per-result fetch failures are skipped; the aggregation stops at the
    /// internal timeout and returns whatever completed.
    pub async fn search(
        &self,
        credential: Option<&str>,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<PageResult>> {
        auth::classify(self.auth.as_ref(), credential).await?;

        let provider = self
            .search
            .as_ref()
            .ok_or_else(|| SmolderError::Search("no search provider configured".to_string()))?;

        let mut urls = provider.query(query).await?;
        let limit = options
            .limit
            .unwrap_or(self.config.crawler.search_result_limit);
        urls.truncate(limit);
        tracing::debug!(query, results = urls.len(), "search query resolved");

        let timeout_ms = options
            .timeout_ms
            .unwrap_or(self.config.crawler.search_timeout_ms);
        let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);

        let semaphore = Arc::new(Semaphore::new(self.config.crawler.max_concurrent_fetches));
        let mut in_flight = JoinSet::new();
        for url in urls {
            if !check_url(&url).allowed {
                continue;
            }
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&semaphore);
            in_flight.spawn(async move {
                // The semaphore is never closed; hold the permit for the
                // duration of the fetch.
                let _permit = semaphore.acquire_owned().await.ok();
                fetcher.fetch(&url).await
            });
        }

        let mut pages = Vec::new();
        loop {
            match tokio::time::timeout_at(deadline, in_flight.join_next()).await {
                Ok(Some(Ok(Ok(fetched)))) => pages.push(fetched.into_page_result()),
                Ok(Some(Ok(Err(error)))) => {
                    tracing::warn!(error = %error, "search result fetch failed, skipping");
                }
                Ok(Some(Err(join_error))) => {
                    tracing::error!(error = %join_error, "search fetch task aborted");
                }
                Ok(None) => break,
                Err(_) => {
                    in_flight.abort_all();
                    tracing::warn!(query, "search timed out, returning partial results");
                    break;
                }
            }
        }

        Ok(pages)
    }

    /// Shared admission gate: authorization strictly before URL policy
    async fn admit(
        &self,
        credential: Option<&str>,
        url: &str,
        allow_preview: bool,
    ) -> Result<(Identity, Url)> {
        let identity = auth::classify(self.auth.as_ref(), credential).await?;
        if !allow_preview && identity.is_preview() {
            return Err(SmolderError::Unauthorized);
        }

        let url = normalize_url(url)?;
        let decision = check_url(&url);
        if !decision.allowed {
            return Err(SmolderError::PolicyBlocked {
                reason: decision
                    .reason
                    .unwrap_or_else(|| "URL blocked by policy".to_string()),
            });
        }

        Ok((identity, url))
    }

    fn start_crawl(&self, identity: &Identity, url: Url, options: &CrawlerOptions) -> Uuid {
        let limit = options
            .limit
            .unwrap_or(self.config.crawler.default_page_limit)
            .clamp(1, self.config.crawler.max_page_limit);
        let timeout_ms = options
            .timeout_ms
            .unwrap_or(self.config.crawler.default_timeout_ms);

        let id = self.spawn_job(
            identity,
            url.clone(),
            limit,
            timeout_ms,
            options.count_failures_toward_limit,
        );
        tracing::info!(
            job_id = %id,
            url = %url,
            limit,
            timeout_ms,
            tier = identity.tier_label(),
            "crawl job created"
        );
        id
    }

    /// Registers an active job and starts its worker in the background
    fn spawn_job(
        &self,
        identity: &Identity,
        url: Url,
        limit: usize,
        timeout_ms: u64,
        count_failures: bool,
    ) -> Uuid {
        let job = Job::new(identity.tier_label(), limit, timeout_ms);
        let id = self.store.insert(job);

        let worker = CrawlWorker::new(
            Arc::clone(&self.store),
            Arc::clone(&self.fetcher),
            self.config.crawler.max_concurrent_fetches,
            count_failures,
        );
        tokio::spawn(worker.run(id, url, limit));
        id
    }
}
