//! Crawl worker
//!
//! A worker owns nothing but a job id: all job state flows through the
//! store's synchronized operations, so a worker that outlives its job's
//! deadline simply has its appends and finalize rejected.
//!
//! Frontier discipline: FIFO over normalized URLs, deduplicated, restricted
//! to the seed's host, policy-filtered before insertion. Fetch fan-out is
//! bounded by a semaphore; pages land in completion order.

use crate::crawler::PageFetcher;
use crate::jobs::{JobOutcome, JobStore};
use crate::url::{check_url, extract_domain, normalize_url};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;
use uuid::Uuid;

pub(crate) struct CrawlWorker {
    store: Arc<JobStore>,
    fetcher: Arc<dyn PageFetcher>,
    max_concurrent: usize,
    count_failures: bool,
}

impl CrawlWorker {
    pub(crate) fn new(
        store: Arc<JobStore>,
        fetcher: Arc<dyn PageFetcher>,
        max_concurrent: usize,
        count_failures: bool,
    ) -> Self {
        Self {
            store,
            fetcher,
            max_concurrent: max_concurrent.max(1),
            count_failures,
        }
    }

    /// Expands the frontier from `seed` until it is exhausted, the page
    /// limit is reached, or the job leaves `Active` underneath us
    ///
    /// The seed must already be normalized and policy-checked by the
    /// orchestrator.
    pub(crate) async fn run(self, job_id: Uuid, seed: Url, limit: usize) {
        let seed_host = extract_domain(&seed).unwrap_or_default();

        let mut frontier: VecDeque<Url> = VecDeque::new();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(seed.to_string());
        frontier.push_back(seed);

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut in_flight = JoinSet::new();

        let mut appended = 0usize;
        let mut failed = 0usize;

        loop {
            if self.store.is_terminal(&job_id).unwrap_or(true) {
                tracing::debug!(job_id = %job_id, "job already terminal, worker stopping");
                return;
            }

            // Schedule fetches while budget and fan-out capacity remain.
            while in_flight.len() < self.max_concurrent {
                let spent = if self.count_failures {
                    appended + failed
                } else {
                    appended
                };
                if spent + in_flight.len() >= limit {
                    break;
                }
                let url = match frontier.pop_front() {
                    Some(u) => u,
                    None => break,
                };
                let fetcher = Arc::clone(&self.fetcher);
                let semaphore = Arc::clone(&semaphore);
                in_flight.spawn(async move {
                    // The semaphore is never closed; hold the permit for the
                    // duration of the fetch.
                    let _permit = semaphore.acquire_owned().await.ok();
                    fetcher.fetch(&url).await
                });
            }

            let joined = match in_flight.join_next().await {
                Some(j) => j,
                None => break,
            };

            match joined {
                Ok(Ok(fetched)) => {
                    let links = fetched.extracted.links.clone();
                    let page = fetched.into_page_result();
                    let page_url = page.url.clone();

                    if self.store.append_page(&job_id, page) {
                        appended += 1;
                        tracing::debug!(job_id = %job_id, url = %page_url, pages = appended, "page appended");
                    } else if self.store.is_terminal(&job_id).unwrap_or(true) {
                        // Lost the race to a timeout; nothing left to do.
                        return;
                    } else {
                        // Job is full.
                        break;
                    }

                    if appended >= limit {
                        break;
                    }

                    self.expand_frontier(&links, &seed_host, &mut visited, &mut frontier);
                }
                Ok(Err(error)) => {
                    failed += 1;
                    tracing::warn!(job_id = %job_id, error = %error, "page fetch failed, continuing");
                }
                Err(join_error) => {
                    failed += 1;
                    tracing::error!(job_id = %job_id, error = %join_error, "fetch task aborted");
                }
            }
        }

        // Anything still in flight is past the budget; its append would be
        // rejected anyway.
        in_flight.abort_all();

        if appended == 0 {
            let message = format!("all {} page fetches failed", failed);
            if self.store.finalize(&job_id, JobOutcome::Failed, Some(message)) {
                tracing::info!(job_id = %job_id, failed, "crawl failed, no usable pages");
            }
        } else if self
            .store
            .finalize(&job_id, JobOutcome::Completed, None)
        {
            tracing::info!(job_id = %job_id, pages = appended, failed, "crawl completed");
        }
    }

    /// Policy-filters and deduplicates discovered links into the frontier
    ///
    /// Blocked and offsite URLs are dropped silently; dropping is never a
    /// job failure.
    fn expand_frontier(
        &self,
        links: &[String],
        seed_host: &str,
        visited: &mut HashSet<String>,
        frontier: &mut VecDeque<Url>,
    ) {
        for link in links {
            let normalized = match normalize_url(link) {
                Ok(u) => u,
                Err(_) => continue,
            };
            if extract_domain(&normalized).as_deref() != Some(seed_host) {
                continue;
            }
            if !check_url(&normalized).allowed {
                tracing::debug!(url = %normalized, "discovered URL dropped by policy");
                continue;
            }
            if visited.insert(normalized.to_string()) {
                frontier.push_back(normalized);
            }
        }
    }
}
