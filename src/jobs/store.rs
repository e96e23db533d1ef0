//! Concurrent-safe keyed storage of job state
//!
//! One mutex per job record inside a read-locked map: status reads and
//! writes on one job never block operations on another. Every transition
//! out of `Active` happens under the job's own mutex, so a worker finalize
//! racing a deadline transition resolves to exactly one winner.

use crate::jobs::{Job, JobOutcome, JobStatus, JobView, PageResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

/// Keyed store of all jobs known to the engine
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<Uuid, Arc<Mutex<Job>>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a job; the id is assigned before the job becomes visible
    /// to any reader
    pub fn insert(&self, job: Job) -> Uuid {
        let id = job.id;
        let mut jobs = self.jobs.write().unwrap();
        jobs.insert(id, Arc::new(Mutex::new(job)));
        id
    }

    fn record(&self, id: &Uuid) -> Option<Arc<Mutex<Job>>> {
        let jobs = self.jobs.read().unwrap();
        jobs.get(id).cloned()
    }

    /// Appends a page if the job is still active and under its page limit
    ///
    /// Returns false (a silent no-op for the caller) when the job is
    /// unknown, already terminal, or full. Append order is completion
    /// order, not frontier order.
    pub fn append_page(&self, id: &Uuid, page: PageResult) -> bool {
        let record = match self.record(id) {
            Some(r) => r,
            None => return false,
        };
        let mut job = record.lock().unwrap();
        if job.status.is_terminal() || job.pages.len() >= job.limit {
            return false;
        }
        job.pages.push(page);
        true
    }

    /// Transitions `Active -> Completed | Failed`, first-writer-wins
    ///
    /// Returns whether this call performed the transition. A worker losing
    /// the race to a deadline transition gets false and must treat it as a
    /// no-op, never an error.
    pub fn finalize(&self, id: &Uuid, outcome: JobOutcome, error: Option<String>) -> bool {
        let record = match self.record(id) {
            Some(r) => r,
            None => return false,
        };
        let mut job = record.lock().unwrap();
        if job.status.is_terminal() {
            return false;
        }
        job.status = match outcome {
            JobOutcome::Completed => JobStatus::Completed,
            JobOutcome::Failed => JobStatus::Failed,
        };
        job.error = error;
        true
    }

    /// Returns a point-in-time view, applying the lazy deadline check
    ///
    /// If `now` has reached the deadline of a still-active job, the job is
    /// atomically transitioned to `TimedOut` under its own mutex, freezing
    /// the pages accumulated so far; the timed-out view is returned without
    /// waiting for in-flight workers.
    pub fn view(&self, id: &Uuid, now: DateTime<Utc>) -> Option<JobView> {
        let record = self.record(id)?;
        let mut job = record.lock().unwrap();
        if job.status == JobStatus::Active && now >= job.deadline {
            job.status = JobStatus::TimedOut;
            tracing::info!(job_id = %job.id, pages = job.pages.len(), "job timed out with partial results");
        }
        Some(job.snapshot())
    }

    /// Current page count, if the job exists
    pub fn page_count(&self, id: &Uuid) -> Option<usize> {
        let record = self.record(id)?;
        let job = record.lock().unwrap();
        Some(job.pages.len())
    }

    /// Whether the job has left `Active`
    pub fn is_terminal(&self, id: &Uuid) -> Option<bool> {
        let record = self.record(id)?;
        let job = record.lock().unwrap();
        Some(job.status.is_terminal())
    }

    /// Number of jobs currently tracked
    pub fn len(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().unwrap().is_empty()
    }
}
