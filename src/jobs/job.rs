//! Job state definitions and the per-job record
//!
//! A job moves from `Active` into exactly one terminal state and never
//! leaves it. Pages are append-only while `Active` and frozen thereafter.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Status of a job in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Workers may still be fetching; pages can grow
    Active,

    /// Frontier exhausted or page limit reached with usable results
    Completed,

    /// Every attempted fetch failed; no usable result
    Failed,

    /// Deadline passed while still active; pages frozen as partial results
    TimedOut,
}

impl JobStatus {
    /// Terminal states admit no further transition
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Wire representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a worker reports the end of its run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Failed,
}

/// One extracted page, immutable once appended to a job
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageResult {
    pub url: String,
    pub content: String,
    pub markdown: String,
    pub metadata: HashMap<String, String>,
}

/// The central entity tracked by the [`JobStore`](super::JobStore)
///
/// Owned exclusively by the store; workers hold only the id and go through
/// the store's synchronized operations.
#[derive(Debug)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub tier: String,
    pub limit: usize,
    pub pages: Vec<PageResult>,
    pub error: Option<String>,
}

impl Job {
    /// Allocates a new active job with a freshly generated v4 id
    pub fn new(tier: &str, limit: usize, timeout_ms: u64) -> Self {
        let created_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Active,
            created_at,
            deadline: created_at + Duration::milliseconds(timeout_ms as i64),
            tier: tier.to_string(),
            limit,
            pages: Vec::new(),
            error: None,
        }
    }

    pub(crate) fn snapshot(&self) -> JobView {
        JobView {
            id: self.id,
            status: self.status,
            created_at: self.created_at,
            deadline: self.deadline,
            pages: self.pages.clone(),
            error: self.error.clone(),
        }
    }
}

/// Point-in-time view of a job returned by status reads
///
/// Views of terminal jobs are idempotent: repeated reads return identical
/// page content.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub id: Uuid,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub pages: Vec<PageResult>,
    pub error: Option<String>,
}
