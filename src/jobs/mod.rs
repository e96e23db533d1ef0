//! Job model and concurrent-safe job storage
//!
//! The store is the single shared mutable resource in the engine: workers
//! append pages through it while status reads race the deadline against
//! worker completion. All transitions out of `Active` are first-writer-wins.

mod job;
mod store;

pub use job::{Job, JobOutcome, JobStatus, JobView, PageResult};
pub use store::JobStore;
