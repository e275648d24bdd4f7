//! Generic worker pool
//!
//! This module contains the job-processing engine the crawler runs on:
//! - The [`Job`] trait describing one unit of work and its result
//! - [`WorkerPool`], which runs jobs on a fixed number of workers
//! - Submission tracking used for the two-phase shutdown

mod tracker;
mod worker_pool;

pub use tracker::{SubmissionTicket, SubmissionTracker};
pub use worker_pool::{WorkerPool, JOB_QUEUE_CAPACITY, RESULT_QUEUE_CAPACITY};

use async_trait::async_trait;
use thiserror::Error;

/// One unit of work processed by exactly one worker
///
/// A job produces exactly one `Output`. If `process` panics, the worker
/// catches the panic and publishes `on_panic(message)` instead, so every
/// accepted job still yields one result.
#[async_trait]
pub trait Job: Send + Sync + 'static {
    /// The result published for this job
    type Output: Send + 'static;

    /// Processes the job
    async fn process(&self) -> Self::Output;

    /// Builds the result reported when `process` panicked
    fn on_panic(&self, message: String) -> Self::Output;
}

/// Lifecycle of a [`WorkerPool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolState {
    /// Constructed; no worker is running
    Created,
    /// Workers are running and jobs are accepted
    Running,
    /// `end_jobs` was called; queued work is still being flushed
    Draining,
    /// Every worker exited and the result channel is closed
    Closed,
}

/// Worker pool misuse errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("worker pool is already running")]
    AlreadyRunning,

    #[error("worker pool has not been started")]
    NotRunning,

    #[error("no more jobs are accepted after end_jobs")]
    JobsEnded,

    #[error("results channel was already taken")]
    ResultsTaken,
}
