//! Bounded worker pool
//!
//! A fixed number of worker tasks pull jobs from a shared channel, process
//! them one at a time and publish each result on a second channel.
//!
//! # Lifecycle
//!
//! ```text
//! Created --run()--> Running --end_jobs()--> Draining --last worker exits--> Closed
//! ```
//!
//! Shutdown is two-phase: `end_jobs` first waits for every detached
//! submission spawned by `add_job` to finish its send, then closes the job
//! channel. Workers drain what is left and exit; the completion watcher then
//! closes the result channel. The watcher is the only task that can close it.

use crate::pool::tracker::SubmissionTracker;
use crate::pool::{Job, PoolError, PoolState};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Capacity of the pending-job channel
pub const JOB_QUEUE_CAPACITY: usize = 10;

/// Capacity of the result channel
pub const RESULT_QUEUE_CAPACITY: usize = 10;

type SharedReceiver<J> = Arc<tokio::sync::Mutex<mpsc::Receiver<J>>>;

/// Generic bounded-concurrency job engine
///
/// # Example
///
/// ```no_run
/// use async_trait::async_trait;
/// use domain_walker::pool::{Job, WorkerPool};
///
/// struct Square(u64);
///
/// #[async_trait]
/// impl Job for Square {
///     type Output = u64;
///
///     async fn process(&self) -> u64 {
///         self.0 * self.0
///     }
///
///     fn on_panic(&self, _message: String) -> u64 {
///         0
///     }
/// }
///
/// # async fn example() -> Result<(), domain_walker::pool::PoolError> {
/// let mut pool = WorkerPool::new(4);
/// let mut results = pool.results_channel()?;
/// pool.run()?;
///
/// for n in 0..10 {
///     pool.add_job(Square(n))?;
/// }
/// pool.end_jobs().await?;
///
/// while let Some(square) = results.recv().await {
///     println!("{}", square);
/// }
/// # Ok(())
/// # }
/// ```
pub struct WorkerPool<J: Job> {
    n_workers: usize,
    state: Arc<Mutex<PoolState>>,

    /// Sending half of the job channel; `None` once `end_jobs` was called
    job_tx: Mutex<Option<mpsc::Sender<J>>>,
    job_rx: Option<mpsc::Receiver<J>>,

    result_tx: Option<mpsc::Sender<J::Output>>,
    result_rx: Option<mpsc::Receiver<J::Output>>,

    submissions: SubmissionTracker,
}

impl<J: Job> WorkerPool<J> {
    /// Creates a pool with `n_workers` workers and the default queue capacities
    ///
    /// No worker is started until [`WorkerPool::run`] is called.
    ///
    /// # Panics
    ///
    /// Panics if `n_workers` is zero.
    pub fn new(n_workers: usize) -> Self {
        Self::with_capacity(n_workers, JOB_QUEUE_CAPACITY, RESULT_QUEUE_CAPACITY)
    }

    /// Creates a pool with explicit channel capacities
    ///
    /// # Panics
    ///
    /// Panics if `n_workers` or either capacity is zero.
    pub fn with_capacity(n_workers: usize, job_capacity: usize, result_capacity: usize) -> Self {
        assert!(n_workers > 0, "n_workers must be positive");

        let (job_tx, job_rx) = mpsc::channel(job_capacity);
        let (result_tx, result_rx) = mpsc::channel(result_capacity);

        Self {
            n_workers,
            state: Arc::new(Mutex::new(PoolState::Created)),
            job_tx: Mutex::new(Some(job_tx)),
            job_rx: Some(job_rx),
            result_tx: Some(result_tx),
            result_rx: Some(result_rx),
            submissions: SubmissionTracker::new(),
        }
    }

    /// Number of workers this pool runs
    pub fn n_workers(&self) -> usize {
        self.n_workers
    }

    /// Current lifecycle state
    pub fn state(&self) -> PoolState {
        *lock(&self.state)
    }

    /// Number of `add_job` sends that have not reached the job channel yet
    pub fn in_flight_submissions(&self) -> usize {
        self.submissions.in_flight()
    }

    /// Hands out the result channel
    ///
    /// The caller must drain it until it returns `None` to observe that the
    /// pool has finished. It can only be taken once.
    pub fn results_channel(&mut self) -> Result<mpsc::Receiver<J::Output>, PoolError> {
        self.result_rx.take().ok_or(PoolError::ResultsTaken)
    }

    /// Starts the workers and the completion watcher
    pub fn run(&mut self) -> Result<(), PoolError> {
        let (jobs, results) = match (self.job_rx.take(), self.result_tx.take()) {
            (Some(jobs), Some(results)) => (jobs, results),
            _ => return Err(PoolError::AlreadyRunning),
        };

        *lock(&self.state) = PoolState::Running;
        tracing::debug!("Starting worker pool with {} workers", self.n_workers);

        let jobs: SharedReceiver<J> = Arc::new(tokio::sync::Mutex::new(jobs));
        let mut workers = JoinSet::new();
        for id in 0..self.n_workers {
            workers.spawn(worker_loop(id, Arc::clone(&jobs), results.clone()));
        }

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            while let Some(joined) = workers.join_next().await {
                if let Err(e) = joined {
                    tracing::error!("Worker task terminated abnormally: {}", e);
                }
            }

            *lock(&state) = PoolState::Closed;
            // Last sender: dropping it closes the result channel.
            drop(results);
            tracing::debug!("All workers exited, result channel closed");
        });

        Ok(())
    }

    /// Enqueues a job without blocking the caller
    ///
    /// The channel send runs on a detached task so a full job queue never
    /// stalls the submitter. Fails once [`WorkerPool::end_jobs`] was called.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn add_job(&self, job: J) -> Result<(), PoolError> {
        let (sender, ticket) = {
            let guard = lock(&self.job_tx);
            let sender = guard.as_ref().ok_or(PoolError::JobsEnded)?.clone();
            // Registered while holding the lock so end_jobs cannot miss it.
            (sender, self.submissions.begin())
        };

        tokio::spawn(async move {
            if sender.send(job).await.is_err() {
                tracing::warn!("Job channel closed before a submission was delivered");
            }
            drop(ticket);
        });

        Ok(())
    }

    /// Declares that no further jobs will be added
    ///
    /// Waits for all in-flight submissions to land in the job channel, then
    /// closes it. Jobs already queued are still processed.
    pub async fn end_jobs(&self) -> Result<(), PoolError> {
        if self.state() == PoolState::Created {
            return Err(PoolError::NotRunning);
        }

        let sender = lock(&self.job_tx).take().ok_or(PoolError::JobsEnded)?;

        {
            let mut state = lock(&self.state);
            if *state == PoolState::Running {
                *state = PoolState::Draining;
            }
        }

        tracing::trace!(
            "Waiting for {} in-flight submissions before closing the job channel",
            self.submissions.in_flight()
        );
        self.submissions.wait_idle().await;

        drop(sender);
        tracing::debug!("Job channel closed");
        Ok(())
    }
}

/// Pulls jobs until the channel is closed and empty
async fn worker_loop<J: Job>(id: usize, jobs: SharedReceiver<J>, results: mpsc::Sender<J::Output>) {
    tracing::trace!("Worker {} started", id);

    loop {
        let job = {
            let mut receiver = jobs.lock().await;
            receiver.recv().await
        };

        let Some(job) = job else {
            break;
        };

        let output = run_job(id, &job).await;

        if results.send(output).await.is_err() {
            tracing::debug!("Worker {}: result receiver dropped, discarding result", id);
        }
    }

    tracing::trace!("Worker {} exiting", id);
}

/// Runs one job, turning a panic into the job's fault result
async fn run_job<J: Job>(worker_id: usize, job: &J) -> J::Output {
    match AssertUnwindSafe(job.process()).catch_unwind().await {
        Ok(output) => output,
        Err(payload) => {
            let message = panic_message(&*payload);
            tracing::warn!("Worker {}: job panicked: {}", worker_id, message);
            job.on_panic(message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
