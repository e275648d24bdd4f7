//! In-flight submission tracking
//!
//! Every `add_job` call hands its channel send to a detached task. The
//! tracker counts those tasks so `end_jobs` can wait until each promised job
//! has actually been enqueued before the job channel is closed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

struct TrackerInner {
    in_flight: AtomicUsize,
    idle: Notify,
}

/// Counts submissions whose channel send has not completed yet
#[derive(Clone)]
pub struct SubmissionTracker {
    inner: Arc<TrackerInner>,
}

/// Held by one submission task; dropping it marks the submission complete
pub struct SubmissionTicket {
    inner: Arc<TrackerInner>,
}

impl SubmissionTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TrackerInner {
                in_flight: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    /// Registers a new submission. Must be called before the send starts.
    pub fn begin(&self) -> SubmissionTicket {
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        SubmissionTicket {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of submissions still waiting on the channel
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Waits until no submission is in flight
    pub async fn wait_idle(&self) {
        loop {
            // Register interest before checking the counter so a ticket
            // dropped in between still wakes us.
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.in_flight() == 0 {
                return;
            }

            notified.await;
        }
    }
}

impl Default for SubmissionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SubmissionTicket {
    fn drop(&mut self) {
        if self.inner.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}
