//! Concurrent fetch limiter
//!
//! Caps how many outbound requests are in flight at once, independently of
//! how many workers the pool runs.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting semaphore bounding concurrent outbound fetches
#[derive(Debug, Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// A held fetch permit; returned to the limiter when dropped
#[derive(Debug)]
pub struct RatePermit {
    _permit: OwnedSemaphorePermit,
}

impl RateLimiter {
    /// Creates a limiter with `capacity` permits
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be positive");

        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a free permit and holds it until the returned guard is dropped
    ///
    /// Acquisition cannot fail: the semaphore is private to the limiter and
    /// is never closed.
    pub async fn acquire(&self) -> RatePermit {
        match Arc::clone(&self.semaphore).acquire_owned().await {
            Ok(permit) => RatePermit { _permit: permit },
            Err(_) => unreachable!("rate limiter semaphore is never closed"),
        }
    }

    /// Takes a permit only if one is free right now
    pub fn try_acquire(&self) -> Option<RatePermit> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .ok()
            .map(|permit| RatePermit { _permit: permit })
    }

    /// Total number of permits
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of permits not currently held
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl RatePermit {
    /// Returns the permit to the limiter
    pub fn release(self) {}
}
