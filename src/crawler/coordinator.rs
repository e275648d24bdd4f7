//! Crawler coordinator - crawl frontier and termination logic
//!
//! The coordinator drives a [`WorkerPool`] of [`CrawlJob`]s:
//! - Seeding the pool with the start URL
//! - Consuming results and forwarding them to the logger
//! - Deduplicating discovered URLs against the frontier
//! - Submitting unseen URLs as new jobs
//! - Ending the pool once no URL is left unresolved
//!
//! The frontier and the pending count live on the routine that runs
//! [`Coordinator::start`] and are never shared, so they need no lock.

use crate::config::CrawlSettings;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::jobs::{CrawlJob, CrawlResult};
use crate::crawler::logger::CrawlLogger;
use crate::pool::WorkerPool;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Whether a discovered URL was admitted to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    /// First sighting; the URL must be submitted
    New,
    /// Already in the frontier
    Seen,
    /// Refused because the page cap is reached
    Capped,
}

/// URLs ever submitted during one crawl
#[derive(Debug, Default)]
struct Frontier {
    urls: HashSet<String>,
    max_pages: Option<usize>,
}

impl Frontier {
    fn new(max_pages: Option<usize>) -> Self {
        Self {
            urls: HashSet::new(),
            max_pages,
        }
    }

    fn admit(&mut self, url: &str) -> Admission {
        if self.urls.contains(url) {
            return Admission::Seen;
        }

        if self.max_pages.is_some_and(|max| self.urls.len() >= max) {
            return Admission::Capped;
        }

        self.urls.insert(url.to_string());
        Admission::New
    }

    fn len(&self) -> usize {
        self.urls.len()
    }
}

/// Statistics of a finished crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    /// Every URL submitted for crawling
    pub frontier: HashSet<String>,

    /// Number of results consumed from the pool
    pub results_consumed: usize,

    /// Number of `log_error` calls made
    pub errors_logged: usize,

    /// Discovered links refused by the page cap (repeats included)
    pub links_refused: usize,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlSummary {
    /// Number of distinct pages crawled
    pub fn pages_visited(&self) -> usize {
        self.frontier.len()
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<L: CrawlLogger> {
    fetcher: Arc<dyn Fetcher>,
    logger: L,
    n_workers: usize,
    max_pages: Option<usize>,
}

impl<L: CrawlLogger> Coordinator<L> {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `n_workers` - Number of pool workers (must be positive)
    /// * `fetcher` - Source of child links, shared by every worker
    /// * `logger` - Sink for page and error events
    pub fn new(n_workers: usize, fetcher: Arc<dyn Fetcher>, logger: L) -> Self {
        Self {
            fetcher,
            logger,
            n_workers,
            max_pages: None,
        }
    }

    /// Creates a coordinator using the worker count and page cap from `settings`
    pub fn from_settings(settings: &CrawlSettings, fetcher: Arc<dyn Fetcher>, logger: L) -> Self {
        Self::new(settings.n_workers, fetcher, logger).with_max_pages(settings.max_pages)
    }

    /// Limits how many distinct URLs may enter the frontier
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// The logger events were sent to
    pub fn logger(&self) -> &L {
        &self.logger
    }

    /// Consumes the coordinator, returning its logger
    pub fn into_logger(self) -> L {
        self.logger
    }

    /// Crawls everything reachable from `seed`
    ///
    /// The seed is used as-is as the first frontier key; callers normalize it
    /// beforehand (see [`crate::url::normalize_seed`]). Returns once the
    /// pool's result channel has closed.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - Crawl ran to completion
    /// * `Err(CrawlError)` - The worker pool was misused (an internal bug)
    pub async fn start(&mut self, seed: impl Into<String>) -> crate::Result<CrawlSummary> {
        let seed = seed.into();
        let start_time = Instant::now();

        let mut pool = WorkerPool::new(self.n_workers);
        let mut results = pool.results_channel()?;

        let mut frontier = Frontier::new(self.max_pages);
        let mut summary = CrawlSummary::default();

        frontier.admit(&seed);
        let mut pending: usize = 1;

        tracing::info!("Starting crawl of {} with {} workers", seed, self.n_workers);
        pool.run()?;
        pool.add_job(self.job(seed))?;

        while let Some(result) = results.recv().await {
            summary.results_consumed += 1;
            self.report(&result, &mut summary);

            for child in &result.children {
                match frontier.admit(child) {
                    Admission::New => {
                        pending += 1;
                        pool.add_job(self.job(child.clone()))?;
                    }
                    Admission::Seen => {}
                    Admission::Capped => {
                        summary.links_refused += 1;
                        tracing::trace!("Page cap reached, not crawling {}", child);
                    }
                }
            }

            pending -= 1;
            if pending == 0 {
                tracing::debug!("No pending pages left, ending jobs");
                pool.end_jobs().await?;
            }

            if summary.results_consumed % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages crawled, {} pending, {} discovered",
                    summary.results_consumed,
                    pending,
                    frontier.len()
                );
            }
        }

        summary.frontier = frontier.urls;
        summary.elapsed = start_time.elapsed();

        tracing::info!(
            "Crawl completed: {} pages crawled in {:?}",
            summary.results_consumed,
            summary.elapsed
        );

        Ok(summary)
    }

    fn job(&self, url: String) -> CrawlJob {
        CrawlJob::new(url, Arc::clone(&self.fetcher))
    }

    fn report(&mut self, result: &CrawlResult, summary: &mut CrawlSummary) {
        self.logger.log_page(&result.source_url, &result.children);

        for error in &result.errors {
            self.logger.log_error(&error.to_string());
            summary.errors_logged += 1;
        }
    }
}
