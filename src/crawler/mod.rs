//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind a shared rate limiter
//! - HTML parsing and same-domain link extraction
//! - Crawl jobs for the worker pool
//! - Frontier tracking and termination in the coordinator

mod coordinator;
mod fetcher;
mod jobs;
mod logger;
mod parser;
mod rate_limiter;

pub use coordinator::{Coordinator, CrawlSummary};
pub use fetcher::{build_http_client, FetchError, FetchOutcome, Fetcher, HttpFetcher};
pub use jobs::{CrawlJob, CrawlResult};
pub use logger::{CrawlLogger, LoggedPage, RecordingLogger, SiteMapLogger};
pub use parser::{parse_page, ParsedPage};
pub use rate_limiter::{RateLimiter, RatePermit};

use crate::config::{validate_crawl_settings, CrawlSettings};
use crate::url::normalize_seed;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the settings
/// 2. Normalize the configured domain into the seed URL
/// 3. Build the HTTP fetcher and its rate limiter
/// 4. Crawl every reachable same-domain page, printing the site map to stdout
///
/// # Arguments
///
/// * `settings` - Crawl settings, checked with [`validate_crawl_settings`]
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl completed
/// * `Err(CrawlError)` - Invalid settings, or the seed or the HTTP client
///   could not be set up
pub async fn crawl(settings: &CrawlSettings) -> crate::Result<CrawlSummary> {
    validate_crawl_settings(settings)?;

    let seed = normalize_seed(&settings.domain)?;
    let fetcher = Arc::new(HttpFetcher::new(settings)?);

    let mut coordinator = Coordinator::from_settings(settings, fetcher, SiteMapLogger::stdout());
    coordinator.start(seed.to_string()).await
}
