//! Crawl jobs run on the worker pool

use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::pool::Job;
use async_trait::async_trait;
use std::sync::Arc;

/// Crawl one URL
pub struct CrawlJob {
    url: String,
    fetcher: Arc<dyn Fetcher>,
}

/// Outcome of one [`CrawlJob`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    /// The URL that was crawled
    pub source_url: String,

    /// Same-domain links found on the page
    pub children: Vec<String>,

    /// Non-fatal problems hit while crawling the page
    pub errors: Vec<FetchError>,
}

impl CrawlJob {
    pub fn new(url: String, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { url, fetcher }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Job for CrawlJob {
    type Output = CrawlResult;

    async fn process(&self) -> CrawlResult {
        tracing::debug!("Crawling {}", self.url);
        let outcome = self.fetcher.fetch(&self.url).await;

        CrawlResult {
            source_url: self.url.clone(),
            children: outcome.children,
            errors: outcome.errors,
        }
    }

    fn on_panic(&self, message: String) -> CrawlResult {
        CrawlResult {
            source_url: self.url.clone(),
            children: Vec::new(),
            errors: vec![FetchError::Panicked {
                url: self.url.clone(),
                message,
            }],
        }
    }
}
