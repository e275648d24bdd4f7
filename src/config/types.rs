use serde::Deserialize;
use std::time::Duration;

/// Default number of crawl workers
pub const DEFAULT_WORKERS: usize = 4;

/// Default number of fetches allowed in flight at once
pub const DEFAULT_RATE_LIMIT: usize = 4;

/// Default per-fetch timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Main configuration structure for Domain-Walker
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlSettings,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// Number of workers pulling jobs from the pool
    #[serde(rename = "nworkers", default = "default_workers")]
    pub n_workers: usize,

    /// Maximum number of HTTP requests in flight at the same time
    #[serde(rename = "ratelimit", default = "default_rate_limit")]
    pub rate_limit: usize,

    /// Per-fetch timeout (seconds)
    #[serde(rename = "timeout-seconds", default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// The domain to crawl, as an absolute URL
    #[serde(default)]
    pub domain: String,

    /// Optional cap on the number of pages admitted to the frontier
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<usize>,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl CrawlSettings {
    /// Per-fetch timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            n_workers: DEFAULT_WORKERS,
            rate_limit: DEFAULT_RATE_LIMIT,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            domain: String::new(),
            max_pages: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_rate_limit() -> usize {
    DEFAULT_RATE_LIMIT
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_user_agent() -> String {
    format!("domain-walker/{}", env!("CARGO_PKG_VERSION"))
}
