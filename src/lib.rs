//! Domain-Walker: a concurrent single-domain crawler
//!
//! This crate walks every page reachable from a seed URL inside one domain,
//! visiting each page exactly once. Pages are fetched by a fixed-size worker
//! pool while a single coordinator routine owns the crawl frontier and
//! decides when the traversal is finished.

pub mod config;
pub mod crawler;
pub mod pool;
pub mod url;

use thiserror::Error;

/// Main error type for Domain-Walker operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Worker pool error: {0}")]
    Pool(#[from] pool::PoolError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
}

/// URL-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Domain-Walker operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlSettings};
pub use crawler::{Coordinator, CrawlLogger, CrawlSummary, Fetcher, HttpFetcher};
pub use pool::{Job, PoolState, WorkerPool};
pub use crate::url::{extract_domain, normalize_link, normalize_seed, same_domain};
