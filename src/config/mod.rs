//! Configuration module for Domain-Walker
//!
//! Settings can come from an optional TOML file and from command-line flags.
//! Either way the merged result goes through [`validate`] before a crawl is
//! started.
//!
//! # Example
//!
//! ```no_run
//! use domain_walker::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("walker.toml")).unwrap();
//! println!("Crawling {} with {} workers", config.crawler.domain, config.crawler.n_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlSettings, DEFAULT_RATE_LIMIT, DEFAULT_TIMEOUT_SECONDS, DEFAULT_WORKERS,
};

// Re-export parser functions
pub use parser::{load_config, parse_config, read_config};
pub use validation::{validate, validate_crawl_settings, validate_domain};
