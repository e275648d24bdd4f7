//! URL handling module for Domain-Walker
//!
//! This module turns seed strings and raw `href` values into the normalized
//! URL keys the crawl frontier deduplicates on, and decides whether two URLs
//! belong to the same domain.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, same_domain};
pub use normalize::{normalize_link, normalize_seed};
