use crate::config::types::{Config, CrawlSettings};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawl_settings(&config.crawler)
}

/// Validates crawler settings on their own
///
/// Every value the pool, the limiter and the HTTP client rely on is checked
/// here, so settings that pass can be handed to [`crate::crawler::crawl`].
pub fn validate_crawl_settings(settings: &CrawlSettings) -> ConfigResult<()> {
    if settings.n_workers < 1 {
        return Err(ConfigError::Validation(format!(
            "nworkers must be >= 1, got {}",
            settings.n_workers
        )));
    }

    if settings.rate_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "ratelimit must be >= 1, got {}",
            settings.rate_limit
        )));
    }

    if settings.timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1 second, got {}",
            settings.timeout_seconds
        )));
    }

    if let Some(max_pages) = settings.max_pages {
        if max_pages < 1 {
            return Err(ConfigError::Validation(format!(
                "max-pages must be >= 1 when set, got {}",
                max_pages
            )));
        }
    }

    if settings.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    validate_domain(&settings.domain)?;

    Ok(())
}

/// Validates the crawl domain: an absolute HTTP(S) URL with a host
pub fn validate_domain(domain: &str) -> ConfigResult<Url> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidDomain(
            "domain cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(domain)
        .map_err(|e| ConfigError::InvalidDomain(format!("'{}': {}", domain, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidDomain(format!(
            "'{}' must use the http or https scheme",
            domain
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidDomain(format!(
            "'{}' has no host",
            domain
        )));
    }

    Ok(url)
}
