//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - Bounding concurrent requests with the [`RateLimiter`]
//! - Status and Content-Type checks
//! - Turning every failure into a non-fatal [`FetchError`]

use crate::config::CrawlSettings;
use crate::crawler::parser::parse_page;
use crate::crawler::rate_limiter::RateLimiter;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Non-fatal problem encountered while crawling one page
///
/// These never stop a crawl; they are logged and the page is treated as
/// having no (or fewer) children.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("failed to parse the URL to fetch: {url} ({reason})")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to GET {url}: {reason}")]
    Request { url: String, reason: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("failed to GET {url}: status {status}")]
    Status { url: String, status: u16 },

    #[error("content type of {url} is {content_type}")]
    ContentType { url: String, content_type: String },

    #[error("failed to read body of {url}: {reason}")]
    Body { url: String, reason: String },

    #[error("<a> detected on {url} but no href present")]
    MissingHref { url: String },

    #[error("failed to parse link {href} found on {url}: {reason}")]
    InvalidLink {
        url: String,
        href: String,
        reason: String,
    },

    #[error("processing {url} panicked: {message}")]
    Panicked { url: String, message: String },
}

/// What a fetch produced: same-domain child URLs plus non-fatal errors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    pub children: Vec<String>,
    pub errors: Vec<FetchError>,
}

impl FetchOutcome {
    /// An outcome with children and no errors
    pub fn with_children(children: Vec<String>) -> Self {
        Self {
            children,
            errors: Vec::new(),
        }
    }

    /// An outcome with no children and a single error
    pub fn failed(error: FetchError) -> Self {
        Self {
            children: Vec::new(),
            errors: vec![error],
        }
    }
}

/// Source of child links for a page
///
/// Implementations are shared by every worker, so they must be safe to call
/// concurrently. A fetch never fails outright: problems are reported in
/// [`FetchOutcome::errors`] and the page simply yields no children.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use domain_walker::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("domain-walker/1.0", Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP and extracts their same-domain links
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    limiter: RateLimiter,
}

impl HttpFetcher {
    /// Creates a fetcher from the crawl settings
    ///
    /// Uses `timeout_seconds` for every request and allows at most
    /// `rate_limit` requests in flight.
    pub fn new(settings: &CrawlSettings) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&settings.user_agent, settings.timeout())?;
        Ok(Self::with_client(client, RateLimiter::new(settings.rate_limit)))
    }

    /// Creates a fetcher from an existing client and limiter
    pub fn with_client(client: Client, limiter: RateLimiter) -> Self {
        Self { client, limiter }
    }

    /// The limiter guarding this fetcher's requests
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Downloads an HTML page body and the URL it was served from
    ///
    /// The returned URL is where the client ended up after following
    /// redirects; relative links on the page resolve against it.
    ///
    /// # Request Flow
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Timeout | `FetchError::Timeout` |
    /// | Connection or other transport failure | `FetchError::Request` |
    /// | Non-2xx status | `FetchError::Status` |
    /// | Content-Type without `text/html` | `FetchError::ContentType` |
    /// | Body read failure | `FetchError::Body` |
    ///
    /// The rate permit is held until the body has been read.
    async fn download(&self, url: &Url) -> Result<(String, Url), FetchError> {
        let _permit = self.limiter.acquire().await;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let final_url = response.url().clone();
        if final_url != *url {
            tracing::debug!("{} redirected to {}", url, final_url);
        }

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("text/html") {
            return Err(FetchError::ContentType {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        Ok((body, final_url))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        let page_url = match Url::parse(url) {
            Ok(page_url) => page_url,
            Err(e) => {
                return FetchOutcome::failed(FetchError::InvalidUrl {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        let (body, final_url) = match self.download(&page_url).await {
            Ok(downloaded) => downloaded,
            Err(e) => {
                tracing::debug!("Fetch of {} failed: {}", url, e);
                return FetchOutcome::failed(e);
            }
        };

        let parsed = parse_page(&body, &final_url);
        tracing::debug!(
            "Fetched {} ({}): {} links, {} link errors",
            url,
            parsed.title.as_deref().unwrap_or("untitled"),
            parsed.links.len(),
            parsed.errors.len()
        );

        FetchOutcome {
            children: parsed.links,
            errors: parsed.errors,
        }
    }
}

fn classify_request_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}
