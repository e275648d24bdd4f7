//! Integration tests for the crawler
//!
//! The scenario tests drive the coordinator with in-memory link graphs. The
//! HTTP tests use wiremock to create mock servers and exercise the fetcher
//! and the full crawl cycle end-to-end.

use async_trait::async_trait;
use domain_walker::config::CrawlSettings;
use domain_walker::{ConfigError, CrawlError};
use domain_walker::crawler::{
    build_http_client, crawl, Coordinator, FetchError, FetchOutcome, Fetcher, HttpFetcher,
    RateLimiter, RecordingLogger,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves a fixed link graph and counts how often each page is fetched
#[derive(Default)]
struct GraphFetcher {
    graph: HashMap<String, Vec<String>>,
    failures: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<HashMap<String, usize>>,
}

impl GraphFetcher {
    fn new() -> Self {
        Self::default()
    }

    fn edge(mut self, page: &str, links: &[&str]) -> Self {
        self.graph
            .insert(page.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }

    fn failing(mut self, page: &str) -> Self {
        self.failures.insert(page.to_string());
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn calls(&self) -> HashMap<String, usize> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for GraphFetcher {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failures.contains(url) {
            return FetchOutcome::failed(FetchError::Status {
                url: url.to_string(),
                status: 500,
            });
        }

        FetchOutcome::with_children(self.graph.get(url).cloned().unwrap_or_default())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// An HTML response
fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html")
}

fn test_settings(domain: &str) -> CrawlSettings {
    CrawlSettings {
        n_workers: 3,
        rate_limit: 2,
        timeout_seconds: 5,
        domain: domain.to_string(),
        ..CrawlSettings::default()
    }
}

#[tokio::test]
async fn test_cyclic_graph_visits_each_page_once() {
    let fetcher = Arc::new(
        GraphFetcher::new()
            .edge("A", &["B", "C"])
            .edge("B", &["C", "D"])
            .edge("C", &["A", "B", "E", "D"])
            .edge("D", &[])
            .edge("E", &[]),
    );
    let mut coordinator = Coordinator::new(10, fetcher.clone(), RecordingLogger::new());

    let summary = coordinator.start("A").await.expect("Crawl failed");

    let expected: HashSet<String> = strings(&["A", "B", "C", "D", "E"]).into_iter().collect();
    assert_eq!(summary.frontier, expected);
    assert_eq!(summary.results_consumed, 5);
    assert_eq!(summary.errors_logged, 0);

    let logger = coordinator.into_logger();
    assert_eq!(logger.pages.len(), 5);
    assert!(logger.errors.is_empty());
    assert_eq!(logger.pages_for("A")[0].children, strings(&["B", "C"]));
    assert_eq!(logger.pages_for("B")[0].children, strings(&["C", "D"]));
    assert_eq!(logger.pages_for("C")[0].children, strings(&["A", "B", "E", "D"]));
    assert!(logger.pages_for("D")[0].children.is_empty());
    assert!(logger.pages_for("E")[0].children.is_empty());

    assert!(fetcher.calls().values().all(|&count| count == 1));
}

#[tokio::test]
async fn test_failed_page_is_logged_and_crawl_finishes() {
    let fetcher = Arc::new(GraphFetcher::new().edge("A", &["B"]).failing("B"));
    let mut coordinator = Coordinator::new(2, fetcher, RecordingLogger::new());

    let summary = coordinator.start("A").await.expect("Crawl failed");

    assert_eq!(summary.results_consumed, 2);
    assert_eq!(summary.errors_logged, 1);
    assert_eq!(summary.pages_visited(), 2);

    let logger = coordinator.into_logger();
    assert_eq!(logger.pages.len(), 2);
    assert!(logger.pages_for("B")[0].children.is_empty());
    assert_eq!(logger.errors, vec!["failed to GET B: status 500".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_large_graph_exactly_once() {
    // Every page links to its successor plus a scatter of other pages.
    let mut fetcher = GraphFetcher::new().with_delay(Duration::from_millis(2));
    let names: Vec<String> = (0..60).map(|i| format!("p{}", i)).collect();
    for i in 0..60 {
        let links: Vec<&str> = [i + 1, i * 7 % 60, i * 13 % 60, 0]
            .iter()
            .filter(|&&j| j < 60)
            .map(|&j| names[j].as_str())
            .collect();
        fetcher = fetcher.edge(&names[i], &links);
    }
    let fetcher = Arc::new(fetcher);
    let mut coordinator = Coordinator::new(8, fetcher.clone(), RecordingLogger::new());

    let summary = tokio::time::timeout(Duration::from_secs(10), coordinator.start("p0"))
        .await
        .expect("Crawl did not terminate")
        .expect("Crawl failed");

    assert_eq!(summary.pages_visited(), 60);
    assert_eq!(summary.results_consumed, 60);

    let calls = fetcher.calls();
    assert_eq!(calls.len(), 60);
    assert!(calls.values().all(|&count| count == 1));
}

#[tokio::test]
async fn test_single_worker_crawl_terminates() {
    let fetcher = Arc::new(
        GraphFetcher::new()
            .edge("A", &["B", "C", "D"])
            .edge("B", &["A"])
            .edge("C", &["A", "D"]),
    );
    let mut coordinator = Coordinator::new(1, fetcher, RecordingLogger::new());

    let summary = tokio::time::timeout(Duration::from_secs(5), coordinator.start("A"))
        .await
        .expect("Crawl did not terminate")
        .expect("Crawl failed");

    assert_eq!(summary.pages_visited(), 4);
}

#[tokio::test]
async fn test_fetch_404_is_status_error() {
    let mock_server = MockServer::start().await;
    let fetcher = HttpFetcher::new(&test_settings(&mock_server.uri())).unwrap();

    // Nothing mounted: wiremock answers 404
    let url = format!("{}/missing", mock_server.uri());
    let outcome = fetcher.fetch(&url).await;

    assert!(outcome.children.is_empty());
    assert_eq!(
        outcome.errors,
        vec![FetchError::Status {
            url: url.clone(),
            status: 404,
        }]
    );
}

#[tokio::test]
async fn test_fetch_non_html_is_content_type_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&test_settings(&mock_server.uri())).unwrap();
    let outcome = fetcher
        .fetch(&format!("{}/report.pdf", mock_server.uri()))
        .await;

    assert!(outcome.children.is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert!(matches!(
        &outcome.errors[0],
        FetchError::ContentType { content_type, .. } if content_type.starts_with("application/pdf")
    ));
}

#[tokio::test]
async fn test_fetch_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("<html></html>").set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let client = build_http_client("TestWalker/1.0", Duration::from_millis(200)).unwrap();
    let fetcher = HttpFetcher::with_client(client, RateLimiter::new(1));
    let outcome = fetcher.fetch(&format!("{}/slow", mock_server.uri())).await;

    assert!(outcome.children.is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert!(matches!(outcome.errors[0], FetchError::Timeout { .. }));
    // The permit is returned even though the request failed.
    assert_eq!(fetcher.limiter().available(), 1);
}

#[tokio::test]
async fn test_fetch_extracts_same_domain_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><head><title>Home</title></head><body>
            <a href="/about?ref=home">About</a>
            <a href="https://elsewhere.test/">Elsewhere</a>
            <a>No href</a>
            <a href="mailto:team@example.com">Mail</a>
            <a href="blog/">Blog</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&test_settings(&base_url)).unwrap();
    let outcome = fetcher.fetch(&format!("{}/", base_url)).await;

    assert_eq!(
        outcome.children,
        vec![format!("{}/about", base_url), format!("{}/blog/", base_url)]
    );
    assert_eq!(outcome.errors.len(), 1);
    assert!(matches!(outcome.errors[0], FetchError::MissingHref { .. }));
}

#[tokio::test]
async fn test_fetch_resolves_links_against_redirect_target() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/docs/"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(html(r#"<html><body><a href="guide">Guide</a></body></html>"#))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&test_settings(&base_url)).unwrap();
    let outcome = fetcher.fetch(&format!("{}/docs", base_url)).await;

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.children, vec![format!("{}/docs/guide", base_url)]);
}

#[tokio::test]
async fn test_redirected_page_keeps_requested_url_as_key() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/docs">Docs</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/docs/"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(html(r#"<a href="guide">Guide</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/guide"))
        .respond_with(html("<html><body>guide</body></html>"))
        .mount(&mock_server)
        .await;

    let settings = test_settings(&base_url);
    let fetcher = Arc::new(HttpFetcher::new(&settings).unwrap());
    let mut coordinator = Coordinator::from_settings(&settings, fetcher, RecordingLogger::new());

    let summary = coordinator
        .start(format!("{}/", base_url))
        .await
        .expect("Crawl failed");

    let expected: HashSet<String> = [
        format!("{}/", base_url),
        format!("{}/docs", base_url),
        format!("{}/docs/guide", base_url),
    ]
    .into_iter()
    .collect();
    assert_eq!(summary.frontier, expected);
    assert_eq!(summary.errors_logged, 0);

    let logger = coordinator.into_logger();
    assert_eq!(
        logger.pages_for(&format!("{}/docs", base_url))[0].children,
        vec![format!("{}/docs/guide", base_url)]
    );
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><body>
            <a href="{}/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            </body></html>"#,
            base_url
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(r#"<html><body><a href="/">Home</a><a href="/page2#top">2</a></body></html>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html(r#"<html><body><a href="/gone">Gone</a></body></html>"#))
        .mount(&mock_server)
        .await;

    let settings = test_settings(&base_url);
    let fetcher = Arc::new(HttpFetcher::new(&settings).unwrap());
    let mut coordinator = Coordinator::from_settings(&settings, fetcher, RecordingLogger::new());

    let seed = format!("{}/", base_url);
    let summary = coordinator.start(seed.clone()).await.expect("Crawl failed");

    let expected: HashSet<String> = [
        seed.clone(),
        format!("{}/page1", base_url),
        format!("{}/page2", base_url),
        format!("{}/gone", base_url),
    ]
    .into_iter()
    .collect();
    assert_eq!(summary.frontier, expected);
    assert_eq!(summary.results_consumed, 4);

    // /gone is a 404
    assert_eq!(summary.errors_logged, 1);
    let logger = coordinator.into_logger();
    assert_eq!(
        logger.errors,
        vec![format!("failed to GET {}/gone: status 404", base_url)]
    );
    assert_eq!(
        logger.pages_for(&format!("{}/page1", base_url))[0].children,
        vec![seed, format!("{}/page2", base_url)]
    );
}

#[tokio::test]
async fn test_crawl_entry_point_respects_page_cap() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html("<html><body>leaf</body></html>"))
        .mount(&mock_server)
        .await;

    let settings = CrawlSettings {
        max_pages: Some(2),
        ..test_settings(&mock_server.uri())
    };

    let summary = crawl(&settings).await.expect("Crawl failed");

    assert_eq!(summary.pages_visited(), 2);
    assert_eq!(summary.links_refused, 2);
}

#[tokio::test]
async fn test_crawl_entry_point_rejects_bad_seed() {
    let settings = test_settings("ftp://example.com");
    assert!(crawl(&settings).await.is_err());
}

#[tokio::test]
async fn test_crawl_entry_point_rejects_zero_rate_limit() {
    let settings = CrawlSettings {
        rate_limit: 0,
        ..test_settings("http://example.com/")
    };

    let result = crawl(&settings).await;

    assert!(matches!(
        result,
        Err(CrawlError::Config(ConfigError::Validation(_)))
    ));
}

#[tokio::test]
async fn test_crawl_entry_point_rejects_zero_workers() {
    let settings = CrawlSettings {
        n_workers: 0,
        ..test_settings("http://example.com/")
    };

    let result = crawl(&settings).await;

    assert!(matches!(
        result,
        Err(CrawlError::Config(ConfigError::Validation(_)))
    ));
}
