//! HTML parser for extracting same-domain links
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from <a> tags on the same host as the page)
//! - Page title
//! - Non-fatal link problems (missing or unparsable `href`)

use crate::crawler::fetcher::FetchError;
use crate::url::{normalize_link, same_domain};
use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Normalized same-domain links, in document order, duplicates kept
    pub links: Vec<String>,

    /// Problems found while extracting links
    pub errors: Vec<FetchError>,
}

/// Parses HTML content and extracts same-domain links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` resolving to an HTTP(S) URL on the page's host
///
/// **Exclude silently:**
/// - Links to other hosts
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:`, `data:` and fragment-only links
///
/// **Report as errors:**
/// - `<a>` tags without `href`
/// - `href` values that cannot be parsed
///
/// # Example
///
/// ```
/// use domain_walker::crawler::parse_page;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page?x=1">Link</a></body></html>"#;
/// let page_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_page(html, &page_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_page(html: &str, page_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let (links, errors) = extract_links(&document, page_url);

    ParsedPage {
        title,
        links,
        errors,
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts all same-domain links from the HTML document
fn extract_links(document: &Html, page_url: &Url) -> (Vec<String>, Vec<FetchError>) {
    let mut links = Vec::new();
    let mut errors = Vec::new();

    let Ok(a_selector) = Selector::parse("a") else {
        return (links, errors);
    };

    for element in document.select(&a_selector) {
        // Skip if it has the download attribute
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(href) = element.value().attr("href") else {
            errors.push(FetchError::MissingHref {
                url: page_url.to_string(),
            });
            continue;
        };

        match normalize_link(page_url, href) {
            Ok(Some(link)) if same_domain(page_url, &link) => links.push(link.to_string()),
            Ok(_) => {}
            Err(e) => errors.push(FetchError::InvalidLink {
                url: page_url.to_string(),
                href: href.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    (links, errors)
}
