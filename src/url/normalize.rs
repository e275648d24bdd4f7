use crate::{UrlError, UrlResult};
use url::Url;

/// Link prefixes that never lead to a crawlable page
const SKIPPED_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Normalizes a seed URL supplied by the user
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. Default the scheme to `http` when no `scheme://` is present
/// 3. Parse the URL; reject if malformed
/// 4. Only accept HTTP and HTTPS
/// 5. Require a host
/// 6. Remove the query string and fragment
///
/// # Examples
///
/// ```
/// use domain_walker::url::normalize_seed;
///
/// let url = normalize_seed("example.com/docs?page=2#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/docs");
/// ```
pub fn normalize_seed(raw: &str) -> UrlResult<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if !is_web_scheme(&url) {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    strip_query_and_fragment(&mut url);
    Ok(url)
}

/// Normalizes an `href` found on `parent` into an absolute frontier key
///
/// Host-relative and path-relative links are resolved against the parent, so
/// they inherit its scheme and host. Protocol-relative links (`//host/path`)
/// inherit the parent's scheme.
///
/// # Returns
///
/// * `Ok(Some(Url))` - An absolute HTTP(S) URL without query or fragment
/// * `Ok(None)` - The link is not a page link (empty, fragment-only,
///   `javascript:`, `mailto:`, `tel:`, `data:` or another non-web scheme)
/// * `Err(UrlError)` - The link could not be parsed
pub fn normalize_link(parent: &Url, href: &str) -> UrlResult<Option<Url>> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Ok(None);
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
    {
        return Ok(None);
    }

    let mut url = parent
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    if !is_web_scheme(&url) {
        return Ok(None);
    }

    strip_query_and_fragment(&mut url);
    Ok(Some(url))
}

fn is_web_scheme(url: &Url) -> bool {
    url.scheme() == "http" || url.scheme() == "https"
}

fn strip_query_and_fragment(url: &mut Url) {
    url.set_query(None);
    url.set_fragment(None);
}
