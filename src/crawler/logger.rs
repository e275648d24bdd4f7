//! Crawl event sinks
//!
//! The coordinator reports every crawled page and every non-fatal error
//! through a [`CrawlLogger`]. Loggers are only ever called from the
//! coordinator's consumption routine, so they take `&mut self` and need no
//! synchronization of their own.

use std::io::{self, Write};

/// Sink for per-page crawl events and errors
pub trait CrawlLogger {
    /// Records a crawled page and the links found on it
    fn log_page(&mut self, parent: &str, children: &[String]);

    /// Records a non-fatal error
    fn log_error(&mut self, message: &str);
}

/// Writes a plain-text site map, one block per crawled page
///
/// ```text
/// http://example.com/
///   -> http://example.com/about
///   -> http://example.com/blog
/// ```
///
/// Errors go to the tracing subscriber.
pub struct SiteMapLogger<W: Write> {
    out: W,
}

impl SiteMapLogger<io::Stdout> {
    /// A site map written to standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> SiteMapLogger<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_page(&mut self, parent: &str, children: &[String]) -> io::Result<()> {
        writeln!(self.out, "{}", parent)?;
        for child in children {
            writeln!(self.out, "  -> {}", child)?;
        }
        self.out.flush()
    }
}

impl<W: Write> CrawlLogger for SiteMapLogger<W> {
    fn log_page(&mut self, parent: &str, children: &[String]) {
        if let Err(e) = self.write_page(parent, children) {
            tracing::error!("Failed to write site map entry for {}: {}", parent, e);
        }
    }

    fn log_error(&mut self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// A page recorded by [`RecordingLogger`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedPage {
    pub parent: String,
    pub children: Vec<String>,
}

/// Keeps every event in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    pub pages: Vec<LoggedPage>,
    pub errors: Vec<String>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages recorded for `parent`
    pub fn pages_for(&self, parent: &str) -> Vec<&LoggedPage> {
        self.pages.iter().filter(|p| p.parent == parent).collect()
    }
}

impl CrawlLogger for RecordingLogger {
    fn log_page(&mut self, parent: &str, children: &[String]) {
        self.pages.push(LoggedPage {
            parent: parent.to_string(),
            children: children.to_vec(),
        });
    }

    fn log_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}
