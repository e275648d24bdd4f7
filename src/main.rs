//! Domain-Walker main entry point
//!
//! This is the command-line interface for the Domain-Walker crawler.

use clap::Parser;
use domain_walker::config::{read_config, validate, Config};
use domain_walker::crawler::crawl;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Domain-Walker: a concurrent single-domain crawler
///
/// Domain-Walker visits every page reachable from a domain's root without
/// leaving that domain, and prints each page with the links found on it.
#[derive(Parser, Debug)]
#[command(name = "domain-walker")]
#[command(version = "1.0.0")]
#[command(about = "A concurrent single-domain crawler", long_about = None)]
struct Cli {
    /// Number of crawl workers
    #[arg(long, value_name = "N")]
    nworkers: Option<usize>,

    /// Maximum number of HTTP requests in flight at once
    #[arg(long, value_name = "N")]
    ratelimit: Option<usize>,

    /// Per-fetch timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    timeoutseconds: Option<u64>,

    /// The domain to crawl, e.g. https://example.com
    #[arg(long, value_name = "URL")]
    domain: Option<String>,

    /// Stop admitting new pages after this many
    #[arg(long, value_name = "N")]
    maxpages: Option<usize>,

    /// Path to TOML configuration file (flags override its values)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of `config`
    fn merge_into(&self, config: &mut Config) {
        let settings = &mut config.crawler;

        if let Some(n_workers) = self.nworkers {
            settings.n_workers = n_workers;
        }
        if let Some(rate_limit) = self.ratelimit {
            settings.rate_limit = rate_limit;
        }
        if let Some(timeout_seconds) = self.timeoutseconds {
            settings.timeout_seconds = timeout_seconds;
        }
        if let Some(domain) = &self.domain {
            settings.domain = domain.clone();
        }
        if self.maxpages.is_some() {
            settings.max_pages = self.maxpages;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match load_settings(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let settings = &config.crawler;
    tracing::info!(
        "Crawling {} with {} workers, rate limit {}, timeout {}s",
        settings.domain,
        settings.n_workers,
        settings.rate_limit,
        settings.timeout_seconds
    );

    match crawl(settings).await {
        Ok(summary) => {
            println!(
                "Crawled {} pages ({} errors, {} links refused) in {:.2?}",
                summary.pages_visited(),
                summary.errors_logged,
                summary.links_refused,
                summary.elapsed
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Builds the effective configuration from the optional file and the flags
fn load_settings(cli: &Cli) -> Result<Config, domain_walker::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            read_config(path)?
        }
        None => Config::default(),
    };

    cli.merge_into(&mut config);
    validate(&config)?;

    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("domain_walker=info,warn"),
            1 => EnvFilter::new("domain_walker=debug,info"),
            2 => EnvFilter::new("domain_walker=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // The site map owns stdout
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
