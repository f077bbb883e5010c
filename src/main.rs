//! # News Crawler
//!
//! Crawls the yearly archive listings of configured news sites, extracts
//! each article's title, publish date and body text, and exports everything
//! to a spreadsheet.
//!
//! ## Usage
//!
//! ```sh
//! news_crawler --sites tatoli.tl --years 2018-2020 --out data/news.xlsx
//! ```
//!
//! ## Architecture
//!
//! The application runs one request at a time:
//! 1. **Profiles**: Resolve each site to its selector profile and start URL
//! 2. **Listing**: Walk `/{year}/`, `/{year}/page/2/`, … until a page is missing or empty
//! 3. **Articles**: Fetch every linked article and extract its fields
//! 4. **Output**: Write all articles as `.xlsx`, `.csv` or `.json`

use clap::Parser;
use std::error::Error;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod export;
mod http;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use config::SiteRegistry;
use http::HttpFetcher;
use outputs::ExportFormat;
use scrapers::crawler::Crawler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // --- Tracing init ---
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_crawler starting up");
    debug!(?args, "Parsed CLI arguments");

    // Fail on a bad output path or profile file before spending hours crawling.
    let format = ExportFormat::from_path(&args.out)?;
    let registry = match &args.config {
        Some(path) => SiteRegistry::load(path)?,
        None => SiteRegistry::builtin(),
    };
    let sites = args
        .sites
        .clone()
        .unwrap_or_else(|| registry.hosts().map(str::to_string).collect());
    info!(?sites, years = %args.years, out = %args.out.display(), "Crawl plan");

    let fetcher = HttpFetcher::new(args.fetch_config())?;
    let crawler = Crawler::new(fetcher, args.years.0.clone(), args.rate);
    let rows = export::run(&crawler, &registry, &sites, &args.out, format).await?;

    let elapsed = start_time.elapsed();
    info!(
        rows,
        ?elapsed,
        secs = elapsed.as_secs(),
        "Execution complete"
    );

    Ok(())
}
