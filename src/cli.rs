//! Command-line interface definitions for the news crawler.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Pacing and config-file options can also come from environment variables.

use crate::http::{FetchConfig, RetryPolicy};
use crate::utils::Years;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for the news crawler.
///
/// # Examples
///
/// ```sh
/// # Every registered site, 2015 through 2026, into data/news.xlsx
/// news_crawler
///
/// # One site, one year, as CSV
/// news_crawler --sites tatoli.tl --years 2020 --out data/tatoli.csv
///
/// # Start from a year archive URL directly
/// news_crawler --sites https://tatoli.tl/2019/ --debug
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Sites to crawl: registered hostnames or absolute start URLs [default: every registered site]
    #[arg(long, num_args = 1..)]
    pub sites: Option<Vec<String>>,

    /// Years to crawl, as a range like 2015-2026 or a single year
    #[arg(long, default_value = "2015-2026")]
    pub years: Years,

    /// Output file; the extension picks the format (.xlsx, .csv or .json)
    #[arg(long, default_value = "data/news.xlsx")]
    pub out: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// YAML file with extra or replacement site profiles
    #[arg(long, env = "NEWS_CRAWLER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seconds to pause after every article and every year
    #[arg(long, env = "NEWS_CRAWLER_RATE", default_value = "1.0", value_parser = parse_secs)]
    pub rate: Duration,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "15", value_parser = parse_secs)]
    pub timeout: Duration,

    /// Retries for connection errors and 429/5xx responses
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Backoff factor in seconds; the delay doubles with each retry
    #[arg(long, default_value = "0.5", value_parser = parse_secs)]
    pub backoff: Duration,
}

impl Cli {
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout: self.timeout,
            retry: RetryPolicy {
                max_retries: self.retries,
                backoff_factor: self.backoff,
                ..RetryPolicy::default()
            },
        }
    }
}

/// Non-negative seconds, fractions allowed.
fn parse_secs(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("{s:?} is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("{s:?} must be a non-negative number of seconds"))
}
