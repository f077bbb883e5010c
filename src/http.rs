//! HTTP fetching with timeout and retry.
//!
//! # Architecture
//!
//! - [`Fetch`]: the trait the crawler depends on
//! - [`HttpFetcher`]: `reqwest`-backed implementation with a shared client
//! - [`RetryPolicy`]: which failures are retried and how long to wait
//!
//! A fetch never fails loudly. Once a URL is deemed unreachable the fetcher
//! returns `None` and the caller skips that unit of work.
//!
//! # Retry Strategy
//!
//! - Connection errors, timeouts and statuses 429/500/502/503/504 are retried
//! - Malformed or non-HTTP URLs fail at once
//! - Up to 3 retries by default
//! - Exponential backoff: `backoff_factor * 2^(retry-1)`, capped at 120 seconds
//! - A `Retry-After: <seconds>` header replaces the computed delay

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response};
use std::error::Error;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// User agent sent with every request.
pub const USER_AGENT: &str = "NewsCrawler/1.0 (+https://example)";

/// Statuses that are worth asking for again.
pub const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// A fetched HTTP response with its body read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The final URL after redirects.
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl Page {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Something that can GET a URL.
///
/// `None` means the URL could not be fetched at all; callers treat it as
/// "skip this URL". Non-success statuses that are not retried come back as a
/// [`Page`] so callers can inspect them.
pub trait Fetch {
    async fn fetch(&self, url: &str) -> Option<Page>;
}

/// Which failures to retry and how long to wait between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles with each further retry.
    pub backoff_factor: Duration,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: Duration::from_millis(500),
            max_backoff: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    pub fn is_retryable(&self, status: u16) -> bool {
        RETRY_STATUSES.contains(&status)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let exp = retry.saturating_sub(1).min(31);
        self.backoff_factor
            .saturating_mul(1 << exp)
            .min(self.max_backoff)
    }
}

/// Settings for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            retry: RetryPolicy::default(),
        }
    }
}

/// [`Fetch`] over a single reused `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

/// What one request attempt produced.
enum Attempt {
    Done(Page),
    Retry { reason: String, retry_after: Option<Duration> },
    Fail(String),
}

/// Transport failures a second attempt might get past.
fn is_transient(e: &reqwest::Error) -> bool {
    !e.is_builder() && (e.is_connect() || e.is_timeout() || e.is_request())
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            retry: config.retry,
        })
    }

    async fn attempt(&self, url: &str) -> Attempt {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) if is_transient(&e) => {
                return Attempt::Retry {
                    reason: e.to_string(),
                    retry_after: None,
                };
            }
            Err(e) => return Attempt::Fail(e.to_string()),
        };

        let status = response.status().as_u16();
        if self.retry.is_retryable(status) {
            return Attempt::Retry {
                reason: format!("HTTP {status}"),
                retry_after: retry_after(&response),
            };
        }

        let final_url = response.url().to_string();
        match response.text().await {
            Ok(body) => Attempt::Done(Page {
                url: final_url,
                status,
                body,
            }),
            Err(e) => Attempt::Retry {
                reason: format!("failed to read body: {e}"),
                retry_after: None,
            },
        }
    }
}

/// Seconds-valued `Retry-After` header; HTTP-date values are ignored.
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

impl Fetch for HttpFetcher {
    /// GET `url`, retrying transient failures according to the [`RetryPolicy`].
    ///
    /// Connection errors, timeouts and 429/5xx responses are retried with
    /// exponential backoff (or the server's `Retry-After`). Requests that can
    /// never succeed, such as `mailto:` links or URLs without a host, fail on
    /// the first attempt.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute `http` or `https` URL
    ///
    /// # Returns
    ///
    /// The [`Page`] with its status and body, or `None` once the URL is deemed
    /// unreachable. Non-retryable statuses such as 404 are returned as pages.
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Option<Page> {
        let total_t0 = Instant::now();
        let mut retries = 0u32;

        loop {
            let (reason, retry_after) = match self.attempt(url).await {
                Attempt::Done(page) => {
                    debug!(
                        status = page.status,
                        bytes = page.body.len(),
                        elapsed_ms = total_t0.elapsed().as_millis(),
                        "Fetched"
                    );
                    return Some(page);
                }
                Attempt::Retry {
                    reason,
                    retry_after,
                } => (reason, retry_after),
                Attempt::Fail(reason) => {
                    debug!(%reason, "Request failed; not retrying");
                    return None;
                }
            };

            retries += 1;
            if retries > self.retry.max_retries {
                debug!(
                    retries = retries - 1,
                    elapsed_ms = total_t0.elapsed().as_millis(),
                    %reason,
                    "Request failed; retries exhausted"
                );
                return None;
            }

            let delay = retry_after
                .map(|d| d.min(self.retry.max_backoff))
                .unwrap_or_else(|| self.retry.backoff(retries));
            warn!(
                retry = retries,
                max = self.retry.max_retries,
                ?delay,
                %reason,
                "Request failed; backing off"
            );
            sleep(delay).await;
        }
    }
}
