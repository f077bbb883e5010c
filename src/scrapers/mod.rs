//! Listing crawler and HTML extraction.
//!
//! A site is crawled in two phases per listing page:
//!
//! 1. **Links**: collect article URLs from the listing page ([`links`])
//! 2. **Articles**: fetch each URL and pull title, date and content out of it ([`article`])
//!
//! [`crawler`] drives both phases over years and listing pages.
//!
//! # Selector Strategies
//!
//! | Field | Strategy |
//! |-------|----------|
//! | links | every selector, matches concatenated, duplicates dropped |
//! | title, date, content | selectors in order, first one that matches is used |

pub mod article;
pub mod crawler;
pub mod links;

use scraper::Selector;
use tracing::warn;

/// Parse a configured selector, logging and skipping ones `scraper` rejects.
pub(crate) fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!(%selector, error = %e, "Skipping invalid selector");
            None
        }
    }
}
