//! Data models for crawled articles.
//!
//! This module defines the record produced by the crawler:
//! - [`Article`]: one extracted news article, ready for export
//!
//! The struct's field order is the export column order, so every writer in
//! [`crate::outputs`] can rely on `serde` to emit columns consistently.

use serde::{Deserialize, Serialize};

/// Column headers of every exported file, in order.
pub const EXPORT_COLUMNS: [&str; 5] = ["title", "date", "link", "content", "source"];

/// A news article extracted from a single article page.
///
/// Created once per successfully fetched page and never modified afterwards.
/// Any field except `link` and `source` may be empty when the page's markup
/// did not match the site's selectors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// The headline text.
    pub title: String,
    /// The raw publish date: a meta attribute value or the text of a date element.
    pub date: String,
    /// The absolute URL the article was fetched from.
    pub link: String,
    /// Paragraphs joined by blank lines, or the container's whole text.
    pub content: String,
    /// Host of the site that produced the article.
    pub source: String,
}

impl Article {
    /// Cell values in [`EXPORT_COLUMNS`] order.
    pub fn cells(&self) -> [&str; 5] {
        [
            &self.title,
            &self.date,
            &self.link,
            &self.content,
            &self.source,
        ]
    }
}
