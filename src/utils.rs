//! Utility functions for text cleanup, year handling, and output paths.
//!
//! This module provides helper functions used throughout the application:
//! - Whitespace collapsing for text pulled out of HTML
//! - String truncation for logging
//! - Year range parsing and year detection in URLs
//! - Output directory preparation

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, instrument};

static URL_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(\d{4})/").unwrap());

/// Join text fragments, collapsing every whitespace run to one space and trimming the ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(collapse_whitespace(["  Hello\n", "world  "]), "Hello world");
/// ```
pub fn collapse_whitespace<'a>(fragments: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for word in fragments.into_iter().flat_map(str::split_whitespace) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// The year named by the first `/NNNN/` path segment of `url`, if any.
pub fn year_in_url(url: &str) -> Option<u16> {
    URL_YEAR
        .captures(url)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// An inclusive list of years, parsed from `2015-2026` or `2020`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Years(pub Vec<u16>);

impl FromStr for Years {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_one = |part: &str| {
            part.trim()
                .parse::<u16>()
                .map_err(|_| format!("invalid year {:?}", part.trim()))
        };
        match s.split_once('-') {
            Some((start, end)) => {
                let (start, end) = (parse_one(start)?, parse_one(end)?);
                if start > end {
                    return Err(format!("year range {start}-{end} is reversed"));
                }
                Ok(Years((start..=end).collect()))
            }
            None => Ok(Years(vec![parse_one(s)?])),
        }
    }
}

impl fmt::Display for Years {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) if first != last => write!(f, "{first}-{last}"),
            (Some(first), _) => write!(f, "{first}"),
            _ => Ok(()),
        }
    }
}

/// Create the parent directory of `path` if it has one.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).await?;
            debug!(dir = %parent.display(), "Output directory ready");
        }
        _ => {}
    }
    Ok(())
}
