//! Title, date and content extraction from a single article page.
//!
//! Every field falls back rather than fails. A page whose markup matches none
//! of the profile's selectors still yields an [`Article`], with empty fields.
//!
//! # Content Fallbacks
//!
//! 1. First content selector that matches: its `<p>` descendants, joined by blank lines
//! 2. Same container without paragraphs: the container's whole text
//! 3. Nothing usable: every `<p>` in the document

use super::parse_selector;
use crate::config::SiteProfile;
use crate::models::Article;
use crate::utils::collapse_whitespace;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static PUBLISHED_TIME: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="article:published_time"]"#).unwrap());

const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Build an [`Article`] from a fetched page.
///
/// # Arguments
///
/// * `document` - Parsed article page
/// * `profile` - Title, date and content selectors of the site
/// * `link` - URL the page was fetched from
/// * `source` - Host of the site
///
/// # Returns
///
/// The article with:
/// - `title`: text of the first title selector that matches, else empty
/// - `date`: the `article:published_time` meta content when non-empty, else
///   text of the first date selector that matches, else empty
/// - `content`: paragraphs of the first matching content container, the
///   container's text, or every paragraph of the page, in that order of preference
pub fn extract_article(document: &Html, profile: &SiteProfile, link: &str, source: &str) -> Article {
    Article {
        title: first_match_text(document, &profile.title_selectors),
        date: published_date(document, &profile.date_selectors),
        link: link.to_string(),
        content: extract_content(document, &profile.content_selectors),
        source: source.to_string(),
    }
}

/// First element matched by the first selector that matches anything, as collapsed text.
pub fn first_match_text(document: &Html, selectors: &[String]) -> String {
    first_match(document, selectors)
        .map(|el| collapse_whitespace(el.text()))
        .unwrap_or_default()
}

fn first_match<'a>(document: &'a Html, selectors: &[String]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .filter_map(|sel| parse_selector(sel))
        .find_map(|sel| document.select(&sel).next())
}

/// `article:published_time` meta content when set, else the date selectors.
fn published_date(document: &Html, selectors: &[String]) -> String {
    document
        .select(&PUBLISHED_TIME)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .filter(|content| !content.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| first_match_text(document, selectors))
}

fn extract_content(document: &Html, selectors: &[String]) -> String {
    let content = match first_match(document, selectors) {
        Some(container) => {
            let paragraphs = join_paragraphs(container.select(&PARAGRAPH));
            if paragraphs.is_empty() {
                collapse_whitespace(container.text())
            } else {
                paragraphs
            }
        }
        None => String::new(),
    };
    if content.is_empty() {
        join_paragraphs(document.select(&PARAGRAPH))
    } else {
        content
    }
}

/// Trimmed, non-empty paragraph texts joined by blank lines.
fn join_paragraphs<'a>(paragraphs: impl Iterator<Item = ElementRef<'a>>) -> String {
    paragraphs
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .join(PARAGRAPH_SEPARATOR)
}
