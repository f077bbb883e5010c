//! Article link discovery on listing pages.

use super::parse_selector;
use itertools::Itertools;
use scraper::{ElementRef, Html};

/// Collect link targets matched by `selectors`.
///
/// Every selector is applied in order and its matches are taken in document
/// order. The concatenated targets are deduplicated keeping the first
/// occurrence.
///
/// # Arguments
///
/// * `document` - Parsed listing page
/// * `selectors` - CSS selectors for link elements; invalid ones are skipped
///
/// # Returns
///
/// Each element's `href`, or `data-href` when `href` is missing, as written
/// in the page. Resolving relative targets is up to the caller.
///
/// # Examples
///
/// ```ignore
/// let html = Html::parse_document(r#"<h2><a href="/b">B</a></h2><article><a href="/a">A</a></article>"#);
/// let links = extract_links(&html, &["article a".into(), "h2 a".into()]);
/// assert_eq!(links, vec!["/a", "/b"]);
/// ```
pub fn extract_links(document: &Html, selectors: &[String]) -> Vec<String> {
    selectors
        .iter()
        .filter_map(|sel| parse_selector(sel))
        .flat_map(|sel| {
            document
                .select(&sel)
                .filter_map(link_target)
                .collect::<Vec<_>>()
        })
        .unique()
        .collect()
}

/// `href`, else `data-href`; empty attributes count as missing.
fn link_target(element: ElementRef<'_>) -> Option<String> {
    let attr = |name: &str| element.value().attr(name).filter(|v: &&str| !v.is_empty());
    attr("href").or_else(|| attr("data-href")).map(str::to_string)
}
