//! Crawl the requested sites and write every article to one file.
//!
//! A site is named either by a registered hostname, crawled from its
//! profile's `base_url`, or by an absolute start URL whose host selects the
//! profile. Sites are crawled one after another; a site that yields nothing
//! does not affect the others.

use crate::config::{SiteProfile, SiteRegistry};
use crate::http::Fetch;
use crate::outputs::{self, ExportFormat};
use crate::scrapers::crawler::{Crawler, site_host};
use crate::utils::ensure_parent_dir;
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument, warn};
use url::Url;

/// Start URL and profile for a `--sites` entry, or `None` when there is nowhere to start.
pub fn resolve_site<'r>(registry: &'r SiteRegistry, site: &str) -> Option<(String, &'r SiteProfile)> {
    if let Ok(url) = Url::parse(site) {
        if matches!(url.scheme(), "http" | "https") {
            if let Some(host) = site_host(&url) {
                return Some((site.to_string(), registry.lookup(&host)));
            }
        }
    }

    if !registry.contains(site) {
        warn!(%site, "Unknown site; falling back to the default profile");
    }
    let profile = registry.lookup(site);
    if profile.base_url.is_empty() {
        warn!(%site, "No start URL for site; skipping");
        return None;
    }
    Some((profile.base_url.clone(), profile))
}

/// Crawl `sites` in order and write the combined articles to `out`.
///
/// Returns the number of rows written. When no site produced an article
/// nothing is written and the result is `0`.
#[instrument(level = "info", skip_all, fields(sites = sites.len(), out = %out.display()))]
pub async fn run<F: Fetch>(
    crawler: &Crawler<F>,
    registry: &SiteRegistry,
    sites: &[String],
    out: &Path,
    format: ExportFormat,
) -> Result<usize, Box<dyn Error>> {
    let mut articles = Vec::new();
    for site in sites {
        let Some((start_url, profile)) = resolve_site(registry, site) else {
            continue;
        };
        info!(%site, %start_url, "Crawling site");
        let found = crawler.crawl_site(&start_url, profile).await;
        info!(%site, count = found.len(), "Found articles");
        articles.extend(found);
    }

    if articles.is_empty() {
        info!("No articles collected; nothing to export");
        return Ok(0);
    }

    ensure_parent_dir(out).await?;
    outputs::write_articles(&articles, out, format)?;
    info!(rows = articles.len(), path = %out.display(), "Wrote articles");
    Ok(articles.len())
}
