//! Site configuration registry.
//!
//! Maps a site's hostname to the [`SiteProfile`] used to crawl it. The
//! built-in table covers the sites this crawler was written for; a YAML file
//! can overlay it at startup (see [`SiteRegistry::load`]). Once built, the
//! registry is only ever read.
//!
//! # File format
//!
//! ```yaml
//! example.org:
//!   list_selectors: ["article a", "h2 a"]
//!   base_path: "/news/{year}"
//!   base_url: "https://example.org/news/"
//! ```
//!
//! Fields left out take the generic defaults of [`SiteProfile::default`].

use once_cell::sync::Lazy;
use scraper::Selector;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Placeholder replaced by the year in [`SiteProfile::base_path`].
pub const YEAR_PLACEHOLDER: &str = "{year}";

/// Per-host extraction profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteProfile {
    /// Selectors for article links on a listing page; every selector's matches are collected.
    pub list_selectors: Vec<String>,
    /// Selectors for the headline; the first one that matches wins.
    pub title_selectors: Vec<String>,
    /// Selectors for the publish date when no `article:published_time` meta tag exists.
    pub date_selectors: Vec<String>,
    /// Selectors for the article body container; the first one that matches wins.
    pub content_selectors: Vec<String>,
    /// Path of a year's listing root, with a `{year}` placeholder.
    pub base_path: String,
    /// Absolute root URL used as crawl entry point. Empty for unconfigured hosts.
    pub base_url: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            list_selectors: strings(&["article a", "h2 a", ".post a"]),
            title_selectors: strings(&["h1", ".entry-title"]),
            date_selectors: strings(&["time", ".entry-date"]),
            content_selectors: strings(&[".entry-content", "article", "#content"]),
            base_path: format!("/{YEAR_PLACEHOLDER}"),
            base_url: String::new(),
        }
    }
}

impl SiteProfile {
    /// Listing root path for `year`, e.g. `/blog/2019`.
    pub fn year_path(&self, year: u16) -> String {
        self.base_path.replace(YEAR_PLACEHOLDER, &year.to_string())
    }

    /// Check that every selector parses, so a typo fails at startup instead of mid-crawl.
    fn validate(&self, host: &str) -> Result<(), Box<dyn Error>> {
        let all = self
            .list_selectors
            .iter()
            .chain(&self.title_selectors)
            .chain(&self.date_selectors)
            .chain(&self.content_selectors);
        for sel in all {
            if let Err(e) = Selector::parse(sel) {
                return Err(format!("invalid selector {sel:?} for {host}: {e}").into());
            }
        }
        Ok(())
    }
}

static DEFAULT_PROFILE: Lazy<SiteProfile> = Lazy::new(SiteProfile::default);

static BUILTIN_SITES: Lazy<Vec<(String, SiteProfile)>> = Lazy::new(|| {
    vec![
        (
            "tatoli.tl".to_string(),
            SiteProfile {
                list_selectors: strings(&["article a", ".entry-title a", "h2.title a"]),
                title_selectors: strings(&["h1.entry-title", "h1.title", "h1"]),
                date_selectors: strings(&[
                    "time",
                    ".entry-date",
                    "meta[property='article:published_time']",
                ]),
                content_selectors: strings(&[".entry-content", ".post-content", "article"]),
                base_url: "https://tatoli.tl/".to_string(),
                ..SiteProfile::default()
            },
        ),
        (
            "thediliweekly.com".to_string(),
            SiteProfile {
                list_selectors: strings(&["article a", ".entry-title a", "h2 a"]),
                title_selectors: strings(&["h1.entry-title", "h1"]),
                base_url: "https://thediliweekly.com/".to_string(),
                ..SiteProfile::default()
            },
        ),
        (
            "www.rmtl.org".to_string(),
            SiteProfile {
                list_selectors: strings(&["article a", ".post a", "h2 a"]),
                title_selectors: strings(&["h1.entry-title", "h1"]),
                content_selectors: strings(&[
                    ".entry-content",
                    ".post-content",
                    "article",
                    "#content",
                ]),
                base_path: "/blog/{year}".to_string(),
                base_url: "https://www.rmtl.org/blog/".to_string(),
                ..SiteProfile::default()
            },
        ),
    ]
});

/// Read-only mapping from hostname to [`SiteProfile`], in registration order.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    sites: Vec<(String, SiteProfile)>,
}

impl SiteRegistry {
    /// The built-in sites.
    pub fn builtin() -> Self {
        Self {
            sites: BUILTIN_SITES.clone(),
        }
    }

    /// Built-in sites overlaid with the profiles in the YAML file at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let registry = Self::builtin().overlay_yaml(&text)?;
        info!(sites = registry.sites.len(), "Loaded site profiles");
        Ok(registry)
    }

    /// Overlay profiles parsed from YAML: known hosts are replaced, new hosts appended.
    pub fn overlay_yaml(mut self, yaml: &str) -> Result<Self, Box<dyn Error>> {
        let overlay: BTreeMap<String, SiteProfile> = serde_yaml::from_str(yaml)?;
        for (host, profile) in overlay {
            profile.validate(&host)?;
            match self.sites.iter_mut().find(|(h, _)| *h == host) {
                Some(slot) => {
                    debug!(%host, "Replacing built-in profile");
                    slot.1 = profile;
                }
                None => {
                    debug!(%host, "Adding profile");
                    self.sites.push((host, profile));
                }
            }
        }
        Ok(self)
    }

    /// Profile registered for `host`.
    ///
    /// Hostnames must match exactly; `tatoli.tl` does not match
    /// `www.tatoli.tl`.
    ///
    /// # Arguments
    ///
    /// * `host` - Hostname, with `:port` when the site uses a non-default port
    ///
    /// # Returns
    ///
    /// The registered profile, or the generic default profile (empty
    /// `base_url`) for unknown hosts.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let registry = SiteRegistry::builtin();
    /// assert_eq!(registry.lookup("www.rmtl.org").base_path, "/blog/{year}");
    /// assert_eq!(registry.lookup("example.com").base_url, "");
    /// ```
    pub fn lookup(&self, host: &str) -> &SiteProfile {
        self.sites
            .iter()
            .find(|(h, _)| h == host)
            .map(|(_, p)| p)
            .unwrap_or(&*DEFAULT_PROFILE)
    }

    /// Whether `host` has a registered profile.
    pub fn contains(&self, host: &str) -> bool {
        self.sites.iter().any(|(h, _)| h == host)
    }

    /// Registered hostnames in registration order.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.sites.iter().map(|(h, _)| h.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_host_gets_default_profile() {
        let registry = SiteRegistry::builtin();
        for host in ["example.com", "tatoli.tl.evil.com", "rmtl.org", ""] {
            let profile = registry.lookup(host);
            assert!(!profile.list_selectors.is_empty());
            assert!(!profile.title_selectors.is_empty());
            assert!(!profile.date_selectors.is_empty());
            assert!(!profile.content_selectors.is_empty());
            assert_eq!(profile.base_url, "");
            assert_eq!(profile, &SiteProfile::default());
        }
    }

    #[test]
    fn test_builtin_hosts_in_order() {
        let registry = SiteRegistry::builtin();
        let hosts: Vec<&str> = registry.hosts().collect();
        assert_eq!(hosts, vec!["tatoli.tl", "thediliweekly.com", "www.rmtl.org"]);
    }

    #[test]
    fn test_builtin_profile_keeps_unset_defaults() {
        let registry = SiteRegistry::builtin();
        let diliweekly = registry.lookup("thediliweekly.com");
        assert_eq!(diliweekly.title_selectors, vec!["h1.entry-title", "h1"]);
        assert_eq!(diliweekly.date_selectors, SiteProfile::default().date_selectors);
        assert_eq!(diliweekly.base_path, "/{year}");

        let rmtl = registry.lookup("www.rmtl.org");
        assert_eq!(rmtl.year_path(2019), "/blog/2019");
        assert_eq!(rmtl.base_url, "https://www.rmtl.org/blog/");
    }

    #[test]
    fn test_builtin_selectors_parse() {
        let registry = SiteRegistry::builtin();
        for host in registry.hosts() {
            registry.lookup(host).validate(host).unwrap();
        }
    }

    #[test]
    fn test_overlay_replaces_and_appends() {
        let yaml = r#"
tatoli.tl:
  title_selectors: ["h1.headline"]
  base_url: "https://tatoli.tl/"
news.example.org:
  list_selectors: [".story a"]
  base_path: "/archive/{year}"
  base_url: "https://news.example.org/"
"#;
        let registry = SiteRegistry::builtin().overlay_yaml(yaml).unwrap();
        let hosts: Vec<&str> = registry.hosts().collect();
        assert_eq!(
            hosts,
            vec!["tatoli.tl", "thediliweekly.com", "www.rmtl.org", "news.example.org"]
        );

        let tatoli = registry.lookup("tatoli.tl");
        assert_eq!(tatoli.title_selectors, vec!["h1.headline"]);
        assert_eq!(tatoli.list_selectors, SiteProfile::default().list_selectors);

        let added = registry.lookup("news.example.org");
        assert_eq!(added.list_selectors, vec![".story a"]);
        assert_eq!(added.year_path(2021), "/archive/2021");
        assert!(registry.contains("news.example.org"));
    }

    #[test]
    fn test_overlay_rejects_bad_selector() {
        let yaml = "bad.example:\n  title_selectors: [\"h1[\"]\n";
        let err = SiteRegistry::builtin().overlay_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("bad.example"));
    }

    #[test]
    fn test_overlay_rejects_unknown_field() {
        let yaml = "x.example:\n  titel_selectors: [\"h1\"]\n";
        assert!(SiteRegistry::builtin().overlay_yaml(yaml).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.yaml");
        std::fs::write(&path, "local.test:\n  base_url: \"http://local.test/\"\n").unwrap();
        let registry = SiteRegistry::load(&path).unwrap();
        assert_eq!(registry.lookup("local.test").base_url, "http://local.test/");
    }
}
