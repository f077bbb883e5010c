//! Year-by-year listing pagination for one site.
//!
//! # URL Pattern
//!
//! Listing pages follow the WordPress archive layout:
//!
//! ```text
//! {scheme}://{host}{base_path(year)}/              page 1
//! {scheme}://{host}{base_path(year)}/page/{n}/     page n > 1
//! ```
//!
//! Pagination for a year ends at the first page that cannot be fetched,
//! does not return 200, or contains no article links.

use super::article::extract_article;
use super::links::extract_links;
use crate::config::SiteProfile;
use crate::http::Fetch;
use crate::models::Article;
use crate::utils::{truncate_for_log, year_in_url};
use scraper::Html;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Crawls sites one request at a time, pausing `rate` after every article and every year.
#[derive(Debug)]
pub struct Crawler<F> {
    fetcher: F,
    years: Vec<u16>,
    rate: Duration,
}

/// `host[:port]` of `url`, the key used for profiles and [`Article::source`].
pub fn site_host(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// URL of listing page `page` for `year`.
pub fn listing_url(base: &Url, host: &str, profile: &SiteProfile, year: u16, page: u32) -> String {
    let root = format!("{}://{}{}", base.scheme(), host, profile.year_path(year));
    if page == 1 {
        format!("{root}/")
    } else {
        format!("{root}/page/{page}/")
    }
}

impl<F: Fetch> Crawler<F> {
    pub fn new(fetcher: F, years: Vec<u16>, rate: Duration) -> Self {
        Self {
            fetcher,
            years,
            rate,
        }
    }

    /// Crawl every configured year of the site at `start_url`.
    ///
    /// Years are walked in order, each one page at a time until a listing page
    /// is missing, not 200, or has no article links. The crawler pauses for
    /// `rate` after every article request and after every year.
    ///
    /// # Arguments
    ///
    /// * `start_url` - Absolute URL of the site; a `/NNNN/` segment narrows the crawl to that year alone
    /// * `profile` - Selectors and listing path of the site
    ///
    /// # Returns
    ///
    /// Every article that could be fetched, in crawl order. Empty when
    /// `start_url` is not an absolute URL.
    #[instrument(level = "info", skip(self, profile))]
    pub async fn crawl_site(&self, start_url: &str, profile: &SiteProfile) -> Vec<Article> {
        let Some((base, host)) = Url::parse(start_url)
            .ok()
            .and_then(|u| site_host(&u).map(|h| (u, h)))
        else {
            warn!("Start URL is not an absolute URL; nothing to crawl");
            return Vec::new();
        };

        let years = match year_in_url(start_url) {
            Some(year) => {
                info!(year, "Start URL names a year; crawling it alone");
                vec![year]
            }
            None => self.years.clone(),
        };

        let mut results = Vec::new();
        for year in years {
            self.crawl_year(&base, &host, profile, year, &mut results).await;
            sleep(self.rate).await;
        }
        results
    }

    async fn crawl_year(
        &self,
        base: &Url,
        host: &str,
        profile: &SiteProfile,
        year: u16,
        results: &mut Vec<Article>,
    ) {
        let mut page = 1u32;
        loop {
            let url = listing_url(base, host, profile, year, page);
            info!(page, year, %host, "Crawling listing page");

            let listing = match self.fetcher.fetch(&url).await {
                Some(listing) if listing.is_ok() => listing,
                other => {
                    info!(
                        year,
                        %host,
                        status = ?other.map(|p| p.status),
                        "No more pages"
                    );
                    break;
                }
            };

            let links = resolve_links(&url, &listing.body, &profile.list_selectors);
            if links.is_empty() {
                info!(page, year, %host, "No article links on page");
                break;
            }
            debug!(page, count = links.len(), "Found article links");

            for link in links {
                if let Some(article) = self.fetch_article(&link, profile, host).await {
                    info!(
                        n = results.len() + 1,
                        title = %truncate_for_log(&article.title, 50),
                        "Processed article"
                    );
                    results.push(article);
                }
                sleep(self.rate).await;
            }
            page += 1;
        }
    }

    async fn fetch_article(&self, link: &str, profile: &SiteProfile, host: &str) -> Option<Article> {
        let page = self.fetcher.fetch(link).await?;
        if !page.is_ok() {
            debug!(%link, status = page.status, "Skipping article");
            return None;
        }
        if page.url != link {
            debug!(%link, final_url = %page.url, "Article redirected");
        }
        let document = Html::parse_document(&page.body);
        Some(extract_article(&document, profile, link, host))
    }
}

/// Article links on a listing page, resolved against the listing URL.
fn resolve_links(listing_url: &str, body: &str, selectors: &[String]) -> Vec<String> {
    let Ok(base) = Url::parse(listing_url) else {
        return Vec::new();
    };
    let document = Html::parse_document(body);
    extract_links(&document, selectors)
        .into_iter()
        .filter_map(|href| match base.join(&href) {
            Ok(resolved) => Some(resolved.to_string()),
            Err(e) => {
                debug!(%href, error = %e, "Dropping unresolvable link");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{FetchConfig, HttpFetcher, Page, RetryPolicy};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// In-memory site: unknown URLs are unreachable.
    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, (u16, String)>,
        requested: RefCell<Vec<String>>,
    }

    impl FakeSite {
        fn page(mut self, url: &str, status: u16, body: &str) -> Self {
            self.pages.insert(url.to_string(), (status, body.to_string()));
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.borrow().clone()
        }
    }

    impl Fetch for FakeSite {
        async fn fetch(&self, url: &str) -> Option<Page> {
            self.requested.borrow_mut().push(url.to_string());
            self.pages.get(url).map(|(status, body)| Page {
                url: url.to_string(),
                status: *status,
                body: body.clone(),
            })
        }
    }

    fn listing(hrefs: &[&str]) -> String {
        let items: String = hrefs
            .iter()
            .map(|h| format!(r#"<article><h2><a href="{h}">link</a></h2></article>"#))
            .collect();
        format!("<html><body>{items}</body></html>")
    }

    fn story(title: &str) -> String {
        format!(r#"<html><body><h1>{title}</h1><div class="entry-content"><p>{title} body</p></div></body></html>"#)
    }

    fn crawler(site: FakeSite, years: &[u16]) -> Crawler<FakeSite> {
        Crawler::new(site, years.to_vec(), Duration::ZERO)
    }

    #[test]
    fn test_listing_url_shapes() {
        let base = Url::parse("https://www.rmtl.org/blog/").unwrap();
        let profile = SiteProfile {
            base_path: "/blog/{year}".to_string(),
            ..SiteProfile::default()
        };
        assert_eq!(
            listing_url(&base, "www.rmtl.org", &profile, 2019, 1),
            "https://www.rmtl.org/blog/2019/"
        );
        assert_eq!(
            listing_url(&base, "www.rmtl.org", &profile, 2019, 3),
            "https://www.rmtl.org/blog/2019/page/3/"
        );
    }

    #[test]
    fn test_site_host_keeps_port() {
        assert_eq!(
            site_host(&Url::parse("http://127.0.0.1:8080/x").unwrap()).as_deref(),
            Some("127.0.0.1:8080")
        );
        assert_eq!(
            site_host(&Url::parse("https://tatoli.tl/").unwrap()).as_deref(),
            Some("tatoli.tl")
        );
    }

    #[tokio::test]
    async fn test_pagination_stops_at_non_200_and_keeps_earlier_articles() {
        let site = FakeSite::default()
            .page("https://news.test/2020/", 200, &listing(&["/2020/a/", "/2020/b/"]))
            .page("https://news.test/2020/page/2/", 200, &listing(&["/2020/c/"]))
            .page("https://news.test/2020/page/3/", 404, "")
            .page("https://news.test/2020/page/4/", 200, &listing(&["/2020/d/"]))
            .page("https://news.test/2020/a/", 200, &story("A"))
            .page("https://news.test/2020/b/", 200, &story("B"))
            .page("https://news.test/2020/c/", 200, &story("C"))
            .page("https://news.test/2020/d/", 200, &story("D"));
        let crawler = crawler(site, &[2020]);

        let articles = crawler
            .crawl_site("https://news.test/", &SiteProfile::default())
            .await;

        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert_eq!(articles[0].link, "https://news.test/2020/a/");
        assert_eq!(articles[0].source, "news.test");
        assert_eq!(articles[0].content, "A body");
        assert!(
            !crawler
                .fetcher
                .requested()
                .contains(&"https://news.test/2020/page/4/".to_string())
        );
    }

    #[tokio::test]
    async fn test_pagination_stops_at_page_without_links() {
        let site = FakeSite::default()
            .page("https://news.test/2021/", 200, &listing(&["/2021/a/"]))
            .page("https://news.test/2021/page/2/", 200, "<html><body>empty</body></html>")
            .page("https://news.test/2021/page/3/", 200, &listing(&["/2021/z/"]))
            .page("https://news.test/2021/a/", 200, &story("A"));
        let crawler = crawler(site, &[2021]);

        let articles = crawler
            .crawl_site("https://news.test/", &SiteProfile::default())
            .await;

        assert_eq!(articles.len(), 1);
        assert_eq!(
            crawler.fetcher.requested(),
            vec![
                "https://news.test/2021/",
                "https://news.test/2021/a/",
                "https://news.test/2021/page/2/",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_articles_are_skipped() {
        let site = FakeSite::default()
            .page("https://news.test/2022/", 200, &listing(&["/gone/", "/ok/", "/down/"]))
            .page("https://news.test/gone/", 404, "")
            .page("https://news.test/ok/", 200, &story("Ok"));
        let crawler = crawler(site, &[2022]);

        let articles = crawler
            .crawl_site("https://news.test/", &SiteProfile::default())
            .await;

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Ok");
    }

    #[tokio::test]
    async fn test_years_crawled_in_order() {
        let site = FakeSite::default()
            .page("https://news.test/2016/", 200, &listing(&["/2016/x/"]))
            .page("https://news.test/2016/x/", 200, &story("Old"))
            .page("https://news.test/2017/", 200, &listing(&["/2017/y/"]))
            .page("https://news.test/2017/y/", 200, &story("New"));
        let crawler = crawler(site, &[2015, 2016, 2017]);

        let articles = crawler
            .crawl_site("https://news.test/", &SiteProfile::default())
            .await;

        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Old", "New"]);
        assert_eq!(crawler.fetcher.requested()[0], "https://news.test/2015/");
    }

    #[tokio::test(start_paused = true)]
    async fn test_pauses_after_every_article_and_every_year() {
        let site = FakeSite::default()
            .page("https://news.test/2020/", 200, &listing(&["/ok/", "/gone/", "/down/"]))
            .page("https://news.test/ok/", 200, &story("Ok"))
            .page("https://news.test/gone/", 404, "")
            .page("https://news.test/2021/", 200, &listing(&["/later/"]))
            .page("https://news.test/later/", 200, &story("Later"));
        let rate = Duration::from_secs(2);
        let crawler = Crawler::new(site, vec![2020, 2021], rate);

        let t0 = tokio::time::Instant::now();
        let articles = crawler
            .crawl_site("https://news.test/", &SiteProfile::default())
            .await;
        let elapsed = t0.elapsed();

        // Four article fetches (two of them failed) and two years.
        assert_eq!(articles.len(), 2);
        assert!(elapsed >= rate * 6, "elapsed {elapsed:?}");
        assert!(elapsed < rate * 7, "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn test_year_in_start_url_overrides_requested_years() {
        let site = FakeSite::default()
            .page("https://news.test/2019/", 200, &listing(&["/2019/only/"]))
            .page("https://news.test/2019/only/", 200, &story("Only"));
        let crawler = crawler(site, &[2020, 2021]);

        let articles = crawler
            .crawl_site("https://news.test/2019/", &SiteProfile::default())
            .await;

        assert_eq!(articles.len(), 1);
        assert!(
            crawler
                .fetcher
                .requested()
                .iter()
                .all(|u| u.contains("/2019/"))
        );
    }

    #[tokio::test]
    async fn test_relative_start_url_crawls_nothing() {
        let crawler = crawler(FakeSite::default(), &[2020]);
        assert!(crawler.crawl_site("", &SiteProfile::default()).await.is_empty());
        assert!(crawler.fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn test_crawl_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2019/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(listing(&[
                "first/",
                "/2019/second/",
                "first/",
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/2019/page/2/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/2019/first/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><head><meta property="article:published_time" content="2019-05-01T08:00:00Z"></head>
                <body><h1>First</h1><article><p>One</p><p>Two</p></article></body></html>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/2019/second/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(story("Second")))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(FetchConfig {
            timeout: Duration::from_secs(5),
            retry: RetryPolicy {
                max_retries: 0,
                ..RetryPolicy::default()
            },
        })
        .unwrap();
        let crawler = Crawler::new(fetcher, vec![2024], Duration::ZERO);
        let start = format!("{}/2019/", server.uri());
        let articles = crawler.crawl_site(&start, &SiteProfile::default()).await;

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "First");
        assert_eq!(articles[0].date, "2019-05-01T08:00:00Z");
        assert_eq!(articles[0].content, "One\n\nTwo");
        assert_eq!(articles[0].link, format!("{}/2019/first/", server.uri()));
        assert_eq!(articles[1].title, "Second");
        let host = server.uri().trim_start_matches("http://").to_string();
        assert_eq!(articles[1].source, host);
    }
}
