//! Link discovery across the paginated news listing.
//!
//! Pagination is a small state machine:
//!
//! ```text
//!            links extracted, "next" clicked
//!   Listing ─────────────────────────────────▶ AwaitingNav
//!      ▲                                           │
//!      └──────────── navigation settled ───────────┘
//!   Listing ── no "next" / click failed / cap ──▶ Done
//!   AwaitingNav ── navigation failed ──────────▶ Done
//! ```
//!
//! Links are kept in an insertion-ordered set, so overlapping pages never
//! produce duplicates and discovery order is preserved.

use crate::browser::PageDriver;
use crate::error::BrowserError;
use crate::profile::SiteProfile;
use crate::utils::resolve_link;
use indexmap::IndexSet;
use scraper::Html;
use tracing::{debug, info, instrument, warn};

/// Where the pagination loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageState {
    /// A listing page is loaded and its links have not been read yet.
    Listing,
    /// A "next" control was clicked; its navigation has not settled yet.
    AwaitingNav,
    Done,
}

/// Result of a discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// Absolute article URLs in discovery order, without duplicates.
    pub links: Vec<String>,
    pub pages_visited: usize,
}

pub struct LinkDiscoverer<'a> {
    profile: &'a SiteProfile,
}

impl<'a> LinkDiscoverer<'a> {
    pub fn new(profile: &'a SiteProfile) -> Self {
        Self { profile }
    }

    /// Walk every listing page starting at `listing_url`.
    ///
    /// Failing to load the first page, or to read any page's HTML, is fatal.
    /// Failing to find, click or follow a "next" control just ends pagination.
    ///
    /// # Arguments
    ///
    /// * `driver` - Browser tab used for every listing page
    /// * `listing_url` - Absolute URL of the first listing page
    ///
    /// # Returns
    ///
    /// A [`Discovery`] holding absolute article URLs in first-seen order and
    /// the number of listing pages read.
    #[instrument(level = "info", skip(self, driver))]
    pub async fn discover(
        &self,
        driver: &mut dyn PageDriver,
        listing_url: &str,
    ) -> Result<Discovery, BrowserError> {
        driver.goto(listing_url).await?;
        info!("Accessing news listing");

        let mut links = IndexSet::new();
        let mut pages_visited = 0usize;
        let mut state = PageState::Listing;

        while state != PageState::Done {
            state = match state {
                PageState::Listing => {
                    let html = driver.html().await?;
                    pages_visited += 1;
                    let added = collect_links(&html, self.profile, &mut links);
                    info!(
                        page = pages_visited,
                        added,
                        total = links.len(),
                        "Page {pages_visited}: found {} articles so far",
                        links.len()
                    );
                    if self.at_page_cap(pages_visited) {
                        warn!(
                            max_pages = self.profile.listing.max_pages,
                            "Page cap reached; stopping pagination"
                        );
                        PageState::Done
                    } else {
                        self.click_next(driver, pages_visited + 1).await
                    }
                }
                PageState::AwaitingNav => match driver.wait_for_navigation().await {
                    Ok(()) => PageState::Listing,
                    Err(e) => {
                        info!(error = %e, "Pagination ended on navigation failure");
                        PageState::Done
                    }
                },
                PageState::Done => PageState::Done,
            };
        }

        info!(total = links.len(), pages = pages_visited, "Link discovery finished");
        Ok(Discovery {
            links: links.into_iter().collect(),
            pages_visited,
        })
    }

    /// One-shot scan of the root page for anchors that look like articles.
    ///
    /// Used when the listing produced nothing. Errors are logged and whatever
    /// was collected so far is returned.
    #[instrument(level = "info", skip_all)]
    pub async fn scan_root(&self, driver: &mut dyn PageDriver) -> Vec<String> {
        let root = self.profile.root_url.as_str();
        let html = match load(driver, root).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url = %root, error = %e, "Root page scan failed");
                return Vec::new();
            }
        };

        let doc = Html::parse_document(&html);
        let mut links = IndexSet::new();
        let hrefs = self
            .profile
            .root_anchors
            .first_match(&doc)
            .map(|hit| hit.into_list())
            .unwrap_or_default();
        for href in hrefs {
            if !self.profile.is_article_path(&href) {
                continue;
            }
            if let Some(url) = resolve_link(&self.profile.origin, &href) {
                if links.insert(url.clone()) {
                    debug!(%url, "Found article on root page");
                }
            }
        }
        info!(count = links.len(), "Root page scan finished");
        links.into_iter().collect()
    }

    fn at_page_cap(&self, pages_visited: usize) -> bool {
        let cap = self.profile.listing.max_pages;
        cap != 0 && pages_visited >= cap
    }

    /// Try each next-page locator in order and click the first one found.
    async fn click_next(&self, driver: &mut dyn PageDriver, next_page: usize) -> PageState {
        for locator in &self.profile.listing.next_page {
            match driver.click(locator).await {
                Ok(true) => {
                    info!(page = next_page, ?locator, "Moving to page {next_page}");
                    return PageState::AwaitingNav;
                }
                Ok(false) => continue,
                Err(e) => {
                    info!(?locator, error = %e, "Pagination ended on click failure");
                    return PageState::Done;
                }
            }
        }
        info!("No next page control found; finishing pagination");
        PageState::Done
    }
}

async fn load(driver: &mut dyn PageDriver, url: &str) -> Result<String, BrowserError> {
    driver.goto(url).await?;
    driver.html().await
}

/// Add the links of one listing page to `links`; returns how many were new.
fn collect_links(html: &str, profile: &SiteProfile, links: &mut IndexSet<String>) -> usize {
    let doc = Html::parse_document(html);
    let Some(hit) = profile.listing.links.first_match(&doc) else {
        debug!("No listing tier matched this page");
        return 0;
    };
    let fallback = hit.tier == profile.listing.fallback_tier;
    debug!(tier = hit.tier, fallback, "Listing tier matched");

    let mut added = 0;
    for href in hit.into_list() {
        if fallback && !profile.is_article_path(&href) {
            continue;
        }
        if let Some(url) = resolve_link(&profile.origin, &href) {
            if links.insert(url.clone()) {
                debug!(%url, "Found article");
                added += 1;
            }
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fixture::FixtureDriver;
    use crate::config::ScraperConfig;

    const LISTING: &str = "https://tdmu.edu.vn/tin-tuc";

    fn profile() -> SiteProfile {
        SiteProfile::compile(&ScraperConfig::default()).unwrap()
    }

    fn rows(hrefs: &[&str], next: Option<&str>) -> String {
        let items: String = hrefs
            .iter()
            .map(|h| format!(r#"<div class="views-row"><a href="{h}">{h}</a></div>"#))
            .collect();
        let pager = next
            .map(|n| format!(r#"<ul class="pager"><li class="pager-next"><a href="{n}">›</a></li></ul>"#))
            .unwrap_or_default();
        format!(r#"<html><body><div class="view-content">{items}</div>{pager}</body></html>"#)
    }

    #[test]
    fn test_collect_links_resolves_and_dedups() {
        let profile = profile();
        let mut links = IndexSet::new();
        let first = rows(&["/tin-tuc/a", "/tin-tuc/b"], None);
        let second = rows(&["/tin-tuc/b", "https://tdmu.edu.vn/tin-tuc/c"], None);

        assert_eq!(collect_links(&first, &profile, &mut links), 2);
        assert_eq!(collect_links(&second, &profile, &mut links), 1);
        let links: Vec<_> = links.into_iter().collect();
        assert_eq!(
            links,
            vec![
                "https://tdmu.edu.vn/tin-tuc/a",
                "https://tdmu.edu.vn/tin-tuc/b",
                "https://tdmu.edu.vn/tin-tuc/c",
            ]
        );
    }

    #[test]
    fn test_collect_links_container_tiers_in_order() {
        let profile = profile();
        let html = r#"
            <article><a href="/tin-tuc/from-article">x</a></article>
            <div class="news-item"><a href="/tin-tuc/from-news-item">y</a></div>"#;
        let mut links = IndexSet::new();
        collect_links(html, &profile, &mut links);
        assert_eq!(links.len(), 1);
        assert!(links.contains("https://tdmu.edu.vn/tin-tuc/from-article"));
    }

    #[test]
    fn test_collect_links_fallback_filters_paths() {
        let profile = profile();
        let html = r#"<div class="region-content">
            <a href="/tin-tuc/le-khai-giang">a</a>
            <a href="/gioi-thieu">about</a>
            <a href="/thong-bao/lich-thi">b</a>
            <a href="/tin-tuc/le-khai-giang">dup</a>
        </div>"#;
        let mut links = IndexSet::new();
        assert_eq!(collect_links(html, &profile, &mut links), 2);
        assert!(links.iter().all(|l| l.contains("/tin-tuc/") || l.contains("/thong-bao/")));
    }

    #[tokio::test]
    async fn test_three_pages_then_stop() {
        let profile = profile();
        let mut driver = FixtureDriver::new()
            .page(LISTING, &rows(&["/tin-tuc/1", "/tin-tuc/2"], Some("/tin-tuc?page=1")))
            .page(
                "https://tdmu.edu.vn/tin-tuc?page=1",
                &rows(&["/tin-tuc/2", "/tin-tuc/3"], Some("/tin-tuc?page=2")),
            )
            .page("https://tdmu.edu.vn/tin-tuc?page=2", &rows(&["/tin-tuc/4"], None));

        let discovery = LinkDiscoverer::new(&profile)
            .discover(&mut driver, LISTING)
            .await
            .unwrap();

        assert_eq!(discovery.pages_visited, 3);
        assert_eq!(driver.visits.len(), 3);
        assert_eq!(discovery.links.len(), 4);
        assert!(discovery.links.iter().all(|l| l.starts_with("https://tdmu.edu.vn/tin-tuc/")));
    }

    #[tokio::test]
    async fn test_text_locator_used_when_no_pager_class() {
        let profile = profile();
        let first = r#"<div class="view-content"><div class="views-row"><a href="/tin-tuc/1">1</a></div></div>
            <a href="/tin-tuc?page=1">Trang Tiếp</a>"#;
        let mut driver = FixtureDriver::new()
            .page(LISTING, first)
            .page("https://tdmu.edu.vn/tin-tuc?page=1", &rows(&["/tin-tuc/2"], None));

        let discovery = LinkDiscoverer::new(&profile)
            .discover(&mut driver, LISTING)
            .await
            .unwrap();
        assert_eq!(discovery.pages_visited, 2);
        assert_eq!(discovery.links.len(), 2);
    }

    #[tokio::test]
    async fn test_navigation_failure_ends_pagination() {
        let profile = profile();
        let mut driver = FixtureDriver::new()
            .page(LISTING, &rows(&["/tin-tuc/1"], Some("/tin-tuc?page=1")))
            .timeout_on("https://tdmu.edu.vn/tin-tuc?page=1");

        let discovery = LinkDiscoverer::new(&profile)
            .discover(&mut driver, LISTING)
            .await
            .unwrap();
        assert_eq!(discovery.pages_visited, 1);
        assert_eq!(discovery.links, vec!["https://tdmu.edu.vn/tin-tuc/1"]);
    }

    #[tokio::test]
    async fn test_click_failure_ends_pagination() {
        let profile = profile();
        let second = "https://tdmu.edu.vn/tin-tuc?page=1";
        let mut driver = FixtureDriver::new()
            .page(LISTING, &rows(&["/tin-tuc/1", "/tin-tuc/2"], Some("/tin-tuc?page=1")))
            .page(second, &rows(&["/tin-tuc/3"], Some("/tin-tuc?page=2")))
            .page("https://tdmu.edu.vn/tin-tuc?page=2", &rows(&["/tin-tuc/4"], None))
            .fail_click_on(second);

        let discovery = LinkDiscoverer::new(&profile)
            .discover(&mut driver, LISTING)
            .await
            .unwrap();
        assert_eq!(discovery.pages_visited, 2);
        assert_eq!(driver.clicks, 1);
        assert_eq!(
            discovery.links,
            vec![
                "https://tdmu.edu.vn/tin-tuc/1",
                "https://tdmu.edu.vn/tin-tuc/2",
                "https://tdmu.edu.vn/tin-tuc/3",
            ]
        );
    }

    #[tokio::test]
    async fn test_first_page_failure_is_fatal() {
        let profile = profile();
        let mut driver = FixtureDriver::new().timeout_on(LISTING);
        let err = LinkDiscoverer::new(&profile)
            .discover(&mut driver, LISTING)
            .await
            .unwrap_err();
        assert!(matches!(err, BrowserError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_page_cap_stops_self_linking_pager() {
        let mut config = ScraperConfig::default();
        config.listing.max_pages = 4;
        let profile = SiteProfile::compile(&config).unwrap();
        // The "next" control always points back to the same page.
        let mut driver = FixtureDriver::new().page(LISTING, &rows(&["/tin-tuc/1"], Some("/tin-tuc")));

        let discovery = LinkDiscoverer::new(&profile)
            .discover(&mut driver, LISTING)
            .await
            .unwrap();
        assert_eq!(discovery.pages_visited, 4);
        assert_eq!(discovery.links.len(), 1);
        assert_eq!(driver.clicks, 3);
    }

    #[tokio::test]
    async fn test_scan_root_filters_and_dedups() {
        let profile = profile();
        let root = r#"<nav><a href="/tin-tuc/a">a</a><a href="/lien-he">contact</a></nav>
            <footer><a href="/tin-tuc/a">again</a><a href="/news/b">b</a></footer>"#;
        let mut driver = FixtureDriver::new().page("https://tdmu.edu.vn", root);

        let links = LinkDiscoverer::new(&profile).scan_root(&mut driver).await;
        assert_eq!(
            links,
            vec!["https://tdmu.edu.vn/tin-tuc/a", "https://tdmu.edu.vn/news/b"]
        );
    }

    #[tokio::test]
    async fn test_scan_root_failure_is_empty() {
        let profile = profile();
        let mut driver = FixtureDriver::new();
        assert!(LinkDiscoverer::new(&profile).scan_root(&mut driver).await.is_empty());
    }
}
