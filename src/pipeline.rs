//! One complete scraping run: discover links, extract every article.
//!
//! # Steps
//!
//! 1. Walk the listing pagination with [`LinkDiscoverer::discover`]
//! 2. If that found nothing, scan the site root once for article-like links
//! 3. Extract each link in discovery order, pausing between articles
//!
//! Only a failure to load the first listing page (or to launch the browser)
//! aborts a run. Every discovered link yields exactly one record, either
//! scraped or error-flagged, so the output always lines up with discovery.

use crate::browser::{ChromeSession, PageDriver};
use crate::config::{BrowserSettings, ScraperConfig};
use crate::error::ScrapeError;
use crate::models::{ArticleOutcome, ArticleRecord};
use crate::profile::SiteProfile;
use crate::scrapers::article::ArticleExtractor;
use crate::scrapers::listing::LinkDiscoverer;
use crate::utils::truncate_for_log;
use std::path::Path;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Load the site profile and browser settings for a run.
///
/// # Arguments
///
/// * `config_path` - Optional YAML file overriding the built-in TDMU profile
/// * `chrome` - Optional Chromium executable, taking precedence over the file
///
/// # Returns
///
/// The compiled [`SiteProfile`] and the browser settings to launch with, or
/// [`ScrapeError::Config`] when the file cannot be read or holds an invalid
/// selector, pattern or URL.
#[instrument(level = "info", skip_all)]
pub async fn prepare(
    config_path: Option<&Path>,
    chrome: Option<&Path>,
) -> Result<(SiteProfile, BrowserSettings), ScrapeError> {
    let mut config = ScraperConfig::load_or_default(config_path).await?;
    if let Some(chrome) = chrome {
        config.browser.executable = Some(chrome.to_path_buf());
    }
    let profile = SiteProfile::compile(&config)?;
    Ok((profile, config.browser))
}

/// Scrape the whole site through an already open browser tab.
///
/// # Arguments
///
/// * `driver` - The tab to drive; it stays open when this returns
/// * `profile` - Compiled selectors, URLs and pacing for the site
///
/// # Returns
///
/// One [`ArticleRecord`] per discovered link, in discovery order; failed
/// articles are error-flagged records. An empty list when no links were found
/// anywhere. [`ScrapeError::Discovery`] when the first listing page fails.
#[instrument(level = "info", skip_all, fields(listing_url = %profile.listing_url))]
pub async fn scrape_site(
    driver: &mut dyn PageDriver,
    profile: &SiteProfile,
) -> Result<Vec<ArticleRecord>, ScrapeError> {
    let start = Instant::now();
    let discoverer = LinkDiscoverer::new(profile);

    let discovery = discoverer
        .discover(driver, &profile.listing_url)
        .await
        .map_err(ScrapeError::Discovery)?;
    debug!(pages = discovery.pages_visited, "Listing pages walked");

    let mut links = discovery.links;
    if links.is_empty() {
        warn!("No article links found on listing pages; trying the home page");
        links = discoverer.scan_root(driver).await;
    }
    if links.is_empty() {
        warn!("No article links found anywhere");
        return Ok(Vec::new());
    }

    let extractor = ArticleExtractor::new(profile);
    let total = links.len();
    let mut records = Vec::with_capacity(total);
    let mut failed = 0usize;

    for (i, url) in links.iter().enumerate() {
        info!(index = i + 1, total, %url, "Scraping article {}/{}", i + 1, total);
        let outcome = extractor.extract(driver, url).await;
        if let ArticleOutcome::Failed(failure) = &outcome {
            failed += 1;
            warn!(
                url = %outcome.url(),
                kind = %failure.kind,
                transient = failure.kind.is_transient(),
                message = %truncate_for_log(&failure.message, 200),
                "Article recorded as error"
            );
        }
        records.push(outcome.into_record());

        if i + 1 < total && !profile.politeness_delay.is_zero() {
            sleep(profile.politeness_delay).await;
        }
    }

    info!(
        articles = records.len(),
        failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Scraping run finished"
    );
    Ok(records)
}

/// Launch a browser, run [`scrape_site`], and close the browser on every path.
pub async fn run_with_browser(
    profile: &SiteProfile,
    settings: &BrowserSettings,
) -> Result<Vec<ArticleRecord>, ScrapeError> {
    let mut session = ChromeSession::launch(settings).await?;
    let result = scrape_site(&mut session, profile).await;
    session.close().await;
    result
}
