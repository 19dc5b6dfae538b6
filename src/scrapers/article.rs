//! Field extraction for a single article page.

use crate::browser::PageDriver;
use crate::cascade::Hit;
use crate::error::BrowserError;
use crate::models::{
    ArticleOutcome, ArticleRecord, ExtractFailure, NO_AUTHOR, NO_CONTENT, NO_DATE, NO_TITLE,
};
use crate::profile::SiteProfile;
use crate::utils::resolve_image_src;
use scraper::Html;
use tracing::{debug, info, instrument, warn};

pub struct ArticleExtractor<'a> {
    profile: &'a SiteProfile,
}

impl<'a> ArticleExtractor<'a> {
    pub fn new(profile: &'a SiteProfile) -> Self {
        Self { profile }
    }

    /// Load `url` and extract its fields.
    ///
    /// Never fails outright: a page that cannot be loaded or read comes back
    /// as [`ArticleOutcome::Failed`] with the reason attached.
    #[instrument(level = "info", skip(self, driver))]
    pub async fn extract(&self, driver: &mut dyn PageDriver, url: &str) -> ArticleOutcome {
        match load(driver, url).await {
            Ok(html) => ArticleOutcome::Scraped(self.parse(url, &html)),
            Err(e) => {
                warn!(error = %e, "Error scraping article");
                ArticleOutcome::Failed(ExtractFailure::from_browser(url, &e))
            }
        }
    }

    /// Run every field cascade over an already rendered document.
    pub fn parse(&self, url: &str, html: &str) -> ArticleRecord {
        let doc = Html::parse_document(html);
        let rules = &self.profile.article;

        let image_urls: Vec<String> = rules
            .images
            .first_match(&doc)
            .map(Hit::into_list)
            .unwrap_or_default()
            .iter()
            .map(|src| resolve_image_src(&self.profile.origin, src))
            .collect();

        let record = ArticleRecord {
            url: url.to_string(),
            title: rules.title.text_or(&doc, NO_TITLE),
            date: rules.date.text_or(&doc, NO_DATE),
            author: rules.author.text_or(&doc, NO_AUTHOR),
            content: rules.content.text_or(&doc, NO_CONTENT),
            image_urls,
        };
        debug!(
            title = %record.title,
            content_bytes = record.content.len(),
            images = record.image_urls.len(),
            "Parsed article"
        );
        record
    }
}

async fn load(driver: &mut dyn PageDriver, url: &str) -> Result<String, BrowserError> {
    driver.goto(url).await?;
    info!(%url, "Accessing article");
    driver.html().await
}
