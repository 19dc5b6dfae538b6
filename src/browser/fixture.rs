//! In-memory [`PageDriver`] serving static HTML pages for tests.

use super::{Locator, PageDriver};
use crate::cascade::element_text;
use crate::error::BrowserError;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use url::Url;

#[derive(Debug, Default)]
pub struct FixtureDriver {
    pages: HashMap<String, String>,
    timeouts: HashSet<String>,
    broken_clicks: HashSet<String>,
    current: Option<String>,
    pending: Option<String>,
    /// Every URL that finished loading, in order.
    pub visits: Vec<String>,
    pub clicks: usize,
}

impl FixtureDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Loading `url` times out.
    pub fn timeout_on(mut self, url: &str) -> Self {
        self.timeouts.insert(url.to_string());
        self
    }

    /// Any click while `url` is the current page fails.
    pub fn fail_click_on(mut self, url: &str) -> Self {
        self.broken_clicks.insert(url.to_string());
        self
    }

    fn load(&mut self, url: &str) -> Result<(), BrowserError> {
        if self.timeouts.contains(url) {
            return Err(BrowserError::Timeout {
                what: format!("navigation to {url}"),
                timeout: Duration::from_secs(30),
            });
        }
        if !self.pages.contains_key(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "404 Not Found".to_string(),
            });
        }
        self.current = Some(url.to_string());
        self.visits.push(url.to_string());
        Ok(())
    }

    fn find_href(&self, locator: &Locator) -> Option<String> {
        let current = self.current.as_ref()?;
        let doc = Html::parse_document(self.pages.get(current)?);
        let href = match locator {
            Locator::Css(css) => {
                let selector = Selector::parse(css).ok()?;
                doc.select(&selector).next()?.value().attr("href")?.to_string()
            }
            Locator::Text(label) => {
                let anchors = Selector::parse("a").ok()?;
                doc.select(&anchors)
                    .find(|a| element_text(*a).contains(label.as_str()))?
                    .value()
                    .attr("href")?
                    .to_string()
            }
        };
        let base = Url::parse(current).ok()?;
        base.join(&href).ok().map(|u| u.to_string())
    }
}

#[async_trait]
impl PageDriver for FixtureDriver {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        self.load(url)
    }

    async fn html(&mut self) -> Result<String, BrowserError> {
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .cloned()
            .ok_or_else(|| BrowserError::Protocol("no page loaded".to_string()))
    }

    async fn click(&mut self, locator: &Locator) -> Result<bool, BrowserError> {
        if self.current.as_ref().is_some_and(|url| self.broken_clicks.contains(url)) {
            return Err(BrowserError::Protocol("element is not clickable".to_string()));
        }
        match self.find_href(locator) {
            Some(href) => {
                self.clicks += 1;
                self.pending = Some(href);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn wait_for_navigation(&mut self) -> Result<(), BrowserError> {
        let target = self
            .pending
            .take()
            .ok_or_else(|| BrowserError::Protocol("no pending navigation".to_string()))?;
        self.load(&target)
    }
}
