//! Browser capability used by the discoverer and the extractor.
//!
//! Scraping code never talks to Chromium directly. It receives a
//! [`PageDriver`] and uses four primitives on a single tab: navigate and
//! settle, read the rendered HTML, click something, wait for the click's
//! navigation to settle. [`chrome::ChromeSession`] drives a real headless
//! Chromium; tests use an in-memory fixture driver instead.

use crate::cascade::compile_selector;
use crate::error::{BrowserError, ConfigError};
use async_trait::async_trait;

pub mod chrome;
#[cfg(test)]
pub mod fixture;

pub use chrome::ChromeSession;

/// How to find a clickable element on the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// First element matching a CSS selector.
    Css(String),
    /// First anchor whose text contains the label.
    Text(String),
}

impl Locator {
    /// Parse a configured locator: `text:<label>` or a CSS selector.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        match spec.strip_prefix("text:") {
            Some(label) => Ok(Locator::Text(label.to_string())),
            None => {
                compile_selector(spec)?;
                Ok(Locator::Css(spec.to_string()))
            }
        }
    }
}

/// A single controllable browser tab.
#[async_trait]
pub trait PageDriver: Send {
    /// Navigate to `url` and wait until the page has settled.
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Rendered HTML of the current page.
    async fn html(&mut self) -> Result<String, BrowserError>;

    /// Click the first element matching `locator`.
    ///
    /// Returns `Ok(false)` when nothing on the page matches.
    async fn click(&mut self, locator: &Locator) -> Result<bool, BrowserError>;

    /// Wait for the navigation triggered by the last click to settle.
    async fn wait_for_navigation(&mut self) -> Result<(), BrowserError>;
}
