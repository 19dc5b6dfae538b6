//! Site profile configuration.
//!
//! Everything that describes *where* and *how* to scrape lives here: the site
//! origin, listing and root URLs, link path patterns, every selector cascade,
//! the next-page locators, pacing and browser settings. Defaults describe the
//! TDMU news site; an optional YAML file overrides any subset of keys.
//!
//! ```yaml
//! politeness_delay_ms: 2000
//! listing:
//!   max_pages: 20
//! article:
//!   author:
//!     - ".field-name-field-author .field-item"
//!     - selector: "meta[name=author]"
//!       extract: "attr:content"
//! ```

use crate::cascade::RuleSpec;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub site: SiteConfig,
    pub listing: ListingConfig,
    pub article: ArticleConfig,
    pub browser: BrowserSettings,
    /// Pause between two article extractions.
    pub politeness_delay_ms: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            listing: ListingConfig::default(),
            article: ArticleConfig::default(),
            browser: BrowserSettings::default(),
            politeness_delay_ms: 1000,
        }
    }
}

impl ScraperConfig {
    /// Load a YAML config file; missing keys keep their defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).await.map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw)?;
        info!("Loaded scraper configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Load `path` when given, otherwise use the built-in profile.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path).await,
            None => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Scheme and host every relative link and image is resolved against.
    pub origin: String,
    /// First page of the paginated news listing.
    pub listing_url: String,
    /// Page scanned once when the listing yields nothing.
    pub root_url: String,
    /// Regexes an href must match to count as an article in the anchor fallbacks.
    pub link_patterns: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: "https://tdmu.edu.vn".to_string(),
            listing_url: "https://tdmu.edu.vn/tin-tuc".to_string(),
            root_url: "https://tdmu.edu.vn".to_string(),
            link_patterns: strings(&["/tin-tuc/", "/news/", "/thong-bao/"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Article containers, most specific first. Bare selectors take the
    /// first anchor of every container.
    pub containers: Vec<RuleSpec>,
    /// Last-resort anchors, filtered by `site.link_patterns`.
    pub fallback_anchors: String,
    /// Next-page locators in priority order; `text:<label>` matches anchor text.
    pub next_page: Vec<String>,
    /// Upper bound on listing pages visited; 0 disables the bound.
    pub max_pages: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            containers: rules(&[".view-content .views-row", "article", ".news-item", ".article-item"]),
            fallback_anchors: "main a, .main-content a, .content-area a, .region-content a".to_string(),
            next_page: strings(&[
                "li.pager-next a",
                ".pager-next a",
                "text:Next",
                "text:next",
                "text:Tiếp",
            ]),
            max_pages: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleConfig {
    pub title: Vec<RuleSpec>,
    pub date: Vec<RuleSpec>,
    pub author: Vec<RuleSpec>,
    /// Body containers; bare selectors collect `content_blocks` descendants.
    pub content: Vec<RuleSpec>,
    pub content_blocks: String,
    /// Image selectors; bare selectors read the `src` attribute.
    pub images: Vec<RuleSpec>,
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self {
            title: rules(&[".page-header", "h1", ".article-title", ".node-title"]),
            date: rules(&[
                ".field-name-post-date .field-item",
                ".date",
                ".submitted",
                ".post-date",
                "time",
            ]),
            author: rules(&[".field-name-field-author .field-item", ".author", ".byline"]),
            content: rules(&[
                ".node-content",
                ".content",
                "article",
                ".article-content",
                ".field-name-body",
            ]),
            content_blocks: "p, div, span".to_string(),
            images: rules(&[".field-name-field-image img", "article img", ".content img"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Chromium binary; autodetected when unset.
    pub executable: Option<PathBuf>,
    pub window_width: u32,
    pub window_height: u32,
    /// Upper bound for one navigation (goto or click-triggered).
    pub navigation_timeout_secs: u64,
    /// Quiet period after a navigation before the page counts as settled.
    pub settle_ms: u64,
    /// Extra Chromium flags appended to the defaults.
    pub args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: None,
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_secs: 30,
            settle_ms: 500,
            args: strings(&[
                "--disable-setuid-sandbox",
                "--disable-dev-shm-usage",
                "--disable-accelerated-2d-canvas",
                "--disable-gpu",
            ]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn rules(items: &[&str]) -> Vec<RuleSpec> {
    items.iter().map(|s| RuleSpec::from(*s)).collect()
}
