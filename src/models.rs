//! Data models for scraped articles and extraction outcomes.
//!
//! - [`ArticleRecord`]: the persisted shape of one article
//! - [`ArticleOutcome`]: typed result of extracting one article, before it is
//!   flattened into a record for output
//! - [`ScrapeResponse`]: the JSON body returned by the HTTP trigger

use crate::error::BrowserError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NO_TITLE: &str = "No title found";
pub const NO_DATE: &str = "No date found";
pub const NO_AUTHOR: &str = "No author found";
pub const NO_CONTENT: &str = "No content found";

/// Value written into every scalar field of a record whose extraction failed.
pub const ERROR_SENTINEL: &str = "Error";

/// One scraped article as written to JSON/CSV and returned over HTTP.
///
/// Scalar fields hold a sentinel (`"No title found"`, ...) instead of an
/// empty string when nothing could be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Absolute URL of the article page.
    pub url: String,
    pub title: String,
    pub date: String,
    pub author: String,
    /// Non-empty text blocks joined by a blank line.
    pub content: String,
    /// Absolute image URLs in document order. Not deduplicated.
    pub image_urls: Vec<String>,
}

impl ArticleRecord {
    /// Build the error-flagged record used when an article could not be scraped.
    pub fn failed(url: &str, message: &str) -> Self {
        Self {
            url: url.to_string(),
            title: ERROR_SENTINEL.to_string(),
            date: ERROR_SENTINEL.to_string(),
            author: ERROR_SENTINEL.to_string(),
            content: format!("Error scraping: {message}"),
            image_urls: Vec::new(),
        }
    }

    /// True when this record came from a failed extraction.
    pub fn is_error(&self) -> bool {
        self.title == ERROR_SENTINEL && self.content.starts_with("Error scraping: ")
    }
}

/// Why an article could not be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The page did not load or settle before the navigation timeout.
    NavigationTimeout,
    /// The browser reported a navigation error (DNS, TLS, HTTP-level abort).
    Navigation,
    /// The page loaded but its rendered HTML could not be read.
    PageContent,
    Unknown,
}

impl FailureKind {
    /// Timeouts are worth retrying on a later run; the rest usually are not.
    pub fn is_transient(self) -> bool {
        matches!(self, FailureKind::NavigationTimeout)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::NavigationTimeout => "navigation timeout",
            FailureKind::Navigation => "navigation failure",
            FailureKind::PageContent => "page content failure",
            FailureKind::Unknown => "unknown failure",
        };
        f.write_str(s)
    }
}

/// A failed extraction, kept typed until the driver flattens it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractFailure {
    pub url: String,
    pub kind: FailureKind,
    pub message: String,
}

impl ExtractFailure {
    pub fn from_browser(url: &str, err: &BrowserError) -> Self {
        let kind = match err {
            BrowserError::Timeout { .. } => FailureKind::NavigationTimeout,
            BrowserError::Navigation { .. } => FailureKind::Navigation,
            BrowserError::Protocol(_) => FailureKind::PageContent,
            BrowserError::Launch(_) => FailureKind::Unknown,
        };
        Self {
            url: url.to_string(),
            kind,
            message: err.to_string(),
        }
    }
}

/// Result of extracting one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleOutcome {
    Scraped(ArticleRecord),
    Failed(ExtractFailure),
}

impl ArticleOutcome {
    pub fn url(&self) -> &str {
        match self {
            ArticleOutcome::Scraped(record) => &record.url,
            ArticleOutcome::Failed(failure) => &failure.url,
        }
    }

    /// Flatten into the persisted record shape.
    pub fn into_record(self) -> ArticleRecord {
        match self {
            ArticleOutcome::Scraped(record) => record,
            ArticleOutcome::Failed(failure) => ArticleRecord::failed(&failure.url, &failure.message),
        }
    }
}

/// JSON body of the HTTP trigger.
///
/// Serializes as `{"status":"success","article_count":N,"articles":[...]}` or
/// `{"status":"error","message":"..."}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScrapeResponse {
    Success {
        article_count: usize,
        articles: Vec<ArticleRecord>,
    },
    Error {
        message: String,
    },
}

impl ScrapeResponse {
    pub fn success(articles: Vec<ArticleRecord>) -> Self {
        ScrapeResponse::Success {
            article_count: articles.len(),
            articles,
        }
    }
}
