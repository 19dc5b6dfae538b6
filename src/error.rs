//! Error types shared across the scraper.
//!
//! Errors are split by the layer that produces them so callers can decide how
//! far each one travels:
//!
//! - [`BrowserError`]: a browser primitive (launch, navigate, click, read) failed
//! - [`ConfigError`]: the site profile could not be loaded or compiled
//! - [`OutputError`]: writing JSON or CSV results failed
//! - [`ScrapeError`]: a run-level failure that aborts the whole run

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single browser primitive.
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    #[error("browser protocol error: {0}")]
    Protocol(String),
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        BrowserError::Protocol(e.to_string())
    }
}

/// Failure while loading or compiling the site profile.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid CSS selector {selector:?}: {message}")]
    Selector { selector: String, message: String },

    #[error("invalid link pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid site URL {url:?}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failure while persisting results.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A failure that aborts the whole run.
///
/// Per-page and per-article problems never surface here; they are recovered
/// where they happen.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("link discovery failed: {0}")]
    Discovery(#[source] BrowserError),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
