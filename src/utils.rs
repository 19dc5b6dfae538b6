//! URL resolution, log truncation and output-path helpers.

use chrono::NaiveDate;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};
use url::Url;

/// Resolve a listing `href` to an absolute http(s) URL against `origin`.
///
/// Absolute http(s) hrefs are kept unchanged. Anything else with a scheme
/// (`mailto:`, `javascript:`, ...) is not an article and yields `None`.
pub fn resolve_link(origin: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    match Url::parse(href) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url.to_string()),
        Ok(_) => None,
        Err(_) => origin.join(href).ok().map(|u| u.to_string()),
    }
}

/// Resolve an image `src` against the site origin.
///
/// - absolute URLs are kept as-is
/// - `//host/path` takes the origin's scheme
/// - `/path` is appended to the origin
/// - `path` is appended to the origin with a `/` separator
pub fn resolve_image_src(origin: &Url, src: &str) -> String {
    if Url::parse(src).is_ok() {
        return src.to_string();
    }
    let base = origin.origin().ascii_serialization();
    if src.starts_with("//") {
        format!("{}:{}", origin.scheme(), src)
    } else if src.starts_with('/') {
        format!("{base}{src}")
    } else {
        format!("{base}/{src}")
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary)
/// with `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Where the JSON output goes.
///
/// # Arguments
///
/// * `path` - The `--output` value
/// * `today` - Local date used for the dated filename
///
/// # Returns
///
/// `path/tdmu_articles_<YYYY-MM-DD>.json` when `path` is an existing
/// directory, otherwise `path` unchanged.
pub fn resolve_output_path(path: &Path, today: NaiveDate) -> PathBuf {
    if path.is_dir() {
        path.join(format!("tdmu_articles_{today}.json"))
    } else {
        path.to_path_buf()
    }
}

/// Create the parent directory of `path` if it is missing.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).await?;
            debug!(parent = %parent.display(), "Output directory ready");
            Ok(())
        }
        _ => Ok(()),
    }
}
