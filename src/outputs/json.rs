//! JSON output.
//!
//! The file holds a single array of [`ArticleRecord`]s, pretty printed with
//! four-space indentation. Non-ASCII text (Vietnamese titles and bodies) is
//! written as-is, not `\u` escaped.

use crate::error::OutputError;
use crate::models::ArticleRecord;
use crate::utils::ensure_parent_dir;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `articles` with four-space indentation.
pub fn to_pretty_json(articles: &[ArticleRecord]) -> Result<Vec<u8>, OutputError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    articles.serialize(&mut ser)?;
    Ok(buf)
}

/// Write `articles` to `path` as a JSON array.
///
/// Creates missing parent directories and overwrites an existing file.
///
/// # Arguments
///
/// * `articles` - Records in the order they should appear in the file
/// * `path` - Destination file (already resolved, see
///   [`crate::utils::resolve_output_path`])
///
/// # Returns
///
/// `Ok(())` on success, or an [`OutputError`] if serialization, directory
/// creation or the write fails.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = articles.len()))]
pub async fn write_articles(articles: &[ArticleRecord], path: &Path) -> Result<(), OutputError> {
    let json = to_pretty_json(articles)?;

    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    ensure_parent_dir(path).await.map_err(io_err)?;
    if let Err(e) = fs::write(path, json).await {
        error!(error = %e, "Failed to write JSON");
        return Err(io_err(e));
    }

    info!("Saved {} articles to {}", articles.len(), path.display());
    Ok(())
}
