//! CSV output.
//!
//! Columns: `url,title,date,author,content,image_urls`. The file starts with a
//! UTF-8 byte order mark so spreadsheet tools pick the right encoding, and
//! `image_urls` holds the list as a JSON array string.

use crate::error::OutputError;
use crate::models::ArticleRecord;
use crate::utils::ensure_parent_dir;
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Serialize)]
struct CsvRow<'a> {
    url: &'a str,
    title: &'a str,
    date: &'a str,
    author: &'a str,
    content: &'a str,
    image_urls: String,
}

impl<'a> CsvRow<'a> {
    fn from_record(record: &'a ArticleRecord) -> Result<Self, OutputError> {
        Ok(Self {
            url: &record.url,
            title: &record.title,
            date: &record.date,
            author: &record.author,
            content: &record.content,
            image_urls: serde_json::to_string(&record.image_urls)?,
        })
    }
}

/// Render `articles` as CSV bytes, BOM included.
pub fn to_csv_bytes(articles: &[ArticleRecord]) -> Result<Vec<u8>, OutputError> {
    let mut writer = ::csv::Writer::from_writer(BOM.to_vec());
    for record in articles {
        writer.serialize(CsvRow::from_record(record)?)?;
    }
    writer
        .into_inner()
        .map_err(|e| OutputError::Csv(e.into_error().into()))
}

/// Write `articles` to `path` as CSV, creating parent directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = articles.len()))]
pub async fn write_articles(articles: &[ArticleRecord], path: &Path) -> Result<(), OutputError> {
    let bytes = to_csv_bytes(articles)?;
    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    ensure_parent_dir(path).await.map_err(io_err)?;
    fs::write(path, bytes).await.map_err(io_err)?;
    info!("Data also saved to CSV: {}", path.display());
    Ok(())
}
