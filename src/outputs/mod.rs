//! Writers that persist scraped articles.
//!
//! # Submodules
//!
//! - [`json`]: the primary output, one pretty-printed array of records
//! - [`csv`]: optional spreadsheet-friendly copy of the same records
//!
//! Both create missing parent directories and overwrite existing files.
//! Callers skip writing entirely when a run produced no records.

pub mod csv;
pub mod json;
