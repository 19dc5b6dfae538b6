//! Command-line interface definitions for the TDMU news scraper.
//!
//! Without a subcommand the binary runs one batch scrape and writes the
//! results to disk. `serve` starts the HTTP trigger instead. Every option can
//! also be set through an environment variable.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the TDMU news scraper.
///
/// # Examples
///
/// ```sh
/// # Batch run with defaults (writes /tmp/tdmu_articles.json)
/// tdmu_news
///
/// # Custom output plus a CSV copy
/// tdmu_news -o ./out/articles.json --csv ./out/articles.csv
///
/// # HTTP trigger
/// tdmu_news serve --bind 127.0.0.1:8000
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON output file, or an existing directory to place a dated file in
    #[arg(short, long, env = "TDMU_OUTPUT", default_value = "/tmp/tdmu_articles.json")]
    pub output: PathBuf,

    /// Also write the results as CSV to this path
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Optional path to a YAML site profile overriding the built-in selectors
    #[arg(short, long, env = "TDMU_CONFIG")]
    pub config: Option<PathBuf>,

    /// Chromium executable; autodetected when unset
    #[arg(long, env = "CHROME")]
    pub chrome: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Serve `GET /scrape` over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, env = "TDMU_BIND", default_value = "0.0.0.0:8000")]
        bind: String,
    },
}
