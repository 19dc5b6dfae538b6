//! # TDMU News
//!
//! Collects news articles from the Thu Dau Mot University website with a
//! headless Chromium browser and exports them as JSON (and optionally CSV),
//! or returns them from an HTTP endpoint.
//!
//! ## Usage
//!
//! ```sh
//! tdmu_news -o ./articles.json --csv ./articles.csv
//! tdmu_news serve --bind 0.0.0.0:8000
//! ```
//!
//! ## Architecture
//!
//! 1. **Profile**: built-in TDMU selectors, optionally overridden by YAML, compiled once
//! 2. **Discovery**: follow the listing's "next" control page by page, collecting links
//! 3. **Extraction**: open each article and read its fields through selector cascades
//! 4. **Output**: write JSON/CSV, or answer the HTTP request

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod browser;
mod cascade;
mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod pipeline;
mod profile;
mod scrapers;
mod server;
mod utils;

use cli::{Cli, Command};
use outputs::{csv, json};
use utils::resolve_output_path;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("tdmu_news starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // --- Site profile ---
    let (profile, browser) = pipeline::prepare(args.config.as_deref(), args.chrome.as_deref()).await?;

    if let Some(Command::Serve { bind }) = args.command {
        let state = Arc::new(server::AppState::new(profile, browser));
        server::serve(&bind, state).await?;
        return Ok(());
    }

    // ---- Batch run ----
    let articles = pipeline::run_with_browser(&profile, &browser).await?;

    if articles.is_empty() {
        info!("No articles were found to save.");
    } else {
        let json_path = resolve_output_path(&args.output, Local::now().date_naive());
        json::write_articles(&articles, &json_path).await?;
        if let Some(csv_path) = &args.csv {
            csv::write_articles(&articles, csv_path).await?;
        }
    }

    let failed = articles.iter().filter(|a| a.is_error()).count();
    info!(
        articles = articles.len(),
        failed,
        elapsed_secs = start_time.elapsed().as_secs_f64(),
        "Total execution time: {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
