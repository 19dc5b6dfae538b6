//! HTTP trigger: `GET /scrape` runs one full scrape and returns the records.
//!
//! Every request launches its own browser and closes it before responding.
//! Requests are serialised, so two concurrent calls never drive two browsers
//! at once; the second waits for the first to finish.

use crate::config::BrowserSettings;
use crate::models::ScrapeResponse;
use crate::pipeline::run_with_browser;
use crate::profile::SiteProfile;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

pub struct AppState {
    pub profile: SiteProfile,
    pub browser: BrowserSettings,
    run_lock: Mutex<()>,
}

impl AppState {
    pub fn new(profile: SiteProfile, browser: BrowserSettings) -> Self {
        Self {
            profile,
            browser,
            run_lock: Mutex::new(()),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/scrape", get(scrape))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Serving GET /scrape");
    axum::serve(listener, router(state)).await
}

#[instrument(level = "info", skip_all)]
async fn scrape(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ScrapeResponse>) {
    let _running = state.run_lock.lock().await;
    match run_with_browser(&state.profile, &state.browser).await {
        Ok(articles) => {
            info!(count = articles.len(), "Scrape request finished");
            (StatusCode::OK, Json(ScrapeResponse::success(articles)))
        }
        Err(e) => {
            error!(error = %e, "Scrape request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ScrapeResponse::Error {
                    message: e.to_string(),
                }),
            )
        }
    }
}
