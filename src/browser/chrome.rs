//! Headless Chromium session backed by `chromiumoxide`.

use super::{Locator, PageDriver};
use crate::config::BrowserSettings;
use crate::error::BrowserError;
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};

/// One browser process with one tab.
///
/// Must be released with [`ChromeSession::close`] on every exit path, or the
/// Chromium process outlives the run.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    navigation_timeout: Duration,
    settle: Duration,
}

impl ChromeSession {
    /// Launch headless Chromium and open a blank tab.
    #[instrument(level = "info", skip_all)]
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(settings.window_width, settings.window_height)
            .request_timeout(Duration::from_secs(settings.navigation_timeout_secs));
        for arg in &settings.args {
            builder = builder.arg(arg.clone());
        }
        if let Some(executable) = &settings.executable {
            builder = builder.chrome_executable(executable.clone());
        }
        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "CDP handler stopped");
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(BrowserError::Launch(e.to_string()));
            }
        };

        info!(
            width = settings.window_width,
            height = settings.window_height,
            "Headless browser launched"
        );
        Ok(Self {
            browser,
            page,
            handler,
            navigation_timeout: Duration::from_secs(settings.navigation_timeout_secs),
            settle: Duration::from_millis(settings.settle_ms),
        })
    }

    /// Shut the browser down and wait for the process to exit.
    ///
    /// Failures are logged; there is nothing useful a caller can do with them.
    #[instrument(level = "info", skip_all)]
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "Browser close command failed");
        }
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "Waiting for browser process failed");
        }
        self.handler.abort();
        let _ = self.handler.await;
        info!("Browser closed");
    }
}

/// Bound `fut` by `limit`, then wait out the quiet period.
async fn settle<F, T>(limit: Duration, quiet: Duration, what: &str, url: &str, fut: F) -> Result<(), BrowserError>
where
    F: Future<Output = chromiumoxide::error::Result<T>>,
{
    match timeout(limit, fut).await {
        Err(_) => {
            return Err(BrowserError::Timeout {
                what: format!("{what} {url}"),
                timeout: limit,
            });
        }
        Ok(Err(e)) => {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            });
        }
        Ok(Ok(_)) => {}
    }
    sleep(quiet).await;
    Ok(())
}

#[async_trait]
impl PageDriver for ChromeSession {
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        debug!(%url, "Navigating");
        let page = self.page.clone();
        settle(self.navigation_timeout, self.settle, "navigation to", url, async move {
            page.goto(url).await.map(|_| ())
        })
        .await
    }

    async fn html(&mut self) -> Result<String, BrowserError> {
        Ok(self.page.content().await?)
    }

    async fn click(&mut self, locator: &Locator) -> Result<bool, BrowserError> {
        let target = match locator {
            Locator::Css(selector) => self.page.find_elements(selector.as_str()).await?.into_iter().next(),
            Locator::Text(label) => {
                let mut found = None;
                for anchor in self.page.find_elements("a").await? {
                    let text = anchor.inner_text().await?.unwrap_or_default();
                    if text.contains(label.as_str()) {
                        found = Some(anchor);
                        break;
                    }
                }
                found
            }
        };

        match target {
            Some(element) => {
                debug!(?locator, "Clicking");
                element.click().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn wait_for_navigation(&mut self) -> Result<(), BrowserError> {
        let page = self.page.clone();
        let url = page.url().await?.unwrap_or_default();
        settle(self.navigation_timeout, self.settle, "navigation after click on", &url, async move {
            page.wait_for_navigation().await.map(|_| ())
        })
        .await
    }
}
