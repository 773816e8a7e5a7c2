use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig, Page};
use cinelog_core::error::AppError;
use cinelog_core::traits::Fetcher;
use futures::StreamExt;
use tokio::time::Instant;

/// Rendered page fetcher: loads the URL in headless Chromium and returns
/// the DOM after scripts have run.
///
/// One Chromium process is shared across all clones; each fetch opens a
/// tab, reads the rendered document and closes the tab again. The tab is
/// closed on every exit path, render errors and the per-fetch deadline
/// included, so a failed crawl never accumulates leaked sessions.
#[derive(Clone)]
pub struct BrowserFetcher {
    browser: Arc<Browser>,
    timeout: Duration,
}

impl BrowserFetcher {
    /// Launch headless Chromium with a 30 s per-fetch deadline.
    pub async fn new(executable: Option<PathBuf>) -> Result<Self, AppError> {
        Self::with_timeout(executable, Duration::from_secs(30)).await
    }

    pub async fn with_timeout(
        executable: Option<PathBuf>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let mut builder = BrowserConfig::builder().no_sandbox().disable_default_args();

        if let Some(bin) = Self::chrome_binary(executable) {
            tracing::info!("Using browser binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        let config = builder
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .build()
            .map_err(|e| AppError::Config(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::Config(format!("Failed to launch browser: {e}")))?;

        // The CDP handler stream must keep being polled or the connection
        // goes dead under us.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        Ok(Self {
            browser: Arc::new(browser),
            timeout,
        })
    }

    /// Resolve the browser binary: explicit configuration first, then the
    /// `CHROME_BIN` environment variable, then well-known install paths.
    /// `None` lets chromiumoxide run its own lookup.
    fn chrome_binary(executable: Option<PathBuf>) -> Option<PathBuf> {
        if let Some(path) = executable {
            return Some(path);
        }

        if let Ok(env_path) = std::env::var("CHROME_BIN") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Some(path);
            }
        }

        let candidates: &[&str] = &[
            "/usr/bin/google-chrome-stable",
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
        ];
        candidates.iter().map(PathBuf::from).find(|p| p.exists())
    }

    async fn read_dom(page: &Page) -> Result<String, AppError> {
        // A present <body> is the minimal signal that the page rendered.
        page.find_element("body")
            .await
            .map_err(|e| AppError::Http(format!("Page did not render body: {e}")))?;

        page.content()
            .await
            .map_err(|e| AppError::Http(format!("Failed to read page content: {e}")))
    }
}

impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let deadline = Instant::now() + self.timeout;

        let page = tokio::time::timeout_at(deadline, self.browser.new_page(url))
            .await
            .map_err(|_| AppError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| AppError::Http(format!("Failed to navigate to {url}: {e}")))?;

        let rendered = tokio::time::timeout_at(deadline, Self::read_dom(&page)).await;

        // Close the tab before reporting anything; it must not outlive the
        // fetch even when the render failed or ran out of time.
        if let Err(e) = page.close().await {
            tracing::debug!(error = %e, "failed to close browser tab");
        }

        match rendered {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(self.timeout.as_secs())),
        }
    }
}
