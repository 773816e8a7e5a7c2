//! Paced fetching for polite crawling.
//!
//! Wraps any [`Fetcher`] with a minimum interval between requests. The
//! crawl targets a single fixed origin, so one shared slot is enough; the
//! lock is held across the wait, which also serialises callers the way the
//! source site expects to be visited.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::AppError;
use crate::traits::Fetcher;

/// A [`Fetcher`] wrapper that spaces out successive requests.
#[derive(Clone)]
pub struct PacedFetcher<F> {
    inner: F,
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl<F: Fetcher> PacedFetcher<F> {
    pub fn new(inner: F, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                tracing::debug!(wait_ms = %wait.as_millis(), "pacing request");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl<F: Fetcher> Fetcher for PacedFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        if !self.min_interval.is_zero() {
            self.wait_turn().await;
        }
        self.inner.fetch(url).await
    }
}
