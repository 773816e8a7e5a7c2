//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests. All mocks use
//! `Arc<Mutex<_>>` for interior mutability, allowing test assertions on
//! recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::AppError;
use crate::extract::{PageExtractor, PageItems};
use crate::models::MovieRecord;
use crate::traits::{Clock, Enricher, Fetcher};

/// A page with nothing on it; ends any crawl cleanly.
pub const EMPTY_PAGE: &str = "<html><body></body></html>";

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher with two answering modes.
///
/// URL-keyed stubs answer every fetch of that exact URL (needed when two
/// crawls run concurrently and queue order would be racy); the sequential
/// queue answers anything unstubbed; when both are exhausted an empty page
/// is returned so crawls terminate. Every fetched URL is recorded.
#[derive(Clone, Default)]
pub struct MockFetcher {
    queue: Arc<Mutex<Vec<Result<String, AppError>>>>,
    routes: Arc<Mutex<HashMap<String, Result<String, AppError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl MockFetcher {
    /// Fetcher answering every URL with the same page.
    pub fn new(html: &str) -> Self {
        Self {
            queue: Arc::new(Mutex::new(vec![Ok(html.to_string())])),
            ..Self::default()
        }
    }

    /// Fetcher failing its first (and only queued) response.
    pub fn with_error(error: AppError) -> Self {
        Self {
            queue: Arc::new(Mutex::new(vec![Err(error)])),
            ..Self::default()
        }
    }

    /// Fetcher answering from a queue, one response per call.
    pub fn with_pages(pages: Vec<Result<String, AppError>>) -> Self {
        Self {
            queue: Arc::new(Mutex::new(pages)),
            ..Self::default()
        }
    }

    /// Sleep this long before answering each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Register a persistent response for one exact URL.
    pub fn stub(&self, url: &str, response: Result<String, AppError>) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(response) = self.routes.lock().unwrap().get(url) {
            return response.clone();
        }

        let mut queue = self.queue.lock().unwrap();
        if queue.is_empty() {
            Ok(EMPTY_PAGE.to_string())
        } else {
            queue.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// StaticExtractor
// ---------------------------------------------------------------------------

/// Extractor answering from a scripted queue, one `PageItems` per call.
#[derive(Clone)]
pub struct StaticExtractor {
    pages: Arc<Mutex<Vec<Result<PageItems, AppError>>>>,
}

impl StaticExtractor {
    pub fn with_pages(pages: Vec<Result<PageItems, AppError>>) -> Self {
        Self {
            pages: Arc::new(Mutex::new(pages)),
        }
    }
}

impl PageExtractor for StaticExtractor {
    fn extract(&self, _html: &str) -> Result<PageItems, AppError> {
        let mut pages = self.pages.lock().unwrap();
        if pages.is_empty() {
            Ok(PageItems::default())
        } else {
            pages.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// Enrichers
// ---------------------------------------------------------------------------

/// Enricher replacing each poster with `enriched://{id}`, counting calls.
#[derive(Clone, Default)]
pub struct MockEnricher {
    calls: Arc<Mutex<usize>>,
}

impl MockEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl Enricher for MockEnricher {
    async fn enrich(&self, mut record: MovieRecord) -> Result<MovieRecord, AppError> {
        *self.calls.lock().unwrap() += 1;
        record.poster = format!("enriched://{}", record.id);
        Ok(record)
    }
}

/// Enricher that always fails; records must pass through unchanged.
#[derive(Clone, Default)]
pub struct FailingEnricher;

impl Enricher for FailingEnricher {
    async fn enrich(&self, _record: MovieRecord) -> Result<MovieRecord, AppError> {
        Err(AppError::Enrichment("lookup service down".into()))
    }
}

// ---------------------------------------------------------------------------
// FakeClock
// ---------------------------------------------------------------------------

/// Manually advanced clock for cache staleness tests.
#[derive(Clone)]
pub struct FakeClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FakeClock {
    /// Starts at a fixed, arbitrary instant.
    pub fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::TimeDelta::from_std(by).expect("advance fits chrono range");
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
