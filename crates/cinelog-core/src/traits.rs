use std::future::Future;

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::MovieRecord;

/// Retrieves raw page content for one URL.
///
/// One capability, two transports: a plain HTTP GET or a rendered fetch
/// through a script-executing browser. The crawler is written against this
/// trait only and never knows which transport is behind it.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Looks up supplementary data for a record from a secondary service.
///
/// Best-effort by contract: implementations return the input unchanged when
/// the lookup yields nothing, and the catalog service swallows any `Err`.
pub trait Enricher: Send + Sync + Clone {
    fn enrich(
        &self,
        record: MovieRecord,
    ) -> impl Future<Output = Result<MovieRecord, AppError>> + Send;
}

/// A no-op Enricher for use when no secondary service is configured.
#[derive(Debug, Clone)]
pub struct NullEnricher;

impl Enricher for NullEnricher {
    async fn enrich(&self, record: MovieRecord) -> Result<MovieRecord, AppError> {
        Ok(record)
    }
}

/// Source of the current time.
///
/// The cache takes its clock through this trait so staleness transitions can
/// be driven deterministically in tests instead of by wall-clock sleeps.
pub trait Clock: Send + Sync + Clone {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
