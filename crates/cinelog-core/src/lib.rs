pub mod cache;
pub mod catalog;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod reconcile;
pub mod testutil;
pub mod throttle;
pub mod traits;

pub use catalog::{CatalogConfig, CatalogService, CrawlSource};
pub use error::AppError;
pub use models::{CrawlEpoch, MovieRecord, RawItem};
pub use traits::{Clock, Enricher, Fetcher, NullEnricher, SystemClock};
