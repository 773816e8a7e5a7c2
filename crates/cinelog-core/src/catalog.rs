use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::cache::TtlCache;
use crate::crawler::{PageStyle, PaginatingCrawler};
use crate::error::AppError;
use crate::extract::{FeedExtractor, ListingExtractor, PageExtractor};
use crate::models::{CrawlEpoch, MovieRecord};
use crate::reconcile::{ratings_map, reconcile};
use crate::traits::{Clock, Enricher, Fetcher};

/// Cache key for the reconciled diary epoch.
const MERGED_EPOCH: &str = "diary";

/// Which upstream listing(s) a crawl covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlSource {
    /// The films listing only; ratings come from the listing itself.
    Films,
    /// The diary listing only.
    Diary,
    /// The feed, a rating-less single-page profile.
    Feed,
    /// Films reconciled with diary ratings; what the catalog serves.
    Merged,
}

/// Static configuration for one user's catalog.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub username: String,
    pub base_url: String,
    pub catalog_id: String,
    pub ttl: Duration,
    pub max_pages: Option<usize>,
    pub crawl_timeout: Option<Duration>,
}

impl CatalogConfig {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            base_url: "https://letterboxd.com".to_string(),
            catalog_id: "cinelog-diary".to_string(),
            ttl: Duration::from_secs(3600),
            max_pages: None,
            crawl_timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_crawl_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.crawl_timeout = timeout;
        self
    }

    fn source_url(&self, suffix: &str) -> String {
        format!(
            "{}/{}/{suffix}",
            self.base_url.trim_end_matches('/'),
            self.username
        )
    }
}

/// The public-facing catalog operations.
///
/// Orchestrates cache → crawl → reconcile → enrich and shapes the result.
/// All crawl errors stop here: callers get an empty list or a missing item,
/// never an exception from the pipeline.
pub struct CatalogService<F, E, C>
where
    F: Fetcher,
    E: Enricher,
    C: Clock,
{
    config: CatalogConfig,
    fetcher: F,
    enricher: E,
    clock: C,
    cache: TtlCache<CrawlEpoch, C>,
}

impl<F, E, C> CatalogService<F, E, C>
where
    F: Fetcher,
    E: Enricher,
    C: Clock,
{
    pub fn new(config: CatalogConfig, fetcher: F, enricher: E, clock: C) -> Self {
        Self {
            config,
            fetcher,
            enricher,
            cache: TtlCache::new(clock.clone()),
            clock,
        }
    }

    /// All records of the matching catalog, in crawl order. A filter that
    /// matches nothing yields an empty result, not an error.
    pub async fn list_catalog(&self, catalog_id: &str) -> Vec<MovieRecord> {
        if catalog_id != self.config.catalog_id {
            tracing::debug!(catalog_id, "unknown catalog requested");
            return Vec::new();
        }

        match self.epoch().await {
            Ok(epoch) => epoch.records.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "catalog unavailable, serving empty listing");
                Vec::new()
            }
        }
    }

    /// Look up one record by id in the most recent epoch.
    pub async fn get_item(&self, id: &str) -> Option<MovieRecord> {
        match self.epoch().await {
            Ok(epoch) => epoch.records.iter().find(|r| r.id == id).cloned(),
            Err(e) => {
                tracing::warn!(error = %e, id, "item lookup with no epoch available");
                None
            }
        }
    }

    async fn epoch(&self) -> Result<Arc<CrawlEpoch>, AppError> {
        self.cache
            .get_or_refresh(MERGED_EPOCH, self.config.ttl, || async {
                let records = self.build_records(CrawlSource::Merged).await?;
                Ok(CrawlEpoch {
                    records,
                    fetched_at: self.clock.now(),
                })
            })
            .await
    }

    /// One uncached end-to-end crawl of the chosen source(s), reconciled
    /// and enriched. The cached catalog path uses [`CrawlSource::Merged`];
    /// the single-source variants exist for one-shot inspection.
    pub async fn build_records(&self, source: CrawlSource) -> Result<Vec<MovieRecord>, AppError> {
        let records = match source {
            CrawlSource::Films => {
                let films = self.crawl_listing("films/", ListingExtractor::films()).await?;
                let ratings = ratings_map(&films);
                reconcile(films, &ratings, &self.config.username)
            }
            CrawlSource::Diary => {
                let diary = self
                    .crawl_listing("films/diary/", ListingExtractor::diary())
                    .await?;
                let ratings = ratings_map(&diary);
                reconcile(diary, &ratings, &self.config.username)
            }
            CrawlSource::Feed => {
                let feed = PaginatingCrawler::new(
                    self.fetcher.clone(),
                    FeedExtractor::new(),
                    self.config.source_url("rss/"),
                    PageStyle::NextLink,
                )
                .with_max_pages(self.config.max_pages)
                .with_deadline(self.config.crawl_timeout)
                .crawl()
                .await?;
                reconcile(feed, &ratings_map(&[]), &self.config.username)
            }
            CrawlSource::Merged => {
                // Two independent logical sources; each paginates strictly
                // in order internally.
                let (films, diary) = tokio::try_join!(
                    self.crawl_listing("films/", ListingExtractor::films()),
                    self.crawl_listing("films/diary/", ListingExtractor::diary()),
                )?;
                let ratings = ratings_map(&diary);
                reconcile(films, &ratings, &self.config.username)
            }
        };

        Ok(join_all(records.into_iter().map(|r| self.enrich_record(r))).await)
    }

    async fn crawl_listing<X: PageExtractor>(
        &self,
        suffix: &str,
        extractor: X,
    ) -> Result<Vec<crate::models::RawItem>, AppError> {
        PaginatingCrawler::new(
            self.fetcher.clone(),
            extractor,
            self.config.source_url(suffix),
            PageStyle::Numbered,
        )
        .with_max_pages(self.config.max_pages)
        .with_deadline(self.config.crawl_timeout)
        .crawl()
        .await
    }

    async fn enrich_record(&self, record: MovieRecord) -> MovieRecord {
        let fallback = record.clone();
        match self.enricher.enrich(record).await {
            Ok(enriched) => enriched,
            Err(e) => {
                tracing::debug!(error = %e, "enrichment failed, keeping record as-is");
                fallback
            }
        }
    }
}
