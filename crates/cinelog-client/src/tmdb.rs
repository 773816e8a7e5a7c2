use std::time::Duration;

use cinelog_core::error::AppError;
use cinelog_core::models::MovieRecord;
use cinelog_core::traits::Enricher;
use reqwest::Client;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w342";
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Poster enricher backed by the TMDB movie-search endpoint.
///
/// Looks a record's title (and year, when known) up and swaps the poster
/// for the first hit's artwork. Strictly best-effort: a network failure,
/// an empty result list or a hit without artwork all hand the record back
/// untouched.
#[derive(Clone)]
pub struct TmdbEnricher {
    client: Client,
    api_key: String,
    base_url: String,
}

// ---- TMDB API types ----

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    poster_path: Option<String>,
}

impl TmdbEnricher {
    pub fn new(api_key: &str) -> Result<Self, AppError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(DEFAULT_LOOKUP_TIMEOUT)
            .build()
            .map_err(|e| AppError::Enrichment(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn lookup_poster(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<String>, AppError> {
        let url = format!("{}/search/movie", self.base_url);
        let mut query = vec![
            ("api_key", self.api_key.clone()),
            ("query", title.to_string()),
        ];
        if let Some(year) = year {
            query.push(("year", year.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::Enrichment(format!("lookup failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Enrichment(format!(
                "HTTP {} from lookup service",
                status.as_u16()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Enrichment(format!("unreadable lookup response: {e}")))?;

        Ok(first_poster(body))
    }
}

/// Only the first hit's artwork is used.
fn first_poster(body: SearchResponse) -> Option<String> {
    body.results
        .into_iter()
        .next()
        .and_then(|hit| hit.poster_path)
        .map(|path| format!("{POSTER_BASE_URL}{path}"))
}

impl Enricher for TmdbEnricher {
    async fn enrich(&self, mut record: MovieRecord) -> Result<MovieRecord, AppError> {
        match self.lookup_poster(&record.title, record.year).await {
            Ok(Some(poster)) => {
                record.poster = poster;
                Ok(record)
            }
            Ok(None) => Ok(record),
            Err(e) => {
                tracing::debug!(id = %record.id, error = %e, "poster lookup failed");
                Ok(record)
            }
        }
    }
}

/// Poster enrichment as selected at startup: TMDB when a key is configured,
/// otherwise a pass-through.
#[derive(Clone)]
pub enum PosterEnricher {
    Tmdb(TmdbEnricher),
    Disabled,
}

impl PosterEnricher {
    pub fn from_key(api_key: Option<&str>) -> Result<Self, AppError> {
        match api_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => Ok(Self::Tmdb(TmdbEnricher::new(key)?)),
            None => Ok(Self::Disabled),
        }
    }
}

impl Enricher for PosterEnricher {
    async fn enrich(&self, record: MovieRecord) -> Result<MovieRecord, AppError> {
        match self {
            Self::Tmdb(tmdb) => tmdb.enrich(record).await,
            Self::Disabled => Ok(record),
        }
    }
}
