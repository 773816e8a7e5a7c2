use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use cinelog_core::AppError;

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source-site username whose diary is published.
    pub username: String,
    pub base_url: String,
    pub ttl: Duration,
    pub max_pages: Option<usize>,
    pub crawl_timeout: Option<Duration>,
    /// `static` or `browser`.
    pub fetch_mode: String,
    /// Minimum interval between successive page fetches.
    pub fetch_delay: Duration,
    pub tmdb_api_key: Option<String>,
    pub chrome_bin: Option<PathBuf>,
    pub port: u16,
}

impl Config {
    /// Read configuration from environment variables.
    ///
    /// - `CINELOG_USER` (required)
    /// - `CINELOG_BASE_URL` (default `https://letterboxd.com`)
    /// - `CINELOG_CACHE_TTL_SECS` (default 3600, must be ≥ 1)
    /// - `CINELOG_MAX_PAGES` (optional)
    /// - `CINELOG_CRAWL_TIMEOUT_SECS` (optional)
    /// - `CINELOG_FETCH_MODE` (default `static`)
    /// - `CINELOG_FETCH_DELAY_MS` (default 250)
    /// - `TMDB_API_KEY` (optional, enables poster enrichment)
    /// - `CHROME_BIN` (optional, rendered-fetch executable)
    /// - `CINELOG_PORT` (default 7000)
    pub fn from_env() -> Result<Self, AppError> {
        let username = std::env::var("CINELOG_USER").map_err(|_| {
            AppError::Config("CINELOG_USER not set. Required to locate the diary.".into())
        })?;

        let base_url = std::env::var("CINELOG_BASE_URL")
            .unwrap_or_else(|_| "https://letterboxd.com".to_string());

        let ttl_secs: u64 = parsed_or("CINELOG_CACHE_TTL_SECS", 3600)?;
        if ttl_secs == 0 {
            return Err(AppError::Config(
                "CINELOG_CACHE_TTL_SECS must be at least 1".into(),
            ));
        }

        let fetch_mode =
            std::env::var("CINELOG_FETCH_MODE").unwrap_or_else(|_| "static".to_string());

        Ok(Self {
            username,
            base_url,
            ttl: Duration::from_secs(ttl_secs),
            max_pages: opt_parsed("CINELOG_MAX_PAGES")?,
            crawl_timeout: opt_parsed::<u64>("CINELOG_CRAWL_TIMEOUT_SECS")?
                .map(Duration::from_secs),
            fetch_mode,
            fetch_delay: Duration::from_millis(parsed_or("CINELOG_FETCH_DELAY_MS", 250)?),
            tmdb_api_key: std::env::var("TMDB_API_KEY").ok(),
            chrome_bin: std::env::var("CHROME_BIN").ok().map(PathBuf::from),
            port: parsed_or("CINELOG_PORT", 7000)?,
        })
    }
}

fn opt_parsed<T: FromStr>(name: &str) -> Result<Option<T>, AppError> {
    match std::env::var(name) {
        Err(_) => Ok(None),
        Ok(raw) => raw.parse().map(Some).map_err(|_| {
            AppError::Config(format!("Invalid {name} '{raw}': expected a number"))
        }),
    }
}

fn parsed_or<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    Ok(opt_parsed(name)?.unwrap_or(default))
}
