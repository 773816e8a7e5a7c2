use thiserror::Error;

/// Application-wide error types for cinelog.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// HTTP request failed (non-2xx status or protocol error).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Page content the extractor cannot parse into any items.
    ///
    /// Distinct from a valid zero-item page, which terminates a crawl
    /// without being an error.
    #[error("Malformed page: {0}")]
    MalformedPage(String),

    /// First-page fetch failure; no partial result exists for this crawl.
    #[error("Crawl failed: {0}")]
    CrawlFailed(String),

    /// Secondary-lookup failure. Never surfaced past the catalog service.
    #[error("Enrichment error: {0}")]
    Enrichment(String),

    /// Invalid or missing configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true for errors raised by a page fetch.
    ///
    /// The crawler uses this to apply its partial-result policy: a fetch
    /// failure past page one stops the crawl and keeps what was gathered.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            AppError::Http(_) | AppError::Network(_) | AppError::Timeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures() {
        assert!(AppError::Http("502 for /films/".into()).is_fetch_failure());
        assert!(AppError::Network("connection reset".into()).is_fetch_failure());
        assert!(AppError::Timeout(30).is_fetch_failure());
        assert!(!AppError::MalformedPage("no channel".into()).is_fetch_failure());
        assert!(!AppError::CrawlFailed("page 1 unreachable".into()).is_fetch_failure());
    }
}
