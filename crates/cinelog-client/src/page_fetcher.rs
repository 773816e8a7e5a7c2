use std::path::PathBuf;
use std::time::Duration;

use cinelog_core::error::AppError;
use cinelog_core::traits::Fetcher;

use crate::fetcher::ReqwestFetcher;

/// The page-retrieval capability, selected once at construction.
///
/// Both variants expose the same `fetch(url) → content` contract; the
/// crawler never learns which transport is underneath.
#[derive(Clone, Debug)]
pub enum PageFetcher {
    /// Plain HTTP GET.
    Static(ReqwestFetcher),
    /// Headless-browser rendering.
    #[cfg(feature = "browser")]
    Rendered(crate::browser::BrowserFetcher),
}

impl PageFetcher {
    /// Build the fetcher named by `mode`: `"static"` or `"browser"`.
    pub async fn from_mode(
        mode: &str,
        timeout: Duration,
        executable: Option<PathBuf>,
    ) -> Result<Self, AppError> {
        match mode {
            "static" => {
                let _ = executable;
                Ok(Self::Static(ReqwestFetcher::with_timeout(timeout)?))
            }
            #[cfg(feature = "browser")]
            "browser" => Ok(Self::Rendered(
                crate::browser::BrowserFetcher::with_timeout(executable, timeout).await?,
            )),
            #[cfg(not(feature = "browser"))]
            "browser" => Err(AppError::Config(
                "fetch mode 'browser' requires the 'browser' feature".into(),
            )),
            other => Err(AppError::Config(format!(
                "unknown fetch mode '{other}' (expected 'static' or 'browser')"
            ))),
        }
    }
}

impl Fetcher for PageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        match self {
            Self::Static(fetcher) => fetcher.fetch(url).await,
            #[cfg(feature = "browser")]
            Self::Rendered(fetcher) => fetcher.fetch(url).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_mode_builds() {
        let fetcher = PageFetcher::from_mode("static", Duration::from_secs(5), None).await;
        assert!(matches!(fetcher, Ok(PageFetcher::Static(_))));
    }

    #[tokio::test]
    async fn unknown_mode_is_a_config_error() {
        let err = PageFetcher::from_mode("carrier-pigeon", Duration::from_secs(5), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
