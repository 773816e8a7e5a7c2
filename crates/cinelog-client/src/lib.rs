pub mod fetcher;
pub mod page_fetcher;
pub mod tmdb;

#[cfg(feature = "browser")]
pub mod browser;

#[cfg(feature = "browser")]
pub use browser::BrowserFetcher;
pub use fetcher::ReqwestFetcher;
pub use page_fetcher::PageFetcher;
pub use tmdb::{PosterEnricher, TmdbEnricher};
