use std::time::Duration;

use tokio::time::Instant;
use url::Url;

use crate::error::AppError;
use crate::extract::PageExtractor;
use crate::models::RawItem;

/// How successive pages of a listing are located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStyle {
    /// `{start}/page/{n}/` suffixes, n starting at 1.
    Numbered,
    /// Follow the next-page locator extracted from each page, resolved
    /// against the start URL's origin.
    NextLink,
}

/// Drives a [`Fetcher`] and a [`PageExtractor`] across successive pages of
/// one logical source until the listing runs out.
///
/// Pages are fetched strictly in order, since page N's existence is only
/// known from page N-1. The returned items preserve page order then in-page
/// document order, which becomes the catalog's display order.
///
/// [`Fetcher`]: crate::traits::Fetcher
pub struct PaginatingCrawler<F, E> {
    fetcher: F,
    extractor: E,
    start_url: String,
    style: PageStyle,
    max_pages: Option<usize>,
    deadline: Option<Duration>,
}

impl<F, E> PaginatingCrawler<F, E>
where
    F: crate::traits::Fetcher,
    E: PageExtractor,
{
    pub fn new(fetcher: F, extractor: E, start_url: impl Into<String>, style: PageStyle) -> Self {
        Self {
            fetcher,
            extractor,
            start_url: start_url.into(),
            style,
            max_pages: None,
            deadline: None,
        }
    }

    /// Safety ceiling on the number of pages fetched, in case the source's
    /// termination markers ever change.
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Bound the whole crawl; once exceeded, the in-flight fetch is treated
    /// as a fetch failure and the partial-result policy applies.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Crawl from the start URL until a termination condition triggers:
    /// an item-less page, a missing next locator, the page ceiling, or a
    /// fetch failure. A failure past page one keeps the items gathered so
    /// far; on page one there is nothing to keep and the crawl fails.
    pub async fn crawl(&self) -> Result<Vec<RawItem>, AppError> {
        let started = Instant::now();
        let mut items: Vec<RawItem> = Vec::new();
        let mut page_no = 1usize;
        let mut current = match self.style {
            PageStyle::Numbered => self.numbered_url(1),
            PageStyle::NextLink => self.start_url.clone(),
        };

        loop {
            if let Some(max) = self.max_pages {
                if page_no > max {
                    tracing::info!(max, "page ceiling reached, ending crawl");
                    break;
                }
            }

            let html = match self.fetch_page(&current, started).await {
                Ok(html) => html,
                Err(e) if page_no == 1 => {
                    return Err(AppError::CrawlFailed(format!(
                        "first page {current}: {e}"
                    )));
                }
                Err(e) if e.is_fetch_failure() => {
                    tracing::warn!(
                        page = page_no,
                        url = %current,
                        error = %e,
                        "fetch failed, keeping partial results"
                    );
                    break;
                }
                Err(e) => return Err(e),
            };

            let page = match self.extractor.extract(&html) {
                Ok(page) => page,
                Err(e) => {
                    // Malformed content never fails a crawl that has already
                    // produced items; it just can't go further.
                    tracing::warn!(page = page_no, url = %current, error = %e, "page did not parse, ending crawl");
                    break;
                }
            };

            if page.items.is_empty() {
                tracing::debug!(page = page_no, "empty page, listing exhausted");
                break;
            }
            items.extend(page.items);

            page_no += 1;
            current = match self.style {
                PageStyle::Numbered => self.numbered_url(page_no),
                PageStyle::NextLink => match page.next_page.as_deref() {
                    Some(locator) => match self.resolve(locator) {
                        Some(url) => url,
                        None => {
                            tracing::warn!(locator, "unresolvable next locator, ending crawl");
                            break;
                        }
                    },
                    None => break,
                },
            };
        }

        tracing::info!(items = items.len(), pages = page_no, url = %self.start_url, "crawl complete");
        Ok(items)
    }

    async fn fetch_page(&self, url: &str, started: Instant) -> Result<String, AppError> {
        let Some(total) = self.deadline else {
            return self.fetcher.fetch(url).await;
        };

        let remaining = total.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return Err(AppError::Timeout(total.as_secs()));
        }
        match tokio::time::timeout(remaining, self.fetcher.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(total.as_secs())),
        }
    }

    fn numbered_url(&self, page: usize) -> String {
        format!("{}/page/{page}/", self.start_url.trim_end_matches('/'))
    }

    fn resolve(&self, locator: &str) -> Option<String> {
        let base = Url::parse(&self.start_url).ok()?;
        base.join(locator).ok().map(String::from)
    }
}
