use scraper::{ElementRef, Html, Selector};

use crate::error::AppError;
use crate::models::RawItem;

/// Result of extracting one page: the items found in document order, and the
/// locator of the next page if the markup advertises one.
#[derive(Debug, Clone, Default)]
pub struct PageItems {
    pub items: Vec<RawItem>,
    pub next_page: Option<String>,
}

/// Turns one page's content into raw items. Pure; no I/O.
pub trait PageExtractor: Send + Sync + Clone {
    fn extract(&self, html: &str) -> Result<PageItems, AppError>;
}

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

// ---------------------------------------------------------------------------
// Listing profile
// ---------------------------------------------------------------------------

/// Extractor for listing-style pages: one markup node per film, with a title
/// anchor, a (possibly lazy-loaded) poster and an optionally encoded rating.
///
/// The same extractor serves both logical sources; only the selector profile
/// differs between the films grid and the diary table.
#[derive(Clone)]
pub struct ListingExtractor {
    item: Selector,
    title_anchor: Selector,
    poster: Selector,
    rating: Selector,
    watched: Selector,
    next: Selector,
}

impl ListingExtractor {
    /// Profile for the films listing pages.
    pub fn films() -> Self {
        Self {
            item: sel(".film-detail-content, li.poster-container"),
            title_anchor: sel(".film-title-wrapper a, .frame"),
            poster: sel("img"),
            rating: sel("span.rating"),
            watched: sel("time"),
            next: sel("a.next"),
        }
    }

    /// Profile for the diary/ratings listing pages.
    pub fn diary() -> Self {
        Self {
            item: sel("tr.diary-entry-row"),
            title_anchor: sel(".film-title a, h3 a"),
            poster: sel("img"),
            rating: sel("span.rating"),
            watched: sel("time"),
            next: sel("a.next"),
        }
    }

    fn item_from_node(&self, node: ElementRef<'_>) -> Option<RawItem> {
        let anchor = node.select(&self.title_anchor).next()?;
        // An item without an href cannot be identified; skip it rather than
        // emit a malformed record.
        let Some(href) = anchor.value().attr("href") else {
            tracing::debug!("skipping listing item without title href");
            return None;
        };

        // Poster-grid anchors carry no text; the image's alt text names the
        // film there.
        let mut title = anchor.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            title = node
                .select(&self.poster)
                .next()
                .and_then(|img| img.value().attr("alt"))
                .unwrap_or_default()
                .trim()
                .to_string();
        }

        let poster_url = node
            .select(&self.poster)
            .next()
            .and_then(|img| {
                // Lazy-load attribute first, eager source as fallback.
                img.value()
                    .attr("data-src")
                    .or_else(|| img.value().attr("src"))
            })
            .map(str::to_string);

        let rating_raw = node
            .select(&self.rating)
            .next()
            .and_then(Self::rating_token);

        let year_hint = node
            .value()
            .attr("data-film-year")
            .and_then(|y| y.parse().ok());

        let watched_or_rank = node
            .select(&self.watched)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .map(str::to_string);

        Some(RawItem {
            title,
            year_hint,
            source_path: Some(href.to_string()),
            poster_url,
            rating_raw,
            watched_or_rank,
        })
    }

    /// Pull the undecoded rating off a rating element.
    ///
    /// Two encodings exist in the wild: a `rated-{n}` class token and a
    /// `data-rating` attribute. The class token wins when both are present.
    fn rating_token(el: ElementRef<'_>) -> Option<String> {
        el.value()
            .classes()
            .find_map(|c| c.strip_prefix("rated-"))
            .map(str::to_string)
            .or_else(|| el.value().attr("data-rating").map(str::to_string))
    }
}

impl PageExtractor for ListingExtractor {
    fn extract(&self, html: &str) -> Result<PageItems, AppError> {
        let doc = Html::parse_document(html);

        let items = doc
            .select(&self.item)
            .filter_map(|node| self.item_from_node(node))
            .collect();

        let next_page = doc
            .select(&self.next)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string);

        Ok(PageItems { items, next_page })
    }
}

// ---------------------------------------------------------------------------
// Feed profile
// ---------------------------------------------------------------------------

/// Extractor for feed-style documents: one entry per `<item>`, the title text
/// carrying a trailing parenthesized year. Feed entries have no rating.
#[derive(Clone)]
pub struct FeedExtractor {
    channel: Selector,
    entry: Selector,
    title: Selector,
    published: Selector,
}

impl FeedExtractor {
    pub fn new() -> Self {
        Self {
            channel: sel("channel"),
            entry: sel("item"),
            title: sel("title"),
            published: sel("pubdate"),
        }
    }

    /// Split `"<Title> (<Year>)"` into title and year. Text without a
    /// trailing four-digit parenthesized year passes through untouched.
    fn split_title_year(text: &str) -> (String, Option<i32>) {
        let text = text.trim();
        if let Some(open) = text.rfind('(') {
            let inner = &text[open + 1..];
            if let Some(inner) = inner.strip_suffix(')') {
                if inner.len() == 4 && inner.bytes().all(|b| b.is_ascii_digit()) {
                    let title = text[..open].trim_end().to_string();
                    return (title, inner.parse().ok());
                }
            }
        }
        (text.to_string(), None)
    }
}

impl Default for FeedExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageExtractor for FeedExtractor {
    fn extract(&self, html: &str) -> Result<PageItems, AppError> {
        let doc = Html::parse_document(html);

        // A feed without a channel container is not a feed at all. A channel
        // with zero entries is a valid end-of-listing page.
        if doc.select(&self.channel).next().is_none() {
            return Err(AppError::MalformedPage(
                "feed document has no channel element".into(),
            ));
        }

        let items = doc
            .select(&self.entry)
            .filter_map(|entry| {
                let raw_title = entry
                    .select(&self.title)
                    .next()
                    .map(|t| t.text().collect::<String>())?;
                let (title, year_hint) = Self::split_title_year(&raw_title);
                if title.is_empty() {
                    tracing::debug!("skipping feed entry with empty title");
                    return None;
                }

                let watched_or_rank = entry
                    .select(&self.published)
                    .next()
                    .map(|t| t.text().collect::<String>().trim().to_string());

                Some(RawItem {
                    title,
                    year_hint,
                    watched_or_rank,
                    ..RawItem::default()
                })
            })
            .collect();

        // Feeds are a single-page source; there is no next locator.
        Ok(PageItems {
            items,
            next_page: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILMS_PAGE: &str = r#"
        <html><body>
        <ul>
        <div class="film-detail-content" data-film-year="1995">
            <div class="film-title-wrapper"><a href="/film/heat/">Heat</a></div>
            <img data-src="https://img.example/heat-lazy.jpg" src="https://img.example/heat-eager.jpg">
            <span class="rating rated-9"></span>
            <time datetime="2024-03-01"></time>
        </div>
        <div class="film-detail-content">
            <div class="film-title-wrapper"><a href="/film/alien/">Alien</a></div>
            <img src="https://img.example/alien.jpg">
            <span class="rating" data-rating="3.5"></span>
        </div>
        <div class="film-detail-content">
            <div class="film-title-wrapper"><a>No Href Film</a></div>
            <img src="https://img.example/nohref.jpg">
        </div>
        </ul>
        <a class="next" href="/user/films/page/2/">Next</a>
        </body></html>"#;

    #[test]
    fn films_profile_extracts_items_in_document_order() {
        let page = ListingExtractor::films().extract(FILMS_PAGE).unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].title, "Heat");
        assert_eq!(page.items[0].source_path.as_deref(), Some("/film/heat/"));
        assert_eq!(page.items[0].year_hint, Some(1995));
        assert_eq!(page.items[1].title, "Alien");
    }

    #[test]
    fn lazy_poster_attribute_wins_over_eager() {
        let page = ListingExtractor::films().extract(FILMS_PAGE).unwrap();

        assert_eq!(
            page.items[0].poster_url.as_deref(),
            Some("https://img.example/heat-lazy.jpg")
        );
        assert_eq!(
            page.items[1].poster_url.as_deref(),
            Some("https://img.example/alien.jpg")
        );
    }

    #[test]
    fn both_rating_encodings_are_read() {
        let page = ListingExtractor::films().extract(FILMS_PAGE).unwrap();

        assert_eq!(page.items[0].rating_raw.as_deref(), Some("9"));
        assert_eq!(page.items[1].rating_raw.as_deref(), Some("3.5"));
    }

    #[test]
    fn class_rating_wins_over_attribute() {
        let html = r#"
            <div class="film-detail-content">
                <div class="film-title-wrapper"><a href="/film/tie/">Tie</a></div>
                <span class="rating rated-8" data-rating="2.0"></span>
            </div>"#;
        let page = ListingExtractor::films().extract(html).unwrap();

        assert_eq!(page.items[0].rating_raw.as_deref(), Some("8"));
    }

    #[test]
    fn textless_anchor_takes_the_title_from_the_image_alt() {
        let html = r#"
            <li class="poster-container">
                <a class="frame" href="/film/heat/"></a>
                <img alt="Heat" src="https://img.example/heat.jpg">
            </li>"#;
        let page = ListingExtractor::films().extract(html).unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "Heat");
    }

    #[test]
    fn item_without_href_is_skipped() {
        let page = ListingExtractor::films().extract(FILMS_PAGE).unwrap();

        assert!(page.items.iter().all(|i| i.title != "No Href Film"));
    }

    #[test]
    fn next_locator_is_reported() {
        let page = ListingExtractor::films().extract(FILMS_PAGE).unwrap();
        assert_eq!(page.next_page.as_deref(), Some("/user/films/page/2/"));

        let last = ListingExtractor::films()
            .extract("<html><body></body></html>")
            .unwrap();
        assert!(last.items.is_empty());
        assert!(last.next_page.is_none());
    }

    #[test]
    fn diary_profile_reads_rows() {
        let html = r#"
            <table><tbody>
            <tr class="diary-entry-row">
                <td class="film-title"><a href="/film/heat/">Heat</a></td>
                <td><span class="rating rated-9"></span></td>
                <td><time datetime="2024-03-01"></time></td>
            </tr>
            <tr class="diary-entry-row">
                <td class="film-title"><a href="/film/alien/">Alien</a></td>
                <td><span class="rating"></span></td>
            </tr>
            </tbody></table>"#;
        let page = ListingExtractor::diary().extract(html).unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].rating_raw.as_deref(), Some("9"));
        assert_eq!(page.items[0].watched_or_rank.as_deref(), Some("2024-03-01"));
        assert!(page.items[1].rating_raw.is_none());
    }

    const FEED_PAGE: &str = r#"
        <rss><channel>
        <item><title>Heat (1995)</title><pubdate>Fri, 01 Mar 2024</pubdate></item>
        <item><title>Alien (1979)</title></item>
        <item><title>Untitled Project</title></item>
        </channel></rss>"#;

    #[test]
    fn feed_profile_splits_trailing_year() {
        let page = FeedExtractor::new().extract(FEED_PAGE).unwrap();

        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[0].title, "Heat");
        assert_eq!(page.items[0].year_hint, Some(1995));
        assert_eq!(
            page.items[0].watched_or_rank.as_deref(),
            Some("Fri, 01 Mar 2024")
        );
        assert_eq!(page.items[1].title, "Alien");
        assert_eq!(page.items[1].year_hint, Some(1979));
        assert_eq!(page.items[2].title, "Untitled Project");
        assert_eq!(page.items[2].year_hint, None);
    }

    #[test]
    fn feed_entries_carry_no_rating() {
        let page = FeedExtractor::new().extract(FEED_PAGE).unwrap();
        assert!(page.items.iter().all(|i| i.rating_raw.is_none()));
        assert!(page.next_page.is_none());
    }

    #[test]
    fn feed_without_channel_is_malformed() {
        let err = FeedExtractor::new()
            .extract("<html><body><p>not a feed</p></body></html>")
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedPage(_)));
    }

    #[test]
    fn empty_channel_is_a_valid_last_page() {
        let page = FeedExtractor::new()
            .extract("<rss><channel></channel></rss>")
            .unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn title_year_split_edge_cases() {
        assert_eq!(
            FeedExtractor::split_title_year("Heat (1995)"),
            ("Heat".into(), Some(1995))
        );
        assert_eq!(
            FeedExtractor::split_title_year("(500) Days of Summer (2009)"),
            ("(500) Days of Summer".into(), Some(2009))
        );
        assert_eq!(
            FeedExtractor::split_title_year("Brazil (as released)"),
            ("Brazil (as released)".into(), None)
        );
    }
}
