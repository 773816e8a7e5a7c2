use chrono::{DateTime, Utc};

/// Poster used when the source markup carries no usable image.
pub const FALLBACK_POSTER: &str = "https://placehold.co/300x450?text=No+Poster";

/// One item as extracted from a single page, before normalization.
///
/// Field availability varies by extraction profile: listing pages carry
/// posters and raw ratings, feed entries carry a year hint instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawItem {
    pub title: String,
    pub year_hint: Option<i32>,
    /// Site-relative path of the item's canonical page, e.g. `/film/heat/`.
    pub source_path: Option<String>,
    pub poster_url: Option<String>,
    /// Undecoded rating: a 1–10 class-encoded integer or a 0–5 decimal.
    pub rating_raw: Option<String>,
    pub watched_or_rank: Option<String>,
}

/// The unified catalog entity. Immutable once built; a whole new set is
/// produced on every refresh.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MovieRecord {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    pub poster: String,
    /// Always within 0.0–5.0 when present.
    pub rating: Option<f32>,
    pub description: String,
}

/// The complete, ordered snapshot produced by one end-to-end crawl.
#[derive(Debug, Clone)]
pub struct CrawlEpoch {
    pub records: Vec<MovieRecord>,
    pub fetched_at: DateTime<Utc>,
}

/// Decode a raw rating value onto the 0.0–5.0 scale.
///
/// An integer on the source's 1–10 scale divides by ten; a decimal already
/// on 0–5 parses directly. Anything else means the item has no rating.
/// The integer interpretation is tried first, so `"3"` is `0.3`, not `3.0`.
pub fn decode_rating(raw: &str) -> Option<f32> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u32>() {
        return (1..=10).contains(&n).then(|| n as f32 / 10.0);
    }
    if let Ok(f) = raw.parse::<f32>() {
        return (0.0..=5.0).contains(&f).then_some(f);
    }
    None
}

/// Render a 0.0–5.0 rating as five star glyphs, rounding half up.
pub fn render_stars(rating: f32) -> String {
    let filled = (rating.round() as usize).min(5);
    let mut stars = "★".repeat(filled);
    stars.push_str(&"☆".repeat(5 - filled));
    stars
}
