use std::collections::HashMap;

use crate::models::{FALLBACK_POSTER, MovieRecord, RawItem, decode_rating, render_stars};
use crate::normalize::{IdAllocator, path_id};

/// Build the id → rating mapping from one crawled ratings source.
///
/// Only path-identified, successfully decoded entries participate; a later
/// occurrence of the same id (a rewatch on a later page) overwrites the
/// earlier one.
pub fn ratings_map(entries: &[RawItem]) -> HashMap<String, f32> {
    let mut map = HashMap::new();
    for entry in entries {
        let Some(id) = entry.source_path.as_deref().and_then(path_id) else {
            continue;
        };
        let Some(rating) = entry.rating_raw.as_deref().and_then(decode_rating) else {
            continue;
        };
        map.insert(id, rating);
    }
    map
}

/// Merge the films set with a ratings mapping into unified records.
///
/// A left join on id from the films side: every film survives, rated or
/// not, in crawl order; ratings whose id matches no film are dropped rather
/// than surfaced as phantom catalog entries.
pub fn reconcile(
    films: Vec<RawItem>,
    ratings: &HashMap<String, f32>,
    owner: &str,
) -> Vec<MovieRecord> {
    let mut ids = IdAllocator::new();

    films
        .iter()
        .enumerate()
        .map(|(position, film)| {
            let id = ids.allocate(film, position);
            let rating = ratings.get(&id).copied();
            let description = match rating {
                Some(r) => format!("Rating by {owner}: {}", render_stars(r)),
                None => format!("Not rated by {owner}"),
            };

            MovieRecord {
                id,
                title: film.title.clone(),
                year: film.year_hint,
                poster: film
                    .poster_url
                    .clone()
                    .unwrap_or_else(|| FALLBACK_POSTER.to_string()),
                rating,
                description,
            }
        })
        .collect()
}
