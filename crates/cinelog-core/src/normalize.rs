use std::collections::HashSet;

use crate::models::RawItem;

/// Derive an id from a site-relative path: the last path segment, with
/// surrounding slashes stripped. `/film/the-matrix/` → `the-matrix`.
pub fn path_id(path: &str) -> Option<String> {
    path.trim_matches('/')
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Lowercase a title and collapse every run of non-alphanumeric characters
/// into a single hyphen, trimming hyphens at both ends.
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Allocates stable, unique-within-an-epoch identifiers.
///
/// Path-derived ids are preferred and never position-disambiguated, so a
/// rewatch of the same film collapses onto one stable id. Title-derived
/// fallback ids get the crawl-wide position appended when a duplicate title
/// shows up, and an empty or all-punctuation title still yields a usable id.
#[derive(Debug, Default)]
pub struct IdAllocator {
    seen: HashSet<String>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, item: &RawItem, position: usize) -> String {
        if let Some(id) = item.source_path.as_deref().and_then(path_id) {
            self.seen.insert(id.clone());
            return id;
        }

        let base = slug(&item.title);
        let id = if base.is_empty() {
            format!("unknown-{position}")
        } else if self.seen.contains(&base) {
            format!("{base}-{position}")
        } else {
            base
        };
        self.seen.insert(id.clone());
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> RawItem {
        RawItem {
            title: title.to_string(),
            ..RawItem::default()
        }
    }

    fn pathed(path: &str) -> RawItem {
        RawItem {
            source_path: Some(path.to_string()),
            ..RawItem::default()
        }
    }

    #[test]
    fn path_segment_id() {
        assert_eq!(path_id("/film/the-matrix/"), Some("the-matrix".into()));
        assert_eq!(path_id("film/heat"), Some("heat".into()));
        assert_eq!(path_id("///"), None);
    }

    #[test]
    fn slug_collapses_punctuation_runs() {
        assert_eq!(slug("The Matrix"), "the-matrix");
        assert_eq!(slug("  What's Up, Doc?!  "), "what-s-up-doc");
        assert_eq!(slug("8½"), "8½");
        assert_eq!(slug("???"), "");
    }

    #[test]
    fn path_wins_over_title() {
        let mut ids = IdAllocator::new();
        let item = RawItem {
            title: "Completely Different".into(),
            source_path: Some("/film/heat/".into()),
            ..RawItem::default()
        };
        assert_eq!(ids.allocate(&item, 0), "heat");
    }

    #[test]
    fn rewatches_share_a_path_id() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(&pathed("/film/heat/"), 0), "heat");
        assert_eq!(ids.allocate(&pathed("/film/heat/"), 7), "heat");
    }

    #[test]
    fn duplicate_titles_get_the_crawl_position() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(&titled("Solaris"), 0), "solaris");
        assert_eq!(ids.allocate(&titled("Solaris"), 13), "solaris-13");
    }

    #[test]
    fn unusable_titles_still_yield_an_id() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(&titled("???"), 4), "unknown-4");
        assert_eq!(ids.allocate(&titled(""), 5), "unknown-5");
    }

    #[test]
    fn allocation_is_deterministic() {
        let items = [titled("Heat"), titled("Heat"), pathed("/film/alien/")];
        let run = |items: &[RawItem]| {
            let mut ids = IdAllocator::new();
            items
                .iter()
                .enumerate()
                .map(|(i, item)| ids.allocate(item, i))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(&items), run(&items));
    }
}
