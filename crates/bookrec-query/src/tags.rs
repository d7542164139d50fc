//! Descriptive tags for a book.

use bookrec_core::{BookId, BookKey, CatalogStore, LookupError};
use tracing::debug;

/// Leading tags dropped as too generic (e.g. "to-read", "favorites").
pub const SKIPPED_TAGS: usize = 2;

/// Default upper bound (exclusive) on tag positions.
pub const DEFAULT_MAX_TAGS: usize = 10;

/// Resolve a key to a book id.
pub fn resolve_key(catalog: &dyn CatalogStore, key: &BookKey) -> Result<BookId, LookupError> {
    match key {
        BookKey::Id(id) => catalog
            .entry(*id)
            .map(|e| e.id)
            .ok_or(LookupError::BookNotFound(*id)),
        BookKey::Title(title) => catalog
            .position_of_title(title)
            .and_then(|pos| catalog.entry_at(pos))
            .map(|e| e.id)
            .ok_or_else(|| LookupError::TitleNotFound(title.clone())),
    }
}

/// Tag names for a book, association order, positions `[2, max_tags)`.
///
/// Tag ids missing from the dictionary are dropped before slicing. A book
/// with fewer than three named tags yields an empty list.
pub fn tags_for(
    catalog: &dyn CatalogStore,
    key: &BookKey,
    max_tags: usize,
) -> Result<Vec<String>, LookupError> {
    let id = resolve_key(catalog, key)?;
    let tag_ids = catalog.tag_ids(id);

    let names: Vec<String> = tag_ids
        .iter()
        .filter_map(|&tag| catalog.tag_name(tag))
        .skip(SKIPPED_TAGS)
        .take(max_tags.saturating_sub(SKIPPED_TAGS))
        .map(str::to_string)
        .collect();

    debug!(
        "Book {} has {} tag associations, returning {}",
        id,
        tag_ids.len(),
        names.len()
    );
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCatalog, entry};

    const FIVE: [(i64, &str); 5] = [
        (1, "to-read"),
        (2, "favorites"),
        (3, "fantasy"),
        (4, "magic"),
        (5, "dragons"),
    ];

    fn catalog() -> MockCatalog {
        MockCatalog::from_entries(vec![entry(10, "Two Tags"), entry(20, "Five Tags")])
            .with_tags(10, &[(1, "to-read"), (2, "favorites")])
            .with_tags(20, &FIVE)
    }

    #[test]
    fn test_two_tags_is_empty() {
        let tags = tags_for(&catalog(), &BookKey::Id(10), DEFAULT_MAX_TAGS).unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn test_five_tags_returns_positions_two_to_four() {
        let tags = tags_for(&catalog(), &BookKey::Id(20), 10).unwrap();
        assert_eq!(tags, vec!["fantasy", "magic", "dragons"]);
    }

    #[test]
    fn test_max_tags_bounds_slice() {
        let tags = tags_for(&catalog(), &BookKey::Id(20), 4).unwrap();
        assert_eq!(tags, vec!["fantasy", "magic"]);
        assert!(tags_for(&catalog(), &BookKey::Id(20), 2).unwrap().is_empty());
        assert!(tags_for(&catalog(), &BookKey::Id(20), 0).unwrap().is_empty());
    }

    #[test]
    fn test_lookup_by_title() {
        let tags = tags_for(&catalog(), &BookKey::from("Five Tags"), 10).unwrap();
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn test_unknown_tags_dropped_before_slicing() {
        let catalog = MockCatalog::from_entries(vec![entry(1, "Book")])
            .with_tags(1, &[(1, "a"), (2, "b")])
            .with_tag_ids(1, &[999])
            .with_tags(1, &[(3, "c")]);
        let tags = tags_for(&catalog, &BookKey::Id(1), 10).unwrap();
        assert_eq!(tags, vec!["c"]);
    }

    #[test]
    fn test_book_without_tags() {
        let catalog = MockCatalog::from_entries(vec![entry(1, "Bare")]);
        assert!(tags_for(&catalog, &BookKey::Id(1), 10).unwrap().is_empty());
    }

    #[test]
    fn test_not_found() {
        assert_eq!(
            tags_for(&catalog(), &BookKey::Id(99), 10).unwrap_err(),
            LookupError::BookNotFound(99)
        );
        assert_eq!(
            tags_for(&catalog(), &BookKey::from("Missing"), 10).unwrap_err(),
            LookupError::TitleNotFound("Missing".to_string())
        );
    }
}
