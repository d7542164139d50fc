//! Top rated books by publication year.

use bookrec_core::{CatalogStore, TopRated};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Default number of books per year.
pub const DEFAULT_YEAR_LIMIT: usize = 5;

/// Highest rated books published in `year`; ties keep catalog order.
pub fn top_rated(catalog: &dyn CatalogStore, year: i32, limit: usize) -> Vec<TopRated> {
    let mut matching: Vec<_> = catalog
        .entries()
        .iter()
        .filter(|e| e.year == Some(year))
        .collect();
    matching.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));
    matching.into_iter().take(limit).map(TopRated::from).collect()
}

/// Distinct publication years, newest first.
pub fn publication_years(catalog: &dyn CatalogStore) -> Vec<i32> {
    let years: BTreeSet<i32> = catalog.entries().iter().filter_map(|e| e.year).collect();
    years.into_iter().rev().collect()
}
