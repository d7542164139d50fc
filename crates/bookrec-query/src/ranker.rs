//! Hybrid CBF/CF ranking.

use bookrec_core::{
    BookId, CatalogStore, HybridWeight, LookupError, QueryError, Recommendation, SelfMatch,
};
use std::cmp::Ordering;
use tracing::debug;

/// Blend one CBF row with one CF row.
#[must_use]
pub fn blend_rows(cbf: &[f32], cf: &[f32], weight: HybridWeight) -> Vec<f64> {
    cbf.iter()
        .zip(cf)
        .map(|(&c, &f)| weight.blend(c, f))
        .collect()
}

/// Stable descending order by score; equal scores keep ascending column.
fn rank_columns(scores: &[f64], skip: Option<usize>) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(j, _)| Some(*j) != skip)
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked
}

/// Top recommendations for a resolved book.
///
/// With [`SelfMatch::Keep`] the first `n + 1` ranked rows are returned and
/// the book itself is usually among them. With [`SelfMatch::Exclude`] the
/// book's own row is dropped first and `n` rows are returned. Either way the
/// result is clamped to the catalog size.
pub fn recommend_for(
    catalog: &dyn CatalogStore,
    book: BookId,
    n: usize,
    weight: HybridWeight,
    self_match: SelfMatch,
) -> Result<Vec<Recommendation>, QueryError> {
    if n == 0 {
        return Err(QueryError::InvalidCount);
    }

    let row = catalog
        .row_index()
        .row_of(book)
        .ok_or(LookupError::RowNotFound(book))?;
    let (Some(cbf), Some(cf)) = (catalog.cbf().row(row), catalog.cf().row(row)) else {
        return Err(LookupError::RowNotFound(book).into());
    };

    let scores = blend_rows(cbf, cf, weight);
    let (skip, take) = match self_match {
        SelfMatch::Keep => (None, n.saturating_add(1)),
        SelfMatch::Exclude => (Some(row), n),
    };

    let ranked = rank_columns(&scores, skip);
    debug!(
        "Ranked {} columns for book {} (row {}, weight {})",
        ranked.len(),
        book,
        row,
        weight.value()
    );

    ranked
        .into_iter()
        .take(take)
        .map(|(column, score)| -> Result<Recommendation, QueryError> {
            let id = catalog
                .row_index()
                .id_at(column)
                .ok_or(LookupError::RowNotFound(book))?;
            let entry = catalog.entry(id).ok_or(LookupError::BookNotFound(id))?;
            Ok(Recommendation::from_entry(entry, score))
        })
        .collect()
}
