//! Core types for bookrec.
//!
//! This module contains all shared data structures used across bookrec:
//!
//! ## Catalog
//! - [`CatalogEntry`]: A book row in the catalog
//! - [`TagAssociation`]: One `(book, tag)` association row
//! - [`TagDictionary`]: Tag id to tag name lookup
//! - [`BookKey`]: Lookup key by identifier or exact title
//!
//! ## Similarity
//! - [`SimilarityMatrix`]: Square CBF or CF similarity matrix
//! - [`RowIndex`]: Explicit book id ↔ matrix row mapping
//! - [`ArtifactBundle`]: Raw, unvalidated artifacts as loaded from storage
//!
//! ## Queries
//! - [`HybridWeight`]: CBF/CF interpolation factor in `[0, 1]`
//! - [`SelfMatch`]: Whether the query book may appear in its own results
//! - [`FuzzyMatch`]: A resolved fuzzy match with its score
//! - [`Recommendation`]: A ranked recommendation row
//! - [`TopRated`]: A top-rated-by-year row

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::QueryError;

/// Unique catalog identifier.
pub type BookId = i64;

/// Tag identifier.
pub type TagId = i64;

// ============================================================================
// Catalog
// ============================================================================

/// A book in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique catalog identifier
    pub id: BookId,
    /// Canonical title
    pub title: String,
    /// Author or comma-separated author list
    pub authors: String,
    /// Original publication year
    #[serde(default)]
    pub year: Option<i32>,
    /// Average rating
    pub rating: f32,
    /// Cover image reference
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A single book-tag association row.
///
/// For one book, the order of its rows is its relevance rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAssociation {
    pub book_id: BookId,
    pub tag_id: TagId,
}

/// Tag id to human-readable name.
#[derive(Debug, Clone, Default)]
pub struct TagDictionary {
    names: HashMap<TagId, String>,
}

impl TagDictionary {
    /// Create an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag name, returning the previous name if the id was present.
    pub fn insert(&mut self, id: TagId, name: impl Into<String>) -> Option<String> {
        self.names.insert(id, name.into())
    }

    /// Look up a tag name.
    #[must_use]
    pub fn get(&self, id: TagId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(TagId, String)> for TagDictionary {
    fn from_iter<I: IntoIterator<Item = (TagId, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// Key for looking up a single book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookKey {
    /// By catalog identifier
    Id(BookId),
    /// By exact canonical title (first catalog occurrence)
    Title(String),
}

impl From<BookId> for BookKey {
    fn from(id: BookId) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for BookKey {
    fn from(title: &str) -> Self {
        Self::Title(title.to_string())
    }
}

impl From<String> for BookKey {
    fn from(title: String) -> Self {
        Self::Title(title)
    }
}

// ============================================================================
// Similarity
// ============================================================================

/// A square similarity matrix, row-major.
///
/// Rows and columns are matrix positions, not book ids; see [`RowIndex`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    dim: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Build a matrix from nested rows.
    ///
    /// Returns `(row, len)` of the first row whose length differs from the
    /// number of rows.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, (usize, usize)> {
        let dim = rows.len();
        let mut values = Vec::with_capacity(dim * dim);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err((i, row.len()));
            }
            values.extend(row);
        }
        Ok(Self { dim, values })
    }

    /// Number of rows (and columns).
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// A single row, or `None` if out of range.
    #[must_use]
    pub fn row(&self, idx: usize) -> Option<&[f32]> {
        (idx < self.dim).then(|| &self.values[idx * self.dim..(idx + 1) * self.dim])
    }

    /// Whether every value is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

/// Explicit mapping between book ids and matrix row positions.
///
/// Fixed when the matrices were built; never inferred from catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowIndex {
    ids: Vec<BookId>,
    rows: HashMap<BookId, usize>,
}

impl RowIndex {
    /// Build from book ids in matrix row order.
    ///
    /// Returns the first duplicated id on failure.
    pub fn new(ids: Vec<BookId>) -> Result<Self, BookId> {
        let mut rows = HashMap::with_capacity(ids.len());
        for (row, &id) in ids.iter().enumerate() {
            if rows.insert(id, row).is_some() {
                return Err(id);
            }
        }
        Ok(Self { ids, rows })
    }

    /// Matrix row of a book.
    #[must_use]
    pub fn row_of(&self, id: BookId) -> Option<usize> {
        self.rows.get(&id).copied()
    }

    /// Book at a matrix row.
    #[must_use]
    pub fn id_at(&self, row: usize) -> Option<BookId> {
        self.ids.get(row).copied()
    }

    /// Book ids in matrix order.
    #[must_use]
    pub fn ids(&self) -> &[BookId] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Raw artifacts before validation.
#[derive(Debug, Clone, Default)]
pub struct ArtifactBundle {
    /// Catalog rows in catalog order
    pub books: Vec<CatalogEntry>,
    /// Association rows in relevance order
    pub book_tags: Vec<TagAssociation>,
    /// Tag dictionary rows
    pub tags: Vec<(TagId, String)>,
    /// Book ids in matrix row order
    pub row_index: Vec<BookId>,
    /// Content-based similarity rows
    pub cbf: Vec<Vec<f32>>,
    /// Collaborative-filtering similarity rows
    pub cf: Vec<Vec<f32>>,
}

/// Catalog statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStats {
    /// Number of catalog rows
    pub books: u64,
    /// Number of dictionary tags
    pub tags: u64,
    /// Number of book-tag association rows
    pub tag_associations: u64,
    /// Similarity matrix dimension
    pub matrix_dim: u64,
    /// When the artifacts were loaded
    pub loaded_at: DateTime<Utc>,
}

// ============================================================================
// Queries
// ============================================================================

/// Interpolation factor between CBF (`1.0`) and CF (`0.0`).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct HybridWeight(f32);

impl HybridWeight {
    /// Pure content-based ranking.
    pub const CBF: Self = Self(1.0);
    /// Pure collaborative-filtering ranking.
    pub const CF: Self = Self(0.0);

    /// Create a weight, rejecting values outside `[0, 1]`.
    pub fn new(weight: f32) -> Result<Self, QueryError> {
        if weight.is_finite() && (0.0..=1.0).contains(&weight) {
            Ok(Self(weight))
        } else {
            Err(QueryError::InvalidWeight(weight))
        }
    }

    /// The CBF share.
    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Blend one CBF and one CF score.
    ///
    /// Matrices hold `f32`; the blend is computed in `f64` so that distinct
    /// inputs do not collapse into a tie.
    #[must_use]
    pub fn blend(self, cbf: f32, cf: f32) -> f64 {
        let w = f64::from(self.0);
        w * f64::from(cbf) + (1.0 - w) * f64::from(cf)
    }
}

impl Default for HybridWeight {
    fn default() -> Self {
        Self(0.7)
    }
}

impl TryFrom<f32> for HybridWeight {
    type Error = QueryError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// How the resolved query book is treated during ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfMatch {
    /// Rank every row and return the top `n + 1`.
    #[default]
    Keep,
    /// Drop the query row before ranking and return the top `n`.
    Exclude,
}

/// A fuzzy match against a candidate list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzyMatch {
    /// The matched candidate
    pub value: String,
    /// Position in the candidate list
    pub index: usize,
    /// Similarity in `[0, 100]`
    pub score: f64,
}

/// A ranked recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub authors: String,
    pub year: Option<i32>,
    pub rating: f32,
    /// Blended similarity the row was ranked by
    pub score: f64,
}

impl Recommendation {
    #[must_use]
    pub fn from_entry(entry: &CatalogEntry, score: f64) -> Self {
        Self {
            title: entry.title.clone(),
            authors: entry.authors.clone(),
            year: entry.year,
            rating: entry.rating,
            score,
        }
    }
}

/// A top-rated-by-year row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopRated {
    pub title: String,
    pub authors: String,
    pub rating: f32,
}

impl From<&CatalogEntry> for TopRated {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            title: entry.title.clone(),
            authors: entry.authors.clone(),
            rating: entry.rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_from_rows() {
        let m = SimilarityMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.5, 1.0]]).unwrap();
        assert_eq!(m.dim(), 2);
        assert_eq!(m.row(1), Some(&[0.5, 1.0][..]));
        assert!(m.row(2).is_none());
    }

    #[test]
    fn test_matrix_not_square() {
        let err = SimilarityMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.5]]).unwrap_err();
        assert_eq!(err, (1, 1));
    }

    #[test]
    fn test_matrix_empty() {
        let m = SimilarityMatrix::from_rows(vec![]).unwrap();
        assert_eq!(m.dim(), 0);
        assert!(m.row(0).is_none());
    }

    #[test]
    fn test_matrix_non_finite() {
        let m = SimilarityMatrix::from_rows(vec![vec![f32::NAN]]).unwrap();
        assert!(!m.is_finite());
    }

    #[test]
    fn test_row_index_lookup() {
        let index = RowIndex::new(vec![30, 10, 20]).unwrap();
        assert_eq!(index.row_of(10), Some(1));
        assert_eq!(index.id_at(2), Some(20));
        assert_eq!(index.row_of(99), None);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_row_index_duplicate() {
        assert_eq!(RowIndex::new(vec![1, 2, 1]).unwrap_err(), 1);
    }

    #[test]
    fn test_hybrid_weight_bounds() {
        assert!(HybridWeight::new(0.0).is_ok());
        assert!(HybridWeight::new(1.0).is_ok());
        assert!(matches!(
            HybridWeight::new(1.5),
            Err(QueryError::InvalidWeight(_))
        ));
        assert!(HybridWeight::new(-0.1).is_err());
        assert!(HybridWeight::new(f32::NAN).is_err());
    }

    #[test]
    fn test_hybrid_weight_blend() {
        let w = HybridWeight::new(0.5).unwrap();
        assert!((w.blend(0.9, 0.2) - 0.55).abs() < 1e-6);
        assert_eq!(HybridWeight::CBF.blend(0.3, 0.8), f64::from(0.3_f32));
        assert_eq!(HybridWeight::CF.blend(0.3, 0.8), f64::from(0.8_f32));
        assert!((HybridWeight::default().value() - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_hybrid_weight_blend_keeps_f64_precision() {
        // One f32 ulp apart at 0.5; the weighted difference is below an f32
        // ulp of the blended value but well above f64 resolution.
        let low = 0.5_f32;
        let high = f32::from_bits(low.to_bits() + 1);
        let w = HybridWeight::default();
        assert!(w.blend(0.9, high) > w.blend(0.9, low));
    }

    #[test]
    fn test_tag_dictionary() {
        let dict: TagDictionary = vec![(1, "fantasy".to_string()), (2, "to-read".to_string())]
            .into_iter()
            .collect();
        assert_eq!(dict.get(1), Some("fantasy"));
        assert_eq!(dict.get(3), None);
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_book_key_from() {
        assert_eq!(BookKey::from(7), BookKey::Id(7));
        assert_eq!(BookKey::from("Dune"), BookKey::Title("Dune".to_string()));
    }

    #[test]
    fn test_catalog_entry_serde_defaults() {
        let json = r#"{"id": 1, "title": "Dune", "authors": "Frank Herbert", "rating": 4.2}"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.year, None);
        assert_eq!(entry.image_url, None);
    }

    #[test]
    fn test_self_match_serde() {
        let json = serde_json::to_string(&SelfMatch::Exclude).unwrap();
        assert_eq!(json, "\"exclude\"");
        assert_eq!(SelfMatch::default(), SelfMatch::Keep);
    }
}
