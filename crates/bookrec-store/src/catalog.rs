//! Validated, immutable catalog.

use bookrec_core::{
    ArtifactBundle, ArtifactSource, BookId, CatalogEntry, CatalogStats, CatalogStore, LoadError,
    RowIndex, SimilarityMatrix, TagDictionary, TagId,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{info, warn};

/// Catalog, tags and similarity matrices, checked for consistency.
///
/// Built once at startup and shared read-only; every dimension or
/// row-index inconsistency is rejected here rather than at query time.
#[derive(Debug)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    positions: HashMap<BookId, usize>,
    /// First catalog position of each title
    titles: HashMap<String, usize>,
    book_tags: HashMap<BookId, Vec<TagId>>,
    association_count: usize,
    dictionary: TagDictionary,
    row_index: RowIndex,
    cbf: SimilarityMatrix,
    cf: SimilarityMatrix,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    /// Load and validate artifacts from a source.
    pub async fn load(source: &dyn ArtifactSource) -> Result<Self, LoadError> {
        info!("Loading artifacts from {}", source.describe());
        let bundle = source.load().await?;
        let catalog = Self::from_bundle(bundle)?;
        info!(
            "Catalog ready: {} books, {} tags, matrix {}x{}",
            catalog.entries.len(),
            catalog.dictionary.len(),
            catalog.cbf.dim(),
            catalog.cbf.dim()
        );
        Ok(catalog)
    }

    /// Validate a raw bundle.
    pub fn from_bundle(bundle: ArtifactBundle) -> Result<Self, LoadError> {
        let ArtifactBundle {
            books,
            book_tags,
            tags,
            row_index,
            cbf,
            cf,
        } = bundle;

        let mut positions = HashMap::with_capacity(books.len());
        let mut titles = HashMap::with_capacity(books.len());
        for (pos, entry) in books.iter().enumerate() {
            titles.entry(entry.title.clone()).or_insert(pos);
            if positions.insert(entry.id, pos).is_some() {
                return Err(LoadError::DuplicateBook(entry.id));
            }
            if !entry.rating.is_finite() {
                return Err(LoadError::NonFinite(format!("rating of book {}", entry.id)));
            }
        }

        let cbf = square("cbf", cbf)?;
        let cf = square("cf", cf)?;
        if cf.dim() != cbf.dim() {
            return Err(LoadError::DimensionMismatch {
                what: "cf matrix",
                expected: cbf.dim(),
                found: cf.dim(),
            });
        }
        if cbf.dim() != books.len() {
            return Err(LoadError::DimensionMismatch {
                what: "similarity matrices vs catalog rows",
                expected: books.len(),
                found: cbf.dim(),
            });
        }
        if row_index.len() != books.len() {
            return Err(LoadError::DimensionMismatch {
                what: "row index vs catalog rows",
                expected: books.len(),
                found: row_index.len(),
            });
        }
        let row_index = RowIndex::new(row_index).map_err(LoadError::DuplicateBook)?;
        // Same length and no duplicates, so every known id makes it a bijection.
        if let Some(&unknown) = row_index.ids().iter().find(|id| !positions.contains_key(id)) {
            return Err(LoadError::UnknownBook(unknown));
        }

        let association_count = book_tags.len();
        let mut grouped: HashMap<BookId, Vec<TagId>> = HashMap::new();
        for assoc in book_tags {
            grouped.entry(assoc.book_id).or_default().push(assoc.tag_id);
        }

        let mut dictionary = TagDictionary::new();
        for (id, name) in tags {
            if let Some(previous) = dictionary.insert(id, name) {
                warn!("Duplicate tag id {} (replacing {:?})", id, previous);
            }
        }

        Ok(Self {
            entries: books,
            positions,
            titles,
            book_tags: grouped,
            association_count,
            dictionary,
            row_index,
            cbf,
            cf,
            loaded_at: Utc::now(),
        })
    }
}

fn square(name: &'static str, rows: Vec<Vec<f32>>) -> Result<SimilarityMatrix, LoadError> {
    let dim = rows.len();
    let matrix = SimilarityMatrix::from_rows(rows)
        .map_err(|(row, len)| LoadError::NotSquare {
            name,
            row,
            len,
            dim,
        })?;
    if !matrix.is_finite() {
        return Err(LoadError::NonFinite(format!("{name} matrix")));
    }
    Ok(matrix)
}

impl CatalogStore for Catalog {
    fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    fn position_of(&self, id: BookId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    fn position_of_title(&self, title: &str) -> Option<usize> {
        self.titles.get(title).copied()
    }

    fn tag_ids(&self, id: BookId) -> &[TagId] {
        self.book_tags.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    fn tag_name(&self, tag_id: TagId) -> Option<&str> {
        self.dictionary.get(tag_id)
    }

    fn cbf(&self) -> &SimilarityMatrix {
        &self.cbf
    }

    fn cf(&self) -> &SimilarityMatrix {
        &self.cf
    }

    fn row_index(&self) -> &RowIndex {
        &self.row_index
    }

    fn stats(&self) -> CatalogStats {
        CatalogStats {
            books: self.entries.len() as u64,
            tags: self.dictionary.len() as u64,
            tag_associations: self.association_count as u64,
            matrix_dim: self.cbf.dim() as u64,
            loaded_at: self.loaded_at,
        }
    }
}
