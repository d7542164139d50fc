//! In-memory catalog for unit tests.

use bookrec_core::{
    BookId, CatalogEntry, CatalogStats, CatalogStore, RowIndex, SimilarityMatrix, TagDictionary,
    TagId,
};
use chrono::Utc;
use std::collections::HashMap;

pub struct MockCatalog {
    entries: Vec<CatalogEntry>,
    tags: HashMap<BookId, Vec<TagId>>,
    dictionary: TagDictionary,
    row_index: RowIndex,
    cbf: SimilarityMatrix,
    cf: SimilarityMatrix,
}

impl MockCatalog {
    pub fn new(
        entries: Vec<CatalogEntry>,
        row_index: Vec<BookId>,
        cbf: Vec<Vec<f32>>,
        cf: Vec<Vec<f32>>,
    ) -> Self {
        Self {
            entries,
            tags: HashMap::new(),
            dictionary: TagDictionary::new(),
            row_index: RowIndex::new(row_index).unwrap(),
            cbf: SimilarityMatrix::from_rows(cbf).unwrap(),
            cf: SimilarityMatrix::from_rows(cf).unwrap(),
        }
    }

    /// Catalog with identity matrices and row order equal to catalog order.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let n = entries.len();
        let ids = entries.iter().map(|e| e.id).collect();
        let identity: Vec<Vec<f32>> = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect();
        Self::new(entries, ids, identity.clone(), identity)
    }

    pub fn with_tags(mut self, book: BookId, tags: &[(TagId, &str)]) -> Self {
        for (id, name) in tags {
            self.dictionary.insert(*id, *name);
            self.tags.entry(book).or_default().push(*id);
        }
        self
    }

    pub fn with_tag_ids(mut self, book: BookId, ids: &[TagId]) -> Self {
        self.tags.entry(book).or_default().extend_from_slice(ids);
        self
    }
}

pub fn entry(id: BookId, title: &str) -> CatalogEntry {
    CatalogEntry {
        id,
        title: title.to_string(),
        authors: format!("Author {id}"),
        year: Some(2000),
        rating: 4.0,
        image_url: None,
    }
}

impl CatalogStore for MockCatalog {
    fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    fn position_of(&self, id: BookId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    fn tag_ids(&self, id: BookId) -> &[TagId] {
        self.tags.get(&id).map(Vec::as_slice).unwrap_or_default()
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
            tag_associations: self.tags.values().map(Vec::len).sum::<usize>() as u64,
            matrix_dim: self.cbf.dim() as u64,
            loaded_at: Utc::now(),
        }
    }
}
