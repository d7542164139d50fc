//! Core traits for bookrec components.
//!
//! - [`ArtifactSource`]: Load raw artifacts from storage
//! - [`CatalogStore`]: Read-only access to a validated catalog
//!
//! Query components only depend on [`CatalogStore`], so tests can run
//! against an in-memory catalog and the CLI against one loaded from disk.

use async_trait::async_trait;

use crate::error::LoadError;
use crate::types::{
    ArtifactBundle, BookId, CatalogEntry, CatalogStats, RowIndex, SimilarityMatrix, TagId,
};

// ============================================================================
// Artifact Loading
// ============================================================================

/// Trait for loading raw artifacts.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Human-readable description of where artifacts come from.
    fn describe(&self) -> String;

    /// Load every artifact.
    async fn load(&self) -> Result<ArtifactBundle, LoadError>;
}

// ============================================================================
// Catalog Access
// ============================================================================

/// Read-only catalog, tag and similarity access.
pub trait CatalogStore: Send + Sync {
    /// All entries in catalog order.
    fn entries(&self) -> &[CatalogEntry];

    /// Entry at a catalog position.
    fn entry_at(&self, position: usize) -> Option<&CatalogEntry> {
        self.entries().get(position)
    }

    /// Catalog position of a book.
    fn position_of(&self, id: BookId) -> Option<usize>;

    /// Entry for a book.
    fn entry(&self, id: BookId) -> Option<&CatalogEntry> {
        self.position_of(id).and_then(|pos| self.entry_at(pos))
    }

    /// Catalog position of the first entry with exactly this title.
    fn position_of_title(&self, title: &str) -> Option<usize> {
        self.entries().iter().position(|e| e.title == title)
    }

    /// Tag ids of a book in association order.
    fn tag_ids(&self, id: BookId) -> &[TagId];

    /// Name of a tag.
    fn tag_name(&self, tag_id: TagId) -> Option<&str>;

    /// Content-based similarity.
    fn cbf(&self) -> &SimilarityMatrix;

    /// Collaborative-filtering similarity.
    fn cf(&self) -> &SimilarityMatrix;

    /// Book id ↔ matrix row mapping.
    fn row_index(&self) -> &RowIndex;

    /// Catalog statistics.
    fn stats(&self) -> CatalogStats;
}
