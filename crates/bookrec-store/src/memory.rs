//! In-memory artifact source for testing without files.
//!
//! This module provides a [`MemorySource`] that hands out a prepared
//! [`ArtifactBundle`]. It's useful for:
//! - Unit tests of the query layer
//! - Benchmarks with generated catalogs
//! - Embedding bookrec where artifacts are produced in-process

use async_trait::async_trait;
use bookrec_core::{ArtifactBundle, ArtifactSource, LoadError};

/// Artifact source backed by an in-memory bundle.
///
/// # Example
///
/// ```rust
/// use bookrec_core::{ArtifactBundle, CatalogStore};
/// use bookrec_store::{Catalog, MemorySource};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let source = MemorySource::new(ArtifactBundle::default());
/// let catalog = Catalog::load(&source).await?;
/// assert_eq!(catalog.stats().books, 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    bundle: ArtifactBundle,
}

impl MemorySource {
    #[must_use]
    pub fn new(bundle: ArtifactBundle) -> Self {
        Self { bundle }
    }
}

#[async_trait]
impl ArtifactSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} books)", self.bundle.books.len())
    }

    async fn load(&self) -> Result<ArtifactBundle, LoadError> {
        Ok(self.bundle.clone())
    }
}
