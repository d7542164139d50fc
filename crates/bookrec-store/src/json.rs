//! JSON artifact directory implementation of `ArtifactSource`.

use async_trait::async_trait;
use bookrec_core::{ArtifactBundle, ArtifactSource, BookId, CatalogEntry, LoadError};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::schema::{ArtifactFiles, BookTagRow, TagRow};

/// Loads artifacts from a directory of JSON files.
pub struct JsonArtifactSource {
    /// Artifact directory
    dir: PathBuf,
    /// File names within the directory
    files: ArtifactFiles,
}

impl JsonArtifactSource {
    /// Create a source using the default file names.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_files(dir, ArtifactFiles::default())
    }

    /// Create a source with custom file names.
    #[must_use]
    pub fn with_files(dir: impl Into<PathBuf>, files: ArtifactFiles) -> Self {
        Self {
            dir: dir.into(),
            files,
        }
    }

    /// Get the artifact directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T, LoadError> {
        let path = self.dir.join(name);
        let bytes = tokio::fs::read(&path).await.map_err(|e| LoadError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!("Read {} bytes from {:?}", bytes.len(), path);
        serde_json::from_slice(&bytes).map_err(|e| LoadError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl ArtifactSource for JsonArtifactSource {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    async fn load(&self) -> Result<ArtifactBundle, LoadError> {
        let (books, book_tags, tags, row_index, cbf, cf) = tokio::try_join!(
            self.read_json::<Vec<CatalogEntry>>(&self.files.books),
            self.read_json::<Vec<BookTagRow>>(&self.files.book_tags),
            self.read_json::<Vec<TagRow>>(&self.files.tags),
            self.read_json::<Vec<BookId>>(&self.files.row_index),
            self.read_json::<Vec<Vec<f32>>>(&self.files.cbf_matrix),
            self.read_json::<Vec<Vec<f32>>>(&self.files.cf_matrix),
        )?;

        Ok(ArtifactBundle {
            books,
            book_tags: book_tags.into_iter().map(Into::into).collect(),
            tags: tags.into_iter().map(|t| (t.tag_id, t.tag_name)).collect(),
            row_index,
            cbf,
            cf,
        })
    }
}
