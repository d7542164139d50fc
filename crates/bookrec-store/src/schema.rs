//! On-disk artifact layout.

use bookrec_core::{BookId, TagAssociation, TagId};
use serde::{Deserialize, Serialize};

/// Catalog rows.
pub const BOOKS_FILE: &str = "books.json";
/// Book-tag association rows.
pub const BOOK_TAGS_FILE: &str = "book_tags.json";
/// Tag dictionary rows.
pub const TAGS_FILE: &str = "tags.json";
/// Book ids in matrix row order.
pub const ROW_INDEX_FILE: &str = "row_index.json";
/// Content-based similarity matrix.
pub const CBF_MATRIX_FILE: &str = "cbf_matrix.json";
/// Collaborative-filtering similarity matrix.
pub const CF_MATRIX_FILE: &str = "cf_matrix.json";

/// File names within an artifact directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFiles {
    #[serde(default = "default_books")]
    pub books: String,
    #[serde(default = "default_book_tags")]
    pub book_tags: String,
    #[serde(default = "default_tags")]
    pub tags: String,
    #[serde(default = "default_row_index")]
    pub row_index: String,
    #[serde(default = "default_cbf")]
    pub cbf_matrix: String,
    #[serde(default = "default_cf")]
    pub cf_matrix: String,
}

fn default_books() -> String {
    BOOKS_FILE.to_string()
}

fn default_book_tags() -> String {
    BOOK_TAGS_FILE.to_string()
}

fn default_tags() -> String {
    TAGS_FILE.to_string()
}

fn default_row_index() -> String {
    ROW_INDEX_FILE.to_string()
}

fn default_cbf() -> String {
    CBF_MATRIX_FILE.to_string()
}

fn default_cf() -> String {
    CF_MATRIX_FILE.to_string()
}

impl Default for ArtifactFiles {
    fn default() -> Self {
        Self {
            books: default_books(),
            book_tags: default_book_tags(),
            tags: default_tags(),
            row_index: default_row_index(),
            cbf_matrix: default_cbf(),
            cf_matrix: default_cf(),
        }
    }
}

/// A `book_tags.json` row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BookTagRow {
    pub book_id: BookId,
    pub tag_id: TagId,
}

impl From<BookTagRow> for TagAssociation {
    fn from(row: BookTagRow) -> Self {
        Self {
            book_id: row.book_id,
            tag_id: row.tag_id,
        }
    }
}

/// A `tags.json` row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRow {
    pub tag_id: TagId,
    pub tag_name: String,
}
