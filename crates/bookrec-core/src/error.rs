//! Error types for bookrec.

use thiserror::Error;

use crate::types::BookId;

/// Artifact loading errors. All of these are fatal at startup.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("dimension mismatch: {what} expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{name} matrix is not square: row {row} has {len} columns, expected {dim}")]
    NotSquare {
        name: &'static str,
        row: usize,
        len: usize,
        dim: usize,
    },

    #[error("non-finite value in {0}")]
    NonFinite(String),

    #[error("row index references unknown book {0}")]
    UnknownBook(BookId),

    #[error("duplicate book id {0}")]
    DuplicateBook(BookId),
}

/// Catalog lookup errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("book not found: {0}")]
    BookNotFound(BookId),

    #[error("title not found: {0}")]
    TitleNotFound(String),

    #[error("book {0} has no similarity matrix row")]
    RowNotFound(BookId),
}

/// Request-level query errors.
///
/// These never cross the engine's public `recommend` boundary, which
/// reports any of them as "no result".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("no confident match")]
    NoConfidentMatch,

    #[error("insufficient input: title did not match and no author was given")]
    InsufficientInput,

    #[error("weight must be within [0, 1], got {0}")]
    InvalidWeight(f32),

    #[error("recommendation count must be at least 1")]
    InvalidCount,

    #[error(transparent)]
    Lookup(#[from] LookupError),
}
