//! # bookrec-core
//!
//! Core types and traits for bookrec, a hybrid book recommender that blends
//! content-based (CBF) and collaborative-filtering (CF) similarity.
//!
//! This crate provides the foundational abstractions used throughout bookrec:
//!
//! - **Artifact Loading**: [`ArtifactSource`] trait for reading raw artifacts
//! - **Catalog Access**: [`CatalogStore`] trait for read-only catalog and matrix access
//!
//! ## Architecture
//!
//! ```text
//! ArtifactSource → ArtifactBundle → Catalog (CatalogStore)
//!                                        ↓
//! free text → FuzzyMatch → BookId → RowIndex → SimilarityMatrix rows → Recommendation
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CatalogEntry`] | A book row |
//! | [`SimilarityMatrix`] | Square CBF or CF matrix |
//! | [`RowIndex`] | Explicit book id ↔ matrix row mapping |
//! | [`HybridWeight`] | CBF/CF interpolation factor |
//! | [`Recommendation`] | A ranked result row |
//!
//! ## Related Crates
//!
//! - `bookrec-store`: JSON artifact loading and the validated `Catalog`
//! - `bookrec-query`: Fuzzy matching, hybrid ranking, tags, year queries

pub mod error;
pub mod traits;
pub mod types;

pub use error::{LoadError, LookupError, QueryError};
pub use traits::*;
pub use types::*;
