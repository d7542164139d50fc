//! Artifact storage layer for bookrec.
//!
//! This crate loads the externally produced artifacts (catalog, tags, the
//! two similarity matrices and the matrix row index) and validates them into
//! an immutable [`Catalog`] implementing
//! [`CatalogStore`](bookrec_core::CatalogStore).
//!
//! # Features
//!
//! - **JSON artifacts**: [`JsonArtifactSource`] reads an artifact directory
//! - **In-memory artifacts**: [`MemorySource`] for tests and benchmarks
//! - **Fail-fast validation**: dimension and row-index errors abort loading
//!
//! # Example
//!
//! ```rust,ignore
//! use bookrec_store::{Catalog, JsonArtifactSource};
//!
//! let source = JsonArtifactSource::new("path/to/artifacts");
//! let catalog = Catalog::load(&source).await?;
//! ```

pub mod catalog;
pub mod json;
pub mod memory;
pub mod schema;

pub use catalog::Catalog;
pub use json::JsonArtifactSource;
pub use memory::MemorySource;
pub use schema::ArtifactFiles;
