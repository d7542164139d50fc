//! Query resolution and ranking for bookrec.
//!
//! - [`fuzzy`]: free text to catalog candidate
//! - [`ranker`]: CBF/CF blending and top-N ranking
//! - [`tags`]: descriptive tags for a book
//! - [`yearly`]: top rated books per publication year
//! - [`engine`]: the [`RecommendationEngine`] facade over all of the above

pub mod engine;
pub mod fuzzy;
pub mod ranker;
pub mod tags;
pub mod yearly;

#[cfg(test)]
mod testing;

pub use engine::{EngineConfig, RecommendationEngine, Surprise};
pub use fuzzy::{
    CandidateSet, DEFAULT_SUGGESTION_LIMIT, DEFAULT_THRESHOLD, FuzzyMatcher, weighted_ratio,
};
pub use tags::{DEFAULT_MAX_TAGS, SKIPPED_TAGS};
pub use yearly::DEFAULT_YEAR_LIMIT;
