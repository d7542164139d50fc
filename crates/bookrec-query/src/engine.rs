//! Recommendation engine facade.

use bookrec_core::{
    BookId, BookKey, CatalogEntry, CatalogStats, CatalogStore, FuzzyMatch, HybridWeight,
    LookupError, QueryError, Recommendation, SelfMatch, TopRated,
};
use rand::seq::IndexedRandom;
use std::sync::Arc;
use tracing::debug;

use crate::fuzzy::{CandidateSet, DEFAULT_THRESHOLD, FuzzyMatcher};
use crate::{ranker, tags, yearly};

/// Engine settings.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Minimum fuzzy score for title and author resolution
    pub threshold: f64,
    /// Treatment of the query book in its own results
    pub self_match: SelfMatch,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            self_match: SelfMatch::Keep,
        }
    }
}

/// A randomly picked book with its recommendations.
#[derive(Debug, Clone)]
pub struct Surprise {
    pub title: String,
    pub recommendations: Vec<Recommendation>,
}

/// Recommendation engine.
///
/// Holds the shared, immutable catalog and answers every query against it.
pub struct RecommendationEngine {
    /// Catalog, tags and similarity matrices
    catalog: Arc<dyn CatalogStore>,
    /// Title/author resolver
    matcher: FuzzyMatcher,
    /// Titles in catalog order, prepared for matching
    titles: CandidateSet,
    /// Author strings in catalog order, prepared for matching
    authors: CandidateSet,
    /// Self-inclusion policy
    self_match: SelfMatch,
}

impl RecommendationEngine {
    /// Create a new engine.
    pub fn new(catalog: Arc<dyn CatalogStore>, config: EngineConfig) -> Self {
        let entries = catalog.entries();
        let titles = entries.iter().map(|e| e.title.as_str()).collect();
        let authors = entries.iter().map(|e| e.authors.as_str()).collect();
        debug!("Prepared {} titles for matching", entries.len());
        Self {
            matcher: FuzzyMatcher::new(config.threshold),
            titles,
            authors,
            catalog,
            self_match: config.self_match,
        }
    }

    /// Get the underlying catalog.
    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }

    /// Fuzzy-resolve a title.
    pub fn resolve_title(&self, title: &str) -> Option<FuzzyMatch> {
        self.matcher.resolve_in(title.trim(), &self.titles)
    }

    /// Fuzzy-resolve an author to the first book carrying that author string.
    pub fn resolve_author(&self, author: &str) -> Option<&CatalogEntry> {
        let found = self.matcher.resolve_in(author.trim(), &self.authors)?;
        debug!("Author {:?} resolved to {:?} ({:.1})", author, found.value, found.score);
        self.catalog.entry_at(found.index)
    }

    /// Resolve a title, falling back to the author when the title has no
    /// confident match.
    pub fn resolve_query(
        &self,
        title: &str,
        author: Option<&str>,
    ) -> Result<&CatalogEntry, QueryError> {
        if let Some(found) = self.resolve_title(title) {
            debug!("Title {:?} resolved to {:?} ({:.1})", title, found.value, found.score);
            return self
                .catalog
                .entry_at(found.index)
                .ok_or(QueryError::NoConfidentMatch);
        }

        let author = author.ok_or(QueryError::InsufficientInput)?;
        self.resolve_author(author)
            .ok_or(QueryError::NoConfidentMatch)
    }

    /// Recommendations for an already resolved book.
    pub fn recommend_for(
        &self,
        book: BookId,
        n: usize,
        weight: HybridWeight,
    ) -> Result<Vec<Recommendation>, QueryError> {
        ranker::recommend_for(self.catalog.as_ref(), book, n, weight, self.self_match)
    }

    /// Recommendations with the failure reason.
    pub fn try_recommend(
        &self,
        title: &str,
        author: Option<&str>,
        n: usize,
        weight: HybridWeight,
    ) -> Result<Vec<Recommendation>, QueryError> {
        if n == 0 {
            return Err(QueryError::InvalidCount);
        }
        let book = self.resolve_query(title, author)?.id;
        self.recommend_for(book, n, weight)
    }

    /// Recommendations for a free-text title, or `None` when nothing could
    /// be resolved.
    pub fn recommend(
        &self,
        title: &str,
        author: Option<&str>,
        n: usize,
        weight: HybridWeight,
    ) -> Option<Vec<Recommendation>> {
        match self.try_recommend(title, author, n, weight) {
            Ok(recs) => Some(recs),
            Err(e) => {
                debug!("No recommendations for {:?}: {}", title, e);
                None
            }
        }
    }

    /// Titles matching a partial query, best first.
    pub fn resolve_suggestions(&self, partial_title: &str, limit: usize) -> Vec<FuzzyMatch> {
        self.matcher
            .resolve_many_in(partial_title.trim(), &self.titles, limit)
    }

    /// Tag names for a book.
    pub fn tags_for(
        &self,
        key: impl Into<BookKey>,
        max_tags: usize,
    ) -> Result<Vec<String>, LookupError> {
        tags::tags_for(self.catalog.as_ref(), &key.into(), max_tags)
    }

    /// Highest rated books of a year.
    pub fn top_rated(&self, year: i32, limit: usize) -> Vec<TopRated> {
        yearly::top_rated(self.catalog.as_ref(), year, limit)
    }

    /// Distinct publication years, newest first.
    pub fn publication_years(&self) -> Vec<i32> {
        yearly::publication_years(self.catalog.as_ref())
    }

    /// Cover image of the first book with exactly this title.
    pub fn image_for(&self, title: &str) -> Option<&str> {
        self.catalog
            .position_of_title(title)
            .and_then(|pos| self.catalog.entry_at(pos))
            .and_then(|e| e.image_url.as_deref())
    }

    /// Recommendations for a uniformly random catalog title.
    pub fn surprise(&self, n: usize, weight: HybridWeight) -> Option<Surprise> {
        let title = self
            .catalog
            .entries()
            .choose(&mut rand::rng())?
            .title
            .clone();
        let recommendations = self.recommend(&title, None, n, weight)?;
        Some(Surprise {
            title,
            recommendations,
        })
    }

    /// Catalog statistics.
    pub fn stats(&self) -> CatalogStats {
        self.catalog.stats()
    }
}
