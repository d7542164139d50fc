//! Fuzzy title and author resolution.
//!
//! Scoring follows the weighted-ratio approach: a plain edit-distance ratio
//! is blended with token-sorted, token-set and partial (substring) ratios,
//! and the best scaled score wins. All scores are in `[0, 100]`.
//!
//! Candidates are normalised once into a [`CandidateSet`]. Each lookup then
//! carries a score cutoff (the threshold, or the best score so far) and
//! skips work that cannot reach it.

use bookrec_core::FuzzyMatch;
use std::collections::{BTreeSet, HashMap};
use strsim::{normalized_damerau_levenshtein, normalized_levenshtein};

/// Minimum score for a confident match.
pub const DEFAULT_THRESHOLD: f64 = 70.0;

/// Default size of a suggestion list.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

const UNBASE_SCALE: f64 = 0.95;

/// Slack on cutoff comparisons so rounding never prunes an exact hit.
const CUTOFF_SLACK: f64 = 1e-9;

// ============================================================================
// Prepared strings
// ============================================================================

/// A string normalised for matching.
#[derive(Debug, Clone)]
pub struct Prepared {
    original: String,
    text: String,
    chars: usize,
    sorted_tokens: String,
}

impl Prepared {
    /// Normalise `s`: lowercase, non-alphanumerics become spaces, trimmed.
    #[must_use]
    pub fn new(s: &str) -> Self {
        let text = process(s);
        Self {
            original: s.to_string(),
            chars: text.chars().count(),
            sorted_tokens: sorted_tokens(&text),
            text,
        }
    }

    /// The string as given.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The normalised form.
    #[must_use]
    pub fn processed(&self) -> &str {
        &self.text
    }
}

/// Candidates normalised once and matched many times.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    items: Vec<Prepared>,
}

impl CandidateSet {
    #[must_use]
    pub fn new<S: AsRef<str>>(candidates: &[S]) -> Self {
        candidates.iter().map(|c| c.as_ref()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Prepared::new).collect(),
        }
    }
}

// ============================================================================
// Matcher
// ============================================================================

/// Resolves free text against a list of candidates.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    threshold: f64,
}

impl FuzzyMatcher {
    /// Create a matcher with the given minimum score.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Get the minimum score.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Best-scoring candidate, or `None` if it scores below the threshold.
    ///
    /// Ties go to the earliest candidate.
    pub fn resolve<S: AsRef<str>>(&self, query: &str, candidates: &[S]) -> Option<FuzzyMatch> {
        self.resolve_in(query, &CandidateSet::new(candidates))
    }

    /// [`resolve`](Self::resolve) against prepared candidates.
    pub fn resolve_in(&self, query: &str, candidates: &CandidateSet) -> Option<FuzzyMatch> {
        let query = Prepared::new(query);
        let mut best: Option<(usize, f64)> = None;

        for (index, candidate) in candidates.items.iter().enumerate() {
            let cutoff = best.map_or(self.threshold, |(_, top)| top.max(self.threshold));
            let score = scored(&query, candidate, cutoff);
            if score >= self.threshold && best.is_none_or(|(_, top)| score > top) {
                best = Some((index, score));
                if score >= 100.0 {
                    break;
                }
            }
        }

        let (index, score) = best?;
        Some(FuzzyMatch {
            value: candidates.items[index].original.clone(),
            index,
            score,
        })
    }

    /// Up to `limit` candidates at or above the threshold, best first.
    ///
    /// Equal scores keep candidate order.
    pub fn resolve_many<S: AsRef<str>>(
        &self,
        query: &str,
        candidates: &[S],
        limit: usize,
    ) -> Vec<FuzzyMatch> {
        self.resolve_many_in(query, &CandidateSet::new(candidates), limit)
    }

    /// [`resolve_many`](Self::resolve_many) against prepared candidates.
    pub fn resolve_many_in(
        &self,
        query: &str,
        candidates: &CandidateSet,
        limit: usize,
    ) -> Vec<FuzzyMatch> {
        if limit == 0 {
            return Vec::new();
        }
        let query = Prepared::new(query);
        let mut matches: Vec<FuzzyMatch> = candidates
            .items
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                let score = scored(&query, candidate, self.threshold);
                (score >= self.threshold).then(|| FuzzyMatch {
                    value: candidate.original.clone(),
                    index,
                    score,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(limit);
        matches
    }
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

/// Weighted similarity of two strings in `[0, 100]`.
///
/// Case-insensitive and insensitive to token order. Empty input on either
/// side scores 0.
#[must_use]
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    scored(&Prepared::new(a), &Prepared::new(b), 0.0)
}

// ============================================================================
// Scoring
// ============================================================================

/// Lowercase, replace anything that isn't alphanumeric with a space, trim.
fn process(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Weighted ratio of `a` and `b`.
///
/// Exact whenever the true score is at least `cutoff`; otherwise some value
/// below `cutoff`.
fn scored(a: &Prepared, b: &Prepared, cutoff: f64) -> f64 {
    if a.chars == 0 || b.chars == 0 {
        return 0.0;
    }

    let shorter = a.chars.min(b.chars) as f64;
    let longer = a.chars.max(b.chars) as f64;
    let len_ratio = longer / shorter;

    if len_ratio < 1.5 {
        let end_ratio = ratio(&a.text, &b.text);
        let token = ratio(&a.sorted_tokens, &b.sorted_tokens).max(token_set_ratio(a, b));
        return end_ratio.max(token * UNBASE_SCALE);
    }

    // Edit distance is at least the length difference.
    let mut best = 0.0_f64;
    if 100.0 * shorter / longer >= cutoff - CUTOFF_SLACK {
        best = ratio(&a.text, &b.text);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    let floor = cutoff.max(best);

    let needed = floor / partial_scale;
    if needed <= 100.0 + CUTOFF_SLACK {
        best = best.max(partial_ratio(&a.text, &b.text, needed) * partial_scale);
    }

    let token_scale = UNBASE_SCALE * partial_scale;
    let needed = cutoff.max(best) / token_scale;
    if needed <= 100.0 + CUTOFF_SLACK {
        best = best.max(partial_token_ratio(a, b, needed) * token_scale);
    }
    best
}

/// Edit-distance similarity; adjacent transpositions count as one edit.
fn ratio(a: &str, b: &str) -> f64 {
    100.0 * normalized_damerau_levenshtein(a, b)
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

struct TokenSets<'a> {
    intersection: Vec<&'a str>,
    only_a: Vec<&'a str>,
    only_b: Vec<&'a str>,
}

impl<'a> TokenSets<'a> {
    fn new(a: &'a str, b: &'a str) -> Self {
        let set_a: BTreeSet<&str> = a.split_whitespace().collect();
        let set_b: BTreeSet<&str> = b.split_whitespace().collect();
        Self {
            intersection: set_a.intersection(&set_b).copied().collect(),
            only_a: set_a.difference(&set_b).copied().collect(),
            only_b: set_b.difference(&set_a).copied().collect(),
        }
    }
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

fn token_set_ratio(a: &Prepared, b: &Prepared) -> f64 {
    let sets = TokenSets::new(&a.text, &b.text);
    if !sets.intersection.is_empty() && (sets.only_a.is_empty() || sets.only_b.is_empty()) {
        return 100.0;
    }

    let sect = sets.intersection.join(" ");
    let combined_a = join_nonempty(&sect, &sets.only_a.join(" "));
    let combined_b = join_nonempty(&sect, &sets.only_b.join(" "));

    let mut best = ratio(&combined_a, &combined_b);
    if !sect.is_empty() {
        best = best.max(ratio(&sect, &combined_a)).max(ratio(&sect, &combined_b));
    }
    best
}

/// Sliding multiset of window characters, counted against a pattern.
///
/// `overlap` is the size of the multiset intersection, an upper bound on
/// the number of characters an alignment can leave unedited.
struct CharBag {
    counts: HashMap<char, (usize, usize)>,
    overlap: usize,
}

impl CharBag {
    fn new(pattern: &str) -> Self {
        let mut counts: HashMap<char, (usize, usize)> = HashMap::new();
        for c in pattern.chars() {
            counts.entry(c).or_default().0 += 1;
        }
        Self { counts, overlap: 0 }
    }

    fn push(&mut self, c: char) {
        if let Some((need, have)) = self.counts.get_mut(&c) {
            if *have < *need {
                self.overlap += 1;
            }
            *have += 1;
        }
    }

    fn pop(&mut self, c: char) {
        if let Some((need, have)) = self.counts.get_mut(&c) {
            *have -= 1;
            if *have < *need {
                self.overlap -= 1;
            }
        }
    }
}

/// Best Levenshtein ratio of the shorter string against every equal-length
/// window of the longer one.
///
/// Windows whose character overlap cannot reach `needed` (or beat the best
/// window so far) are skipped without running the edit distance.
fn partial_ratio(a: &str, b: &str, needed: f64) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let width = short.chars().count();
    if width == 0 {
        return 0.0;
    }
    let long_chars: Vec<(usize, char)> = long.char_indices().collect();
    if width >= long_chars.len() {
        return 100.0 * normalized_levenshtein(short, long);
    }

    let mut bag = CharBag::new(short);
    for &(_, c) in &long_chars[..width] {
        bag.push(c);
    }

    let mut best = 0.0_f64;
    for start in 0..=long_chars.len() - width {
        if start > 0 {
            bag.pop(long_chars[start - 1].1);
            bag.push(long_chars[start + width - 1].1);
        }

        let bound = 100.0 * bag.overlap as f64 / width as f64;
        if bound < needed - CUTOFF_SLACK || bound <= best {
            continue;
        }

        let end = long_chars
            .get(start + width)
            .map_or(long.len(), |&(offset, _)| offset);
        let window = &long[long_chars[start].0..end];
        best = best.max(100.0 * normalized_levenshtein(short, window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

fn partial_token_ratio(a: &Prepared, b: &Prepared, needed: f64) -> f64 {
    let sets = TokenSets::new(&a.text, &b.text);
    if !sets.intersection.is_empty() {
        return 100.0;
    }

    let sorted = partial_ratio(&a.sorted_tokens, &b.sorted_tokens, needed);
    if sets.only_a.is_empty() || sets.only_b.is_empty() {
        return sorted;
    }
    let needed = needed.max(sorted);
    sorted.max(partial_ratio(
        &sets.only_a.join(" "),
        &sets.only_b.join(" "),
        needed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic catalog of `size` distinct titles.
    fn generated_titles(size: usize) -> Vec<String> {
        const WORDS: [&str; 16] = [
            "shadow", "river", "empire", "garden", "winter", "stone", "night", "crown", "glass",
            "ember", "harbor", "echo", "silver", "forest", "tide", "lantern",
        ];
        (0..size)
            .map(|i| {
                let w = |k: usize| WORDS[(i / 16_usize.pow(k as u32)) % WORDS.len()];
                format!("The {} of the {} {} ({})", w(0), w(1), w(2), i / 4096)
            })
            .collect()
    }

    /// Best match by scoring every candidate with no cutoff.
    fn exhaustive(query: &str, titles: &[String], threshold: f64) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, title) in titles.iter().enumerate() {
            let score = weighted_ratio(query, title);
            if score >= threshold && best.is_none_or(|(_, top)| score > top) {
                best = Some((i, score));
            }
        }
        best
    }

    #[test]
    fn test_exact_match_scores_100() {
        assert_eq!(weighted_ratio("The Hobbit", "The Hobbit"), 100.0);
        assert_eq!(weighted_ratio("Alpha", "Alpha"), 100.0);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        assert_eq!(weighted_ratio("the hobbit!", "The Hobbit"), 100.0);
    }

    #[test]
    fn test_token_order_insensitive() {
        let score = weighted_ratio("Rowling J.K.", "J.K. Rowling");
        assert!(score >= 90.0, "score was {score}");
    }

    #[test]
    fn test_transposition_typo() {
        let score = weighted_ratio("Alpah", "Alpha");
        assert!((score - 80.0).abs() < 1e-9, "score was {score}");
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(weighted_ratio("", "Alpha"), 0.0);
        assert_eq!(weighted_ratio("   ", "Alpha"), 0.0);
        assert_eq!(weighted_ratio("Alpha", "!!"), 0.0);
    }

    #[test]
    fn test_partial_title_match() {
        let score = weighted_ratio("harry potter", "Harry Potter and the Philosopher's Stone");
        assert!(score >= 85.0, "score was {score}");
    }

    #[test]
    fn test_unrelated_strings_score_low() {
        assert!(weighted_ratio("zzzzqqq", "Alpha") < DEFAULT_THRESHOLD);
        assert!(weighted_ratio("xylophone", "Beta") < DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_cutoff_is_exact_above_and_low_below() {
        let pairs = [
            ("harry poter", "Harry Potter and the Chamber of Secrets"),
            ("shadow rivr", "The Shadow of the River"),
            ("dune", "Children of Dune"),
            ("qqqq", "The Lantern of the Glass"),
        ];
        for (a, b) in pairs {
            let (pa, pb) = (Prepared::new(a), Prepared::new(b));
            let exact = scored(&pa, &pb, 0.0);
            for cutoff in [0.0, 50.0, 70.0, 85.0, 99.0] {
                let pruned = scored(&pa, &pb, cutoff);
                if exact >= cutoff {
                    assert!((pruned - exact).abs() < 1e-9, "{a:?}/{b:?} at {cutoff}");
                } else {
                    assert!(pruned < cutoff, "{a:?}/{b:?} at {cutoff}");
                }
            }
        }
    }

    #[test]
    fn test_partial_ratio_skips_nothing_reachable() {
        assert_eq!(partial_ratio("river", "the shadow of the river", 0.0), 100.0);
        assert_eq!(partial_ratio("river", "the shadow of the river", 90.0), 100.0);
        let near = partial_ratio("rivr", "the shadow of the river", 0.0);
        assert!((near - 75.0).abs() < 1e-9, "score was {near}");
        assert!(partial_ratio("zzzz", "the shadow of the river", 50.0) < 50.0);
    }

    #[test]
    fn test_candidate_set_prepares_once() {
        let set = CandidateSet::new(&["  The Hobbit! ", "Dune"]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.items[0].processed(), "the hobbit");
        assert_eq!(set.items[0].original(), "  The Hobbit! ");
        assert!(CandidateSet::default().is_empty());
    }

    #[test]
    fn test_resolve_in_large_catalog_matches_exhaustive_scan() {
        let titles = generated_titles(5_000);
        let set = CandidateSet::new(&titles);
        let matcher = FuzzyMatcher::default();

        for query in [
            "harry poter",
            "The Shadow of the Rivr",
            "the hunger games: catching fire (book two)",
            "silver forest tide",
            "the ember of the crown echo (1)",
        ] {
            let found = matcher.resolve_in(query, &set).map(|m| (m.index, m.score));
            let expected = exhaustive(query, &titles, DEFAULT_THRESHOLD);
            match (found, expected) {
                (Some((i, s)), Some((j, t))) => {
                    assert_eq!(i, j, "{query:?}");
                    assert!((s - t).abs() < 1e-9, "{query:?}");
                }
                (None, None) => {}
                other => panic!("{query:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_resolve_many_in_matches_exhaustive_filter() {
        let titles = generated_titles(2_000);
        let set = CandidateSet::new(&titles);
        let matcher = FuzzyMatcher::default();

        let found = matcher.resolve_many_in("winter glass", &set, usize::MAX);
        let expected = titles
            .iter()
            .filter(|t| weighted_ratio("winter glass", t) >= DEFAULT_THRESHOLD)
            .count();
        assert_eq!(found.len(), expected);
        assert!(found.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_resolve_misspelled() {
        let matcher = FuzzyMatcher::default();
        let m = matcher.resolve("Alpah", &["Alpha", "Beta"]).unwrap();
        assert_eq!(m.value, "Alpha");
        assert_eq!(m.index, 0);
        assert!(m.score >= DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_resolve_exact_always_succeeds() {
        let matcher = FuzzyMatcher::default();
        let titles = ["Gamma", "Beta", "Alpha"];
        for (i, title) in titles.iter().enumerate() {
            let m = matcher.resolve(title, &titles).unwrap();
            assert_eq!(m.index, i);
            assert_eq!(m.score, 100.0);
        }
    }

    #[test]
    fn test_resolve_below_threshold() {
        let matcher = FuzzyMatcher::default();
        assert!(matcher.resolve("zzzzqqq", &["Alpha", "Beta", "Gamma"]).is_none());
    }

    #[test]
    fn test_resolve_empty_candidates() {
        let matcher = FuzzyMatcher::default();
        let empty: [&str; 0] = [];
        assert!(matcher.resolve("Alpha", &empty).is_none());
    }

    #[test]
    fn test_resolve_tie_takes_first() {
        let matcher = FuzzyMatcher::default();
        let m = matcher.resolve("Dune", &["Other", "Dune", "Dune"]).unwrap();
        assert_eq!(m.index, 1);
    }

    #[test]
    fn test_resolve_threshold_is_inclusive() {
        // "Alpah" vs "Alpha" scores 80
        assert!(FuzzyMatcher::new(79.9).resolve("Alpah", &["Alpha"]).is_some());
        assert!(FuzzyMatcher::new(80.1).resolve("Alpah", &["Alpha"]).is_none());
    }

    #[test]
    fn test_resolve_many_orders_and_limits() {
        let matcher = FuzzyMatcher::default();
        let titles = ["Dune Messiah", "Emma", "Dune", "Children of Dune", "Dune"];
        let matches = matcher.resolve_many("dune", &titles, 3);

        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].index, 2);
        assert_eq!(matches[1].index, 4);
        assert!(matches[1].score >= matches[2].score);
        assert!(matches.iter().all(|m| m.value != "Emma"));
    }

    #[test]
    fn test_resolve_many_filters_below_threshold() {
        let matcher = FuzzyMatcher::default();
        let matches = matcher.resolve_many("zzzzqqq", &["Alpha", "Beta"], 10);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_resolve_many_zero_limit() {
        let matcher = FuzzyMatcher::default();
        assert!(matcher.resolve_many("Alpha", &["Alpha"], 0).is_empty());
    }
}
