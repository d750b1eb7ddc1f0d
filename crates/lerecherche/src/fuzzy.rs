// Fuzzy Matching
//
// *Le Flou* (The Blur) - Transposition-aware edit distance for typo tolerance

/// Minimum edit similarity for a fuzzy match to count
pub const FUZZY_MIN_SIMILARITY: f64 = 0.6;

/// Score floor of an accepted fuzzy match
pub const FUZZY_BASE_SCORE: f64 = 50.0;

/// Score range added on top of the floor, scaled by similarity
pub const FUZZY_SCORE_SPAN: f64 = 20.0;

/// Optimal string alignment distance, counted in chars
///
/// Insertions, deletions, substitutions and swaps of two adjacent characters
/// each cost 1; a substring is never edited twice.
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::osa_distance(a, b)
}

/// Normalized edit similarity: `1 - distance / max(len(a), len(b))`
///
/// Returns `None` when both strings are empty.
pub fn edit_similarity(a: &str, b: &str) -> Option<f64> {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return None;
    }

    Some(1.0 - edit_distance(a, b) as f64 / max_len as f64)
}

/// Best edit similarity of `query` against any candidate
///
/// Empty candidates are skipped. Returns 0.0 if nothing was comparable.
pub fn best_similarity<'a>(query: &str, candidates: impl IntoIterator<Item = &'a str>) -> f64 {
    if query.is_empty() {
        return 0.0;
    }

    candidates
        .into_iter()
        .filter(|candidate| !candidate.is_empty())
        .filter_map(|candidate| edit_similarity(query, candidate))
        .fold(0.0, f64::max)
}

/// Fuzzy score for a query against an item's names
///
/// `50 + similarity * 20` when the best similarity reaches
/// [`FUZZY_MIN_SIMILARITY`], otherwise 0.
pub fn fuzzy_score<'a>(query: &str, candidates: impl IntoIterator<Item = &'a str>) -> f64 {
    let best = best_similarity(query, candidates);
    if best < FUZZY_MIN_SIMILARITY {
        return 0.0;
    }
    FUZZY_BASE_SCORE + best * FUZZY_SCORE_SPAN
}
