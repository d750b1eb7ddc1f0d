// Hybrid ranking
//
// *Le Classement* (The Ranking) - Result ordering and lexical/semantic blending

use crate::scorer::{MatchKind, MatchLocus};
use crate::search::SearchResult;
use lecatalogue::ResolvedItem;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Lexical top score at or above which the semantic layer is skipped
pub const DEFAULT_STRONG_LEXICAL_THRESHOLD: f64 = 70.0;

/// Similarity below which semantic hits are ignored when blending
pub const DEFAULT_SEMANTIC_MIN_SIMILARITY: f64 = 0.2;

/// Multiplier turning a similarity into a score
pub const DEFAULT_SEMANTIC_BOOST: f64 = 50.0;

/// Weight of the semantic score when both signals are present
pub const DEFAULT_SEMANTIC_BLEND_WEIGHT: f64 = 0.3;

/// How lexical and semantic signals are merged
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendPolicy {
    /// Lexical top score that counts as a strong match
    pub strong_lexical_threshold: f64,

    /// Semantic hits below this similarity are dropped
    pub semantic_min_similarity: f64,

    /// Similarity to score multiplier
    pub semantic_boost: f64,

    /// Semantic share when an item has both signals
    pub semantic_blend_weight: f64,
}

impl Default for BlendPolicy {
    fn default() -> Self {
        Self {
            strong_lexical_threshold: DEFAULT_STRONG_LEXICAL_THRESHOLD,
            semantic_min_similarity: DEFAULT_SEMANTIC_MIN_SIMILARITY,
            semantic_boost: DEFAULT_SEMANTIC_BOOST,
            semantic_blend_weight: DEFAULT_SEMANTIC_BLEND_WEIGHT,
        }
    }
}

impl BlendPolicy {
    /// Whether a sorted lexical result list already has a strong top match
    pub fn is_strong(&self, lexical: &[SearchResult]) -> bool {
        lexical
            .first()
            .is_some_and(|top| top.score >= self.strong_lexical_threshold)
    }

    /// Score contributed by a semantic hit, `None` below the minimum similarity
    pub fn semantic_score(&self, similarity: f64) -> Option<f64> {
        if similarity < self.semantic_min_similarity {
            return None;
        }
        Some(similarity * self.semantic_boost)
    }

    /// Final score of an item given both signals
    ///
    /// Lexical-dominant when both are positive, otherwise whichever is present.
    pub fn blended_score(&self, lexical: f64, semantic: f64) -> f64 {
        if lexical > 0.0 && semantic > 0.0 {
            lexical + semantic * self.semantic_blend_weight
        } else {
            lexical.max(semantic)
        }
    }

    /// Merge lexical results with semantic hits into one ranked list
    ///
    /// Hits for items already present lexically raise that item's semantic
    /// score instead of adding a second entry. The result is sorted by
    /// [`compare_results`] and capped at `max_results`.
    pub fn blend(
        &self,
        lexical: Vec<SearchResult>,
        semantic: impl IntoIterator<Item = (Arc<ResolvedItem>, f64)>,
        max_results: usize,
    ) -> Vec<SearchResult> {
        let mut records: Vec<BlendRecord> = Vec::with_capacity(lexical.len());
        let mut by_id: HashMap<String, usize> = HashMap::new();

        for result in lexical {
            by_id.insert(result.item.id().to_string(), records.len());
            records.push(BlendRecord {
                lexical: result.score,
                semantic: 0.0,
                result,
            });
        }

        for (item, similarity) in semantic {
            let Some(score) = self.semantic_score(similarity) else {
                continue;
            };

            match by_id.get(item.id()) {
                Some(&i) => records[i].semantic = score,
                None => {
                    by_id.insert(item.id().to_string(), records.len());
                    records.push(BlendRecord {
                        lexical: 0.0,
                        semantic: score,
                        result: SearchResult::semantic(item, score),
                    });
                }
            }
        }

        let mut blended: Vec<SearchResult> = records
            .into_iter()
            .map(|record| {
                let mut result = record.result;
                result.score = self.blended_score(record.lexical, record.semantic);
                if record.lexical <= 0.0 {
                    result.kind = MatchKind::Semantic;
                    result.matched_on = MatchLocus::Semantic;
                }
                result
            })
            .collect();

        sort_results(&mut blended);
        blended.truncate(max_results);
        blended
    }
}

struct BlendRecord {
    result: SearchResult,
    lexical: f64,
    semantic: f64,
}

/// Total order over results
///
/// Score descending, available before unavailable, display name ascending
/// ignoring case. Remaining ties fall back to the exact name and then the
/// item ID so the order never depends on input order.
pub fn compare_results(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.item.available.cmp(&a.item.available))
        .then_with(|| compare_names(a.item.display_name(), b.item.display_name()))
        .then_with(|| a.item.id().cmp(b.item.id()))
}

/// Sort results in place by [`compare_results`]
pub fn sort_results(results: &mut [SearchResult]) {
    results.sort_by(compare_results);
}

fn compare_names(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);
    folded_a.cmp(folded_b).then_with(|| a.cmp(b))
}
