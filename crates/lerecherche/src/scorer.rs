// Lexical Scorer
//
// *Le Juge* (The Judge) - Decision ladder scoring one item against one query

use crate::fuzzy::fuzzy_score;
use crate::lexical::NormalizedItem;
use crate::query::tokenize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized display name equals the query
pub const EXACT_SCORE: f64 = 100.0;
/// Query equals a normalized synonym
pub const SYNONYM_EXACT_SCORE: f64 = 95.0;
/// Display name starts with the query
pub const DISPLAY_PREFIX_SCORE: f64 = 90.0;
/// A synonym starts with the query
pub const SYNONYM_PREFIX_SCORE: f64 = 85.0;
/// Display name contains the query
pub const DISPLAY_CONTAINS_SCORE: f64 = 75.0;
/// A synonym contains the query
pub const SYNONYM_CONTAINS_SCORE: f64 = 70.0;
/// Base of the token overlap rule
pub const OVERLAP_BASE_SCORE: f64 = 60.0;
/// Added per overlapping query token
pub const OVERLAP_TOKEN_SCORE: f64 = 8.0;

/// Ladder scores below this also try fuzzy matching
pub const FUZZY_TRIGGER_SCORE: f64 = 70.0;
/// Subtracted from items that are not available on this platform
pub const UNAVAILABLE_PENALTY: f64 = 25.0;
/// Added when the item's category contains the query
pub const CATEGORY_BONUS: f64 = 4.0;

/// How a result matched the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchKind {
    /// Display name equals the query
    Exact,
    /// A synonym equals the query
    SynonymExact,
    /// Name or synonym starts with the query
    Prefix,
    /// Substring or token overlap match
    Token,
    /// Typo-tolerant edit distance match
    Fuzzy,
    /// Embedding similarity only
    Semantic,
}

impl MatchKind {
    /// Presentation strength of this kind, in `[0, 1]`
    pub fn strength(self) -> f64 {
        match self {
            MatchKind::Exact => 1.0,
            MatchKind::SynonymExact => 0.95,
            MatchKind::Prefix => 0.85,
            MatchKind::Token => 0.7,
            MatchKind::Semantic => 0.6,
            MatchKind::Fuzzy => 0.5,
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchKind::Exact => "exact",
            MatchKind::SynonymExact => "synonym-exact",
            MatchKind::Prefix => "prefix",
            MatchKind::Token => "token",
            MatchKind::Fuzzy => "fuzzy",
            MatchKind::Semantic => "semantic",
        };
        f.write_str(name)
    }
}

/// Which part of the item the match was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLocus {
    /// The display name
    Display,
    /// One of the synonyms
    Synonym,
    /// The category
    Category,
    /// The embedding layer
    Semantic,
    /// Unranked browse view
    Default,
}

impl MatchLocus {
    /// Stable lowercase label
    pub fn as_str(self) -> &'static str {
        match self {
            MatchLocus::Display => "display",
            MatchLocus::Synonym => "synonym",
            MatchLocus::Category => "category",
            MatchLocus::Semantic => "semantic",
            MatchLocus::Default => "default",
        }
    }
}

impl fmt::Display for MatchLocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of scoring one item
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalMatch {
    /// Final score after adjustments, always positive
    pub score: f64,

    /// Match classification
    pub kind: MatchKind,

    /// Where the match was found
    pub locus: MatchLocus,

    /// Synonym text as written in the catalog, for synonym matches
    pub matched_text: Option<String>,
}

struct Ladder<'a> {
    score: f64,
    kind: MatchKind,
    locus: MatchLocus,
    synonym: Option<&'a str>,
}

impl<'a> Ladder<'a> {
    fn display(score: f64, kind: MatchKind) -> Self {
        Self {
            score,
            kind,
            locus: MatchLocus::Display,
            synonym: None,
        }
    }

    fn synonym(score: f64, kind: MatchKind, original: &'a str) -> Self {
        Self {
            score,
            kind,
            locus: MatchLocus::Synonym,
            synonym: Some(original),
        }
    }
}

/// Score one normalized item against a normalized, non-empty query
///
/// Returns `None` when the item does not match at all (final score 0).
pub fn score_item(item: &NormalizedItem, available: bool, query: &str) -> Option<LexicalMatch> {
    if query.is_empty() {
        return None;
    }

    let mut ladder = climb(item, query);

    if ladder.score < FUZZY_TRIGGER_SCORE {
        let fuzzy = fuzzy_score(query, item.names());
        if fuzzy > ladder.score {
            ladder.score = fuzzy;
            ladder.kind = MatchKind::Fuzzy;
        }
    }

    let mut score = ladder.score;
    if !available {
        score -= UNAVAILABLE_PENALTY;
    }

    let mut locus = ladder.locus;
    let mut matched_text = ladder.synonym.map(str::to_string);
    if item.category.contains(query) {
        score += CATEGORY_BONUS;
        locus = MatchLocus::Category;
        matched_text = None;
    }

    let score = score.max(0.0);
    if score <= 0.0 {
        return None;
    }

    Some(LexicalMatch {
        score,
        kind: ladder.kind,
        locus,
        matched_text,
    })
}

fn climb<'a>(item: &'a NormalizedItem, query: &str) -> Ladder<'a> {
    let name = item.display_name.as_str();

    if name == query {
        return Ladder::display(EXACT_SCORE, MatchKind::Exact);
    }
    if let Some(s) = item.synonyms.iter().find(|s| s.normalized == query) {
        return Ladder::synonym(SYNONYM_EXACT_SCORE, MatchKind::SynonymExact, &s.original);
    }
    if name.starts_with(query) {
        return Ladder::display(DISPLAY_PREFIX_SCORE, MatchKind::Prefix);
    }
    if let Some(s) = item.synonyms.iter().find(|s| s.normalized.starts_with(query)) {
        return Ladder::synonym(SYNONYM_PREFIX_SCORE, MatchKind::Prefix, &s.original);
    }
    if name.contains(query) {
        return Ladder::display(DISPLAY_CONTAINS_SCORE, MatchKind::Token);
    }
    if let Some(s) = item.synonyms.iter().find(|s| s.normalized.contains(query)) {
        return Ladder::synonym(SYNONYM_CONTAINS_SCORE, MatchKind::Token, &s.original);
    }

    let overlap = token_overlap(item, query);
    let score = if overlap > 0 {
        OVERLAP_BASE_SCORE + overlap as f64 * OVERLAP_TOKEN_SCORE
    } else {
        0.0
    };
    Ladder::display(score, MatchKind::Token)
}

/// Count query tokens present in the item's tokens, verbatim or as a prefix
pub fn token_overlap(item: &NormalizedItem, query: &str) -> usize {
    tokenize(query)
        .filter(|token| {
            item.tokens.contains(*token) || item.tokens.iter().any(|t| t.starts_with(token))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy::{best_similarity, FUZZY_BASE_SCORE, FUZZY_MIN_SIMILARITY, FUZZY_SCORE_SPAN};
    use lecatalogue::CatalogItem;
    use proptest::prelude::*;
    use rstest::rstest;

    fn display_item() -> NormalizedItem {
        NormalizedItem::from_item(
            &CatalogItem::new("display", "Display settings")
                .with_synonyms(["Screen resolution", "monitor"])
                .with_category("System"),
        )
    }

    #[rstest]
    #[case("display settings", EXACT_SCORE, MatchKind::Exact, MatchLocus::Display)]
    #[case("monitor", SYNONYM_EXACT_SCORE, MatchKind::SynonymExact, MatchLocus::Synonym)]
    #[case("disp", DISPLAY_PREFIX_SCORE, MatchKind::Prefix, MatchLocus::Display)]
    #[case("screen res", SYNONYM_PREFIX_SCORE, MatchKind::Prefix, MatchLocus::Synonym)]
    #[case("settings", DISPLAY_CONTAINS_SCORE, MatchKind::Token, MatchLocus::Display)]
    #[case("resolution", SYNONYM_CONTAINS_SCORE, MatchKind::Token, MatchLocus::Synonym)]
    #[case("monitor setup", OVERLAP_BASE_SCORE + OVERLAP_TOKEN_SCORE, MatchKind::Token, MatchLocus::Display)]
    #[case("settings monitor", OVERLAP_BASE_SCORE + 2.0 * OVERLAP_TOKEN_SCORE, MatchKind::Token, MatchLocus::Display)]
    fn test_ladder(
        #[case] query: &str,
        #[case] score: f64,
        #[case] kind: MatchKind,
        #[case] locus: MatchLocus,
    ) {
        let m = score_item(&display_item(), true, query).expect("match");
        assert_eq!(m.score, score);
        assert_eq!(m.kind, kind);
        assert_eq!(m.locus, locus);
    }

    #[test]
    fn test_synonym_match_keeps_catalog_text() {
        let m = score_item(&display_item(), true, "screen").expect("match");
        assert_eq!(m.kind, MatchKind::Prefix);
        assert_eq!(m.matched_text.as_deref(), Some("Screen resolution"));
    }

    #[test]
    fn test_fuzzy_transposition() {
        let item = NormalizedItem::from_item(&CatalogItem::new("display", "Display"));
        let m = score_item(&item, true, "dispaly").expect("fuzzy match");
        assert_eq!(m.kind, MatchKind::Fuzzy);
        let expected = FUZZY_BASE_SCORE + (1.0 - 1.0 / 7.0) * FUZZY_SCORE_SPAN;
        assert!((m.score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_fuzzy_does_not_override_stronger_ladder() {
        // "monitor setup" overlaps one token (68) and is far from every name
        let m = score_item(&display_item(), true, "monitor setup").expect("match");
        assert_eq!(m.kind, MatchKind::Token);
    }

    #[test]
    fn test_no_match_is_excluded() {
        assert!(score_item(&display_item(), true, "bluetooth").is_none());
        assert!(score_item(&display_item(), true, "").is_none());
    }

    #[test]
    fn test_unavailable_penalty() {
        let m = score_item(&display_item(), false, "display settings").expect("match");
        assert_eq!(m.score, EXACT_SCORE - UNAVAILABLE_PENALTY);
        assert_eq!(m.kind, MatchKind::Exact);
    }

    #[test]
    fn test_category_bonus_moves_locus() {
        let m = score_item(&display_item(), true, "system").expect("category match");
        // "system" only hits the category token: one overlap plus the bonus
        assert_eq!(m.score, OVERLAP_BASE_SCORE + OVERLAP_TOKEN_SCORE + CATEGORY_BONUS);
        assert_eq!(m.locus, MatchLocus::Category);
        assert_eq!(m.matched_text, None);
    }

    #[test]
    fn test_penalty_floors_at_zero() {
        let item = NormalizedItem::from_item(&CatalogItem::new("x", "Sound"));
        // fuzzy "sounds" vs "sound": 50 + (5/6)*20 ≈ 66.7, minus 25 stays positive
        let m = score_item(&item, false, "sounds").expect("still positive");
        assert!(m.score > 0.0);

        let item = NormalizedItem::from_item(
            &CatalogItem::new("y", "Printers").with_category("Devices"),
        );
        // only the category token overlaps: 68 - 25 + 4
        let m = score_item(&item, false, "devices").expect("positive");
        assert_eq!(m.score, 47.0);
    }

    #[test]
    fn test_token_overlap_counts_prefixes() {
        let item = display_item();
        assert_eq!(token_overlap(&item, "disp mon"), 2);
        assert_eq!(token_overlap(&item, "xyz"), 0);
    }

    #[test]
    fn test_locus_labels() {
        assert_eq!(MatchLocus::Default.as_str(), "default");
        assert_eq!(
            serde_json::to_string(&MatchLocus::Synonym).expect("serialize"),
            "\"synonym\""
        );
        assert_eq!(MatchKind::SynonymExact.to_string(), "synonym-exact");
    }

    proptest! {
        #[test]
        fn prop_fuzzy_matches_respect_similarity_floor(
            name in "[a-e]{3,9}",
            synonyms in prop::collection::vec("[a-e]{3,9}", 0..3),
            query in "[a-e]{3,9}",
        ) {
            let item = NormalizedItem::from_item(
                &CatalogItem::new("item", name.as_str()).with_synonyms(synonyms.iter()),
            );
            let similarity = best_similarity(&query, item.names());

            let scored = score_item(&item, true, &query);

            if let Some(m) = scored.as_ref().filter(|m| m.kind == MatchKind::Fuzzy) {
                prop_assert!(similarity >= FUZZY_MIN_SIMILARITY);
                prop_assert!(
                    m.score >= FUZZY_BASE_SCORE + FUZZY_MIN_SIMILARITY * FUZZY_SCORE_SPAN - 1e-9
                );
            }
            if similarity < FUZZY_MIN_SIMILARITY {
                prop_assert_ne!(scored.map(|m| m.kind), Some(MatchKind::Fuzzy));
            }
        }
    }
}
