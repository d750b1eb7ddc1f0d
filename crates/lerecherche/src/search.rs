// Search engine facade
//
// *La Recherche* (The Search) - Immutable index answering per-keystroke queries

use crate::lexical::LexicalIndex;
use crate::query::normalize;
use crate::ranking::{compare_results, sort_results, BlendPolicy};
use crate::scorer::{score_item, MatchKind, MatchLocus};
use crate::semantic::{Embedder, EmbeddingIndex, EmbeddingOptions};
use lecatalogue::ResolvedItem;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default result cap used by hosts
pub const DEFAULT_MAX_RESULTS: usize = 12;

/// One ranked result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Matched item
    pub item: Arc<ResolvedItem>,

    /// Ranking score
    pub score: f64,

    /// Match classification
    pub kind: MatchKind,

    /// Where the match was found
    pub matched_on: MatchLocus,

    /// Synonym text as written in the catalog, for synonym matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_text: Option<String>,
}

impl SearchResult {
    /// Unranked browse entry
    pub fn browse(item: Arc<ResolvedItem>) -> Self {
        Self {
            item,
            score: 0.0,
            kind: MatchKind::Token,
            matched_on: MatchLocus::Default,
            matched_text: None,
        }
    }

    /// Entry found only by the embedding layer
    pub fn semantic(item: Arc<ResolvedItem>, score: f64) -> Self {
        Self {
            item,
            score,
            kind: MatchKind::Semantic,
            matched_on: MatchLocus::Semantic,
            matched_text: None,
        }
    }

    /// Presentation strength of the match kind, in `[0, 1]`
    pub fn match_strength(&self) -> f64 {
        self.kind.strength()
    }

    /// Exact name or synonym hit
    pub fn is_strong_match(&self) -> bool {
        matches!(self.kind, MatchKind::Exact | MatchKind::SynonymExact)
    }

    /// Short hint for the UI, e.g. `Matched: screen`
    pub fn match_hint(&self) -> Option<String> {
        match (&self.matched_on, &self.matched_text) {
            (MatchLocus::Synonym, Some(text)) if !text.is_empty() => {
                Some(format!("Matched: {}", text))
            }
            (MatchLocus::Category, _) => Some("Matched: category".to_string()),
            (MatchLocus::Semantic, _) => Some("Related".to_string()),
            _ => None,
        }
    }
}

enum EmbeddingMode {
    Default(EmbeddingOptions),
    Custom(Arc<dyn Embedder>, EmbeddingOptions),
    Disabled,
}

/// Configures and builds a [`SearchIndex`]
pub struct SearchIndexBuilder {
    policy: BlendPolicy,
    embedding: EmbeddingMode,
}

impl SearchIndexBuilder {
    /// Builder with default policy and the term-frequency embedder
    pub fn new() -> Self {
        Self {
            policy: BlendPolicy::default(),
            embedding: EmbeddingMode::Default(EmbeddingOptions::default()),
        }
    }

    /// Set the blend policy
    pub fn policy(mut self, policy: BlendPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set embedding options, keeping any custom embedder
    pub fn embedding_options(mut self, options: EmbeddingOptions) -> Self {
        self.embedding = match self.embedding {
            EmbeddingMode::Custom(embedder, _) => EmbeddingMode::Custom(embedder, options),
            _ => EmbeddingMode::Default(options),
        };
        self
    }

    /// Use a caller-supplied embedder instead of the term-frequency one
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        let options = match self.embedding {
            EmbeddingMode::Default(options) | EmbeddingMode::Custom(_, options) => options,
            EmbeddingMode::Disabled => EmbeddingOptions::default(),
        };
        self.embedding = EmbeddingMode::Custom(embedder, options);
        self
    }

    /// Lexical matching only
    pub fn without_embeddings(mut self) -> Self {
        self.embedding = EmbeddingMode::Disabled;
        self
    }

    /// Build the index over a resolved catalog snapshot
    pub fn build(self, items: impl IntoIterator<Item = ResolvedItem>) -> SearchIndex {
        let items: Vec<Arc<ResolvedItem>> = items.into_iter().map(Arc::new).collect();
        let catalog = items.iter().map(|resolved| &resolved.item);

        let lexical = LexicalIndex::build(catalog.clone());
        let embeddings = match self.embedding {
            EmbeddingMode::Default(options) => Some(EmbeddingIndex::build(catalog, options)),
            EmbeddingMode::Custom(embedder, options) => {
                Some(EmbeddingIndex::with_embedder(catalog, embedder, options))
            }
            EmbeddingMode::Disabled => None,
        };

        tracing::debug!(
            items = items.len(),
            semantic = embeddings.as_ref().map(EmbeddingIndex::embedder_name),
            "built search index"
        );

        SearchIndex {
            items,
            lexical,
            embeddings,
            policy: self.policy,
        }
    }
}

impl Default for SearchIndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable search index over one catalog snapshot
///
/// Every query method takes `&self` and touches no shared mutable state, so
/// one index can serve any number of threads at once.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    items: Vec<Arc<ResolvedItem>>,
    lexical: LexicalIndex,
    embeddings: Option<EmbeddingIndex>,
    policy: BlendPolicy,
}

impl SearchIndex {
    /// Build with defaults: lexical plus term-frequency semantic layer
    pub fn build(items: impl IntoIterator<Item = ResolvedItem>) -> Self {
        SearchIndexBuilder::new().build(items)
    }

    /// Start configuring an index
    pub fn builder() -> SearchIndexBuilder {
        SearchIndexBuilder::new()
    }

    /// Indexed items in catalog order
    pub fn items(&self) -> &[Arc<ResolvedItem>] {
        &self.items
    }

    /// Number of indexed items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the index has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Blend policy in effect
    pub fn policy(&self) -> &BlendPolicy {
        &self.policy
    }

    /// Whether an embedding layer with a non-empty vocabulary is attached
    pub fn has_semantic_layer(&self) -> bool {
        self.embeddings
            .as_ref()
            .is_some_and(|index| index.dimension() > 0)
    }

    /// Rank the catalog against a query using lexical matching only
    ///
    /// A query that normalizes to nothing returns the browse view: every item,
    /// available first, then by name, all with score 0.
    pub fn lexical_search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        let normalized = normalize(query);
        self.lexical_normalized(&normalized, max_results)
    }

    /// Rank the catalog against a query
    ///
    /// Lexical results are returned as they are when the top one is strong,
    /// the query is empty, or there is no semantic layer. Otherwise they are
    /// blended with embedding hits.
    pub fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        let normalized = normalize(query);
        let lexical = self.lexical_normalized(&normalized, max_results);

        if normalized.is_empty() || max_results == 0 || self.policy.is_strong(&lexical) {
            return lexical;
        }
        let Some(embeddings) = self.embeddings.as_ref().filter(|_| self.has_semantic_layer()) else {
            return lexical;
        };

        let hits = embeddings
            .find_similar(query, max_results)
            .into_iter()
            .filter_map(|hit| {
                self.items
                    .get(hit.position)
                    .map(|item| (item.clone(), f64::from(hit.similarity)))
            });

        self.policy.blend(lexical, hits, max_results)
    }

    fn lexical_normalized(&self, normalized: &str, max_results: usize) -> Vec<SearchResult> {
        if max_results == 0 {
            return Vec::new();
        }
        if normalized.is_empty() {
            return self.browse(max_results);
        }

        let mut results: Vec<SearchResult> = self
            .lexical
            .candidates(normalized)
            .into_iter()
            .filter_map(|position| {
                let item = self.items.get(position)?;
                let normalized_item = self.lexical.item(position)?;
                let m = score_item(normalized_item, item.available, normalized)?;
                Some(SearchResult {
                    item: item.clone(),
                    score: m.score,
                    kind: m.kind,
                    matched_on: m.locus,
                    matched_text: m.matched_text,
                })
            })
            .collect();

        sort_results(&mut results);
        results.truncate(max_results);
        results
    }

    fn browse(&self, max_results: usize) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = self
            .items
            .iter()
            .cloned()
            .map(SearchResult::browse)
            .collect();
        results.sort_by(compare_results);
        results.truncate(max_results);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lecatalogue::CatalogItem;

    fn catalog() -> Vec<ResolvedItem> {
        vec![
            ResolvedItem::available(
                CatalogItem::new("a", "Display settings").with_synonyms(["screen", "monitor"]),
            ),
            ResolvedItem::new(CatalogItem::new("b", "Copilot"), false),
            ResolvedItem::available(CatalogItem::new("c", "Bluetooth")),
        ]
    }

    #[test]
    fn test_exact_match() {
        let index = SearchIndex::build(catalog());
        let results = index.search("display", DEFAULT_MAX_RESULTS);
        assert_eq!(results[0].item.id(), "a");
        assert_eq!(results[0].kind, MatchKind::Prefix);

        let results = index.search("Display Settings", DEFAULT_MAX_RESULTS);
        assert_eq!(results[0].kind, MatchKind::Exact);
        assert_eq!(results[0].score, 100.0);
        assert!(results[0].is_strong_match());
    }

    #[test]
    fn test_browse_view() {
        let index = SearchIndex::build(catalog());
        let results = index.search("   ", 10);
        let ids: Vec<&str> = results.iter().map(|r| r.item.id()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert!(results.iter().all(|r| r.score == 0.0
            && r.kind == MatchKind::Token
            && r.matched_on == MatchLocus::Default));

        assert_eq!(index.search("", 2).len(), 2);
    }

    #[test]
    fn test_zero_cap() {
        let index = SearchIndex::build(catalog());
        assert!(index.search("display", 0).is_empty());
        assert!(index.search("", 0).is_empty());
    }

    #[test]
    fn test_match_hint() {
        let index = SearchIndex::build(catalog());
        let results = index.search("monitor", DEFAULT_MAX_RESULTS);
        assert_eq!(results[0].kind, MatchKind::SynonymExact);
        assert_eq!(results[0].match_hint().as_deref(), Some("Matched: monitor"));
        assert_eq!(results[0].match_strength(), 0.95);
    }

    #[test]
    fn test_unavailable_penalty_applies() {
        let index = SearchIndex::build(catalog());
        let results = index.search("copilot", DEFAULT_MAX_RESULTS);
        assert_eq!(results[0].score, 75.0);
        assert_eq!(results[0].kind, MatchKind::Exact);
    }

    #[test]
    fn test_semantic_layer_toggle() {
        let index = SearchIndex::builder().without_embeddings().build(catalog());
        assert!(!index.has_semantic_layer());
        assert!(SearchIndex::build(catalog()).has_semantic_layer());
        assert!(!SearchIndex::build(Vec::new()).has_semantic_layer());
    }
}
