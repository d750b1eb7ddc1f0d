// Semantic Layer
//
// *Le Sens* (The Meaning) - Deterministic term-frequency embeddings and similarity lookup
//
// The default embedder is a bag-of-words vectorizer over a vocabulary built
// from the catalog itself. Any other encoder can be plugged in through the
// `Embedder` trait; the ranker only ever sees vectors.

use crate::query::embedding_terms;
use crate::vector::{l2_normalize, VectorIndex};
use lecatalogue::CatalogItem;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Default number of vocabulary slots
pub const DEFAULT_VOCABULARY_CAP: usize = 1000;

/// Default floor for similarity lookups (exclusive)
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.1;

/// Turns text into a fixed-length vector
///
/// Implementations must be deterministic and return vectors of exactly
/// [`Embedder::dimension`] components.
pub trait Embedder: Send + Sync {
    /// Embed a piece of text
    fn embed(&self, text: &str) -> Vec<f32>;

    /// Length of every vector this embedder returns
    fn dimension(&self) -> usize;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Term to slot mapping, most frequent term first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    terms: Vec<String>,
    slots: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from a set of documents
    ///
    /// Each term is counted once per document it appears in. The `cap` most
    /// frequent terms are kept; equal counts keep first-seen order.
    pub fn build<'a>(documents: impl IntoIterator<Item = &'a str>, cap: usize) -> Self {
        // term -> (document count, first seen)
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        let mut seen_order = 0usize;

        for document in documents {
            let mut in_document = HashSet::new();
            for term in embedding_terms(document) {
                if !in_document.insert(term.clone()) {
                    continue;
                }
                let entry = counts.entry(term).or_insert_with(|| {
                    seen_order += 1;
                    (0, seen_order)
                });
                entry.0 += 1;
            }
        }

        let mut ranked: Vec<(String, usize, usize)> = counts
            .into_iter()
            .map(|(term, (count, first))| (term, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked.truncate(cap);

        let terms: Vec<String> = ranked.into_iter().map(|(term, _, _)| term).collect();
        let slots = terms
            .iter()
            .enumerate()
            .map(|(slot, term)| (term.clone(), slot))
            .collect();

        Self { terms, slots }
    }

    /// Slot of a term, if it made it into the vocabulary
    pub fn slot(&self, term: &str) -> Option<usize> {
        self.slots.get(term).copied()
    }

    /// Terms in slot order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the vocabulary has no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Local TF embedder: `1 + ln(count)` per vocabulary term, L2-normalized
#[derive(Debug, Clone)]
pub struct TermFrequencyEmbedder {
    vocabulary: Vocabulary,
}

impl TermFrequencyEmbedder {
    /// Create an embedder over a fixed vocabulary
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// The vocabulary backing this embedder
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

impl Embedder for TermFrequencyEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let mut counts: HashMap<usize, u32> = HashMap::new();
        for term in embedding_terms(text) {
            if let Some(slot) = self.vocabulary.slot(&term) {
                *counts.entry(slot).or_insert(0) += 1;
            }
        }

        let mut vector = vec![0.0f32; self.vocabulary.len()];
        for (slot, count) in counts {
            vector[slot] = 1.0 + (count as f32).ln();
        }
        l2_normalize(&mut vector);
        vector
    }

    fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    fn name(&self) -> &str {
        "term-frequency"
    }
}

/// Text an item contributes to the embedding space
///
/// Display name, category, breadcrumbs, description, synonyms and tags,
/// joined by spaces.
pub fn searchable_text(item: &CatalogItem) -> String {
    let mut parts: Vec<&str> = vec![item.display_name.as_str(), item.category.as_str()];
    parts.extend(item.breadcrumbs.iter().map(String::as_str));
    parts.push(&item.description);
    parts.extend(item.synonyms.iter().map(String::as_str));
    parts.extend(item.tags.iter().map(String::as_str));
    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

/// Embedding index construction options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbeddingOptions {
    /// Maximum vocabulary size for the default embedder
    pub vocabulary_cap: usize,

    /// Similarities must be strictly greater than this to be returned
    pub min_similarity: f32,
}

impl Default for EmbeddingOptions {
    fn default() -> Self {
        Self {
            vocabulary_cap: DEFAULT_VOCABULARY_CAP,
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }
}

/// Semantic hit against the item at `position`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemanticHit {
    /// Position of the item in the catalog snapshot
    pub position: usize,

    /// Cosine similarity to the query
    pub similarity: f32,
}

/// One precomputed vector per catalog item
#[derive(Clone)]
pub struct EmbeddingIndex {
    embedder: Arc<dyn Embedder>,
    vectors: VectorIndex,
    positions: Vec<usize>,
    min_similarity: f32,
}

impl std::fmt::Debug for EmbeddingIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingIndex")
            .field("embedder", &self.embedder.name())
            .field("dimension", &self.vectors.dimension())
            .field("vectors", &self.vectors.len())
            .finish()
    }
}

impl EmbeddingIndex {
    /// Build with the default term-frequency embedder
    pub fn build<'a>(items: impl IntoIterator<Item = &'a CatalogItem>, options: EmbeddingOptions) -> Self {
        let items: Vec<&CatalogItem> = items.into_iter().collect();
        let texts: Vec<String> = items.iter().map(|item| searchable_text(item)).collect();
        let vocabulary = Vocabulary::build(texts.iter().map(String::as_str), options.vocabulary_cap);
        let embedder = Arc::new(TermFrequencyEmbedder::new(vocabulary));
        Self::from_texts(&items, &texts, embedder, options)
    }

    /// Build with a caller-supplied embedder
    pub fn with_embedder<'a>(
        items: impl IntoIterator<Item = &'a CatalogItem>,
        embedder: Arc<dyn Embedder>,
        options: EmbeddingOptions,
    ) -> Self {
        let items: Vec<&CatalogItem> = items.into_iter().collect();
        let texts: Vec<String> = items.iter().map(|item| searchable_text(item)).collect();
        Self::from_texts(&items, &texts, embedder, options)
    }

    fn from_texts(
        items: &[&CatalogItem],
        texts: &[String],
        embedder: Arc<dyn Embedder>,
        options: EmbeddingOptions,
    ) -> Self {
        let mut vectors = VectorIndex::new(embedder.dimension());
        let mut positions = Vec::with_capacity(items.len());

        for (position, (item, text)) in items.iter().zip(texts).enumerate() {
            match vectors.insert(item.id.as_str(), embedder.embed(text)) {
                Ok(_) => positions.push(position),
                Err(e) => tracing::warn!(id = %item.id, error = %e, "skipping item embedding"),
            }
        }

        tracing::debug!(
            embedder = embedder.name(),
            dimension = embedder.dimension(),
            vectors = vectors.len(),
            "built embedding index"
        );

        Self {
            embedder,
            vectors,
            positions,
            min_similarity: options.min_similarity,
        }
    }

    /// Embed text with this index's embedder
    pub fn embed(&self, text: &str) -> Vec<f32> {
        self.embedder.embed(text)
    }

    /// Vector dimension, 0 when the vocabulary is empty
    pub fn dimension(&self) -> usize {
        self.vectors.dimension()
    }

    /// Number of item vectors
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether no item has a vector
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Name of the embedder in use
    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    /// Items most similar to the query text, best first, at most `top_k`
    pub fn find_similar(&self, query: &str, top_k: usize) -> Vec<SemanticHit> {
        if self.dimension() == 0 {
            return Vec::new();
        }

        let query_vector = self.embed(query);
        self.vectors
            .search(&query_vector, top_k, self.min_similarity)
            .into_iter()
            .filter_map(|hit| {
                self.positions.get(hit.slot).map(|&position| SemanticHit {
                    position,
                    similarity: hit.similarity,
                })
            })
            .collect()
    }
}
