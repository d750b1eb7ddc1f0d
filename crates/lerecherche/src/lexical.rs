// Lexical Index
//
// *L'Index Lexical* (The Lexical Index) - Normalized item text and a token inverted index

use crate::query::{normalize, tokenize};
use lecatalogue::CatalogItem;
use std::collections::{BTreeSet, HashMap, HashSet};

/// A synonym in normalized form, with the catalog spelling kept for UI hints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSynonym {
    /// Normalized text used for matching
    pub normalized: String,

    /// Synonym as written in the catalog
    pub original: String,
}

/// Normalized text bundle for one catalog item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedItem {
    /// Normalized display name
    pub display_name: String,

    /// Non-empty normalized synonyms, in catalog order
    pub synonyms: Vec<NormalizedSynonym>,

    /// Normalized category
    pub category: String,

    /// Tokens drawn from name, synonyms and category
    pub tokens: HashSet<String>,
}

impl NormalizedItem {
    /// Normalize one catalog item
    pub fn from_item(item: &CatalogItem) -> Self {
        let display_name = normalize(&item.display_name);
        let synonyms: Vec<NormalizedSynonym> = item
            .synonyms
            .iter()
            .map(|s| NormalizedSynonym {
                normalized: normalize(s),
                original: s.clone(),
            })
            .filter(|s| !s.normalized.is_empty())
            .collect();
        let category = normalize(&item.category);

        let mut tokens: HashSet<String> = tokenize(&display_name).map(str::to_string).collect();
        for synonym in &synonyms {
            tokens.extend(tokenize(&synonym.normalized).map(str::to_string));
        }
        tokens.extend(tokenize(&category).map(str::to_string));

        Self {
            display_name,
            synonyms,
            category,
            tokens,
        }
    }

    /// Display name followed by all synonyms, for fuzzy comparison
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.display_name.as_str())
            .chain(self.synonyms.iter().map(|s| s.normalized.as_str()))
    }
}

/// Inverted token index over a catalog snapshot
///
/// Positions refer to the order of the items the index was built from.
#[derive(Debug, Clone, Default)]
pub struct LexicalIndex {
    items: Vec<NormalizedItem>,
    postings: HashMap<String, Vec<usize>>,
}

impl LexicalIndex {
    /// Build the index from catalog items
    pub fn build<'a>(items: impl IntoIterator<Item = &'a CatalogItem>) -> Self {
        let items: Vec<NormalizedItem> = items.into_iter().map(NormalizedItem::from_item).collect();

        let mut postings: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, item) in items.iter().enumerate() {
            for token in &item.tokens {
                postings.entry(token.clone()).or_default().push(position);
            }
        }

        tracing::debug!(
            items = items.len(),
            vocabulary = postings.len(),
            "built lexical index"
        );

        Self { items, postings }
    }

    /// Number of indexed items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the index has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct indexed tokens
    pub fn vocabulary_size(&self) -> usize {
        self.postings.len()
    }

    /// Normalized bundle for an item position
    pub fn item(&self, position: usize) -> Option<&NormalizedItem> {
        self.items.get(position)
    }

    /// Candidate item positions for a normalized query, ascending
    ///
    /// A query without tokens yields every item. Otherwise the candidates are
    /// the items holding any query token verbatim, widened by items holding a
    /// token that starts with or contains a query token. If that is still
    /// empty, every item is returned so fuzzy scoring can run.
    ///
    /// The widening pass walks the whole token vocabulary once per query
    /// token, `O(query tokens × vocabulary)`. That is cheap for catalogs in
    /// the hundreds of items but is the first thing to revisit for larger
    /// catalogs.
    pub fn candidates(&self, normalized_query: &str) -> Vec<usize> {
        let tokens: Vec<&str> = tokenize(normalized_query).collect();
        if tokens.is_empty() {
            return self.all_positions();
        }

        let mut candidates = BTreeSet::new();
        for token in &tokens {
            if let Some(positions) = self.postings.get(*token) {
                candidates.extend(positions.iter().copied());
            }
        }

        for token in &tokens {
            for (indexed, positions) in &self.postings {
                if indexed.contains(token) {
                    candidates.extend(positions.iter().copied());
                }
            }
        }

        if candidates.is_empty() {
            return self.all_positions();
        }

        candidates.into_iter().collect()
    }

    fn all_positions(&self) -> Vec<usize> {
        (0..self.items.len()).collect()
    }
}
