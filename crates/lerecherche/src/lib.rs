// lerecherche - Search & Ranking
//
// *La Recherche* (The Search) - Lexical, fuzzy and semantic ranking of catalog items

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

//! Incremental search over a small settings catalog.
//!
//! A [`SearchIndex`] is built once from a resolved catalog snapshot and then
//! answers queries on every keystroke. Lexical matching runs first; a
//! term-frequency embedding layer is consulted only when the best lexical
//! match is weak.

pub mod fuzzy;
pub mod lexical;
pub mod query;
pub mod ranking;
pub mod scorer;
pub mod search;
pub mod semantic;
pub mod vector;

pub use lexical::{LexicalIndex, NormalizedItem};
pub use query::normalize;
pub use ranking::{compare_results, sort_results, BlendPolicy};
pub use scorer::{score_item, LexicalMatch, MatchKind, MatchLocus};
pub use search::{SearchIndex, SearchIndexBuilder, SearchResult, DEFAULT_MAX_RESULTS};
pub use semantic::{
    Embedder, EmbeddingIndex, EmbeddingOptions, SemanticHit, TermFrequencyEmbedder, Vocabulary,
};
pub use vector::VectorIndex;
