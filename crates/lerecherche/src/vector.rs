// Vector Search Implementation
//
// *Le Vector* (The Vector) - Brute-force cosine similarity over item embeddings

use std::collections::HashMap;

/// Vector index over catalog item embeddings
///
/// Vectors are kept in insertion order so that equal similarities always
/// come back in the same order. Catalogs are small enough that a linear scan
/// per query is the fastest option.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    /// Item IDs, parallel to `embeddings`
    ids: Vec<String>,

    /// Embeddings in insertion order
    embeddings: Vec<Vec<f32>>,

    /// Item ID to slot lookup
    slots: HashMap<String, usize>,

    /// Embedding dimension
    dimension: usize,
}

/// One similarity hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorHit {
    /// Insertion slot of the matched vector
    pub slot: usize,

    /// Cosine similarity to the query
    pub similarity: f32,
}

impl VectorIndex {
    /// Create an empty index for vectors of `dimension` components
    pub fn new(dimension: usize) -> Self {
        Self {
            ids: Vec::new(),
            embeddings: Vec::new(),
            slots: HashMap::new(),
            dimension,
        }
    }

    /// Insert an item's vector
    ///
    /// # Returns
    ///
    /// The slot the vector was stored at, or an error if the dimension does
    /// not match, a component is not finite, or the ID is already present.
    pub fn insert(&mut self, item_id: impl Into<String>, embedding: Vec<f32>) -> Result<usize, Error> {
        let item_id = item_id.into();
        if embedding.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                got: embedding.len(),
            });
        }
        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidEmbedding(item_id));
        }
        if self.slots.contains_key(&item_id) {
            return Err(Error::DuplicateId(item_id));
        }

        let slot = self.embeddings.len();
        self.slots.insert(item_id.clone(), slot);
        self.ids.push(item_id);
        self.embeddings.push(embedding);
        Ok(slot)
    }

    /// Find the vectors most similar to `query`
    ///
    /// Keeps similarities strictly greater than `min_similarity`, sorted
    /// descending with ties in insertion order, at most `top_k` of them.
    /// A query of the wrong dimension matches nothing.
    pub fn search(&self, query: &[f32], top_k: usize, min_similarity: f32) -> Vec<VectorHit> {
        if query.len() != self.dimension || top_k == 0 {
            return Vec::new();
        }

        let mut hits: Vec<VectorHit> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(slot, embedding)| VectorHit {
                slot,
                similarity: cosine_similarity(query, embedding),
            })
            .filter(|hit| hit.similarity > min_similarity)
            .collect();

        // stable sort: equal similarities stay in slot order
        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        hits.truncate(top_k);
        hits
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    /// Whether no vector has been stored
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    /// Components per vector
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Item ID stored at a slot
    pub fn id(&self, slot: usize) -> Option<&str> {
        self.ids.get(slot).map(String::as_str)
    }

    /// Get a vector by item ID
    pub fn get(&self, item_id: &str) -> Option<&[f32]> {
        self.slots
            .get(item_id)
            .and_then(|&slot| self.embeddings.get(slot))
            .map(Vec::as_slice)
    }
}

/// Scale a vector to unit Euclidean length in place
///
/// A zero vector stays zero.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Cosine of the angle between two vectors, in `-1.0..=1.0`
///
/// 0.0 when the lengths differ or either vector is zero. For unit vectors
/// this is the plain dot product.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot_product = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b) {
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Vector index errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Provided embedding dimension does not match the index dimension
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension received
        got: usize,
    },

    /// The embedding contains NaN or infinite values
    #[error("Invalid embedding for item {0}")]
    InvalidEmbedding(String),

    /// An embedding for this item ID was already inserted
    #[error("Duplicate item id: {0}")]
    DuplicateId(String),
}
