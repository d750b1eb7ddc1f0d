//! lestockage - Index Cache Storage
//!
//! *Le Stockage* (The Storage) - Catalog fingerprints and the startup index cache

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// File-backed cache of the resolved catalog snapshot.
pub mod cache;
/// Content fingerprint of the raw catalog bytes.
pub mod fingerprint;

pub use cache::{
    load_or_rebuild, CacheError, CacheKey, CacheStatus, CachedIndex, IndexCache,
    CACHE_SCHEMA_VERSION,
};
pub use fingerprint::compute_fingerprint;
