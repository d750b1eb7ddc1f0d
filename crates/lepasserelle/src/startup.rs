// Startup Pipeline
//
// *Le Démarrage* (The Startup) - Catalog load, cache, availability and index build

use crate::config::EngineConfig;
use crate::errors::{PasserelleError, Result};
use lecatalogue::{
    merge_discovered, parse_catalog_lossy, resolve_all, Catalog, CatalogItem, ResolvedItem,
};
use lerecherche::{SearchIndex, SearchResult};
use lestockage::{compute_fingerprint, load_or_rebuild, CacheKey, CacheStatus, IndexCache};
use std::path::Path;
use std::time::Instant;

/// Version written into cache keys
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Source of items found at runtime rather than in the catalog file
pub trait DiscoverySource {
    /// Discover additional items; failures should yield an empty list
    fn discover(&self) -> Vec<CatalogItem>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Discovers nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiscovery;

impl DiscoverySource for NoDiscovery {
    fn discover(&self) -> Vec<CatalogItem> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Discovery backed by a fixed item list
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery {
    items: Vec<CatalogItem>,
}

impl StaticDiscovery {
    /// Wrap a list of discovered items
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }
}

impl DiscoverySource for StaticDiscovery {
    fn discover(&self) -> Vec<CatalogItem> {
        self.items.clone()
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// A ready-to-query engine plus how it was built
#[derive(Debug, Clone)]
pub struct Engine {
    index: SearchIndex,
    cache_status: CacheStatus,
    fingerprint: String,
    max_results: usize,
}

impl Engine {
    /// Run the full startup pipeline over raw catalog bytes
    ///
    /// Unparseable bytes give an empty catalog. The cache is consulted and
    /// refreshed according to `config`; cache problems only cost a rebuild.
    pub fn start(catalog_bytes: &[u8], config: &EngineConfig, discovery: &dyn DiscoverySource) -> Self {
        let started = Instant::now();
        let facts = config.platform_facts();
        let key = CacheKey::new(catalog_bytes, facts.build_number, APP_VERSION)
            .with_platform_tags(&facts.tags);
        let fingerprint = key.catalog_hash.clone();

        let cache = if config.cache.enabled {
            config.cache_directory().map(|dir| IndexCache::new(&dir))
        } else {
            None
        };

        let (items, cache_status) = load_or_rebuild(cache.as_ref(), &key, || {
            let catalog = parse_catalog_lossy(catalog_bytes);
            let discovered = discovery.discover();
            tracing::debug!(
                catalog = catalog.len(),
                discovered = discovered.len(),
                source = discovery.name(),
                "resolving catalog"
            );
            let merged = merge_discovered(catalog.items, discovered);
            resolve_all(merged, &facts)
        });

        let index = build_index(items, config);

        tracing::info!(
            items = index.len(),
            cache = ?cache_status,
            semantic = index.has_semantic_layer(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search engine ready"
        );

        Self {
            index,
            cache_status,
            fingerprint,
            max_results: config.search.max_results,
        }
    }

    /// Start from a catalog file; a missing or unreadable file gives an empty catalog
    pub fn start_from_path(path: &Path, config: &EngineConfig, discovery: &dyn DiscoverySource) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "catalog unavailable, starting empty");
                Vec::new()
            }
        };
        Self::start(&bytes, config, discovery)
    }

    /// Build directly from resolved items, skipping catalog parsing and the cache
    pub fn from_items(items: Vec<ResolvedItem>, config: &EngineConfig) -> Self {
        Self {
            index: build_index(items, config),
            cache_status: CacheStatus::Disabled,
            fingerprint: String::new(),
            max_results: config.search.max_results,
        }
    }

    /// Query with the configured result cap
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        self.index.search(query, self.max_results)
    }

    /// Query with an explicit result cap
    pub fn search_with_limit(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        self.index.search(query, max_results)
    }

    /// Underlying index
    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    /// Whether the snapshot came from the cache
    pub fn cache_status(&self) -> CacheStatus {
        self.cache_status
    }

    /// Fingerprint of the catalog bytes the engine was started from
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Configured result cap
    pub fn max_results(&self) -> usize {
        self.max_results
    }
}

fn build_index(items: Vec<ResolvedItem>, config: &EngineConfig) -> SearchIndex {
    let builder = SearchIndex::builder().policy(config.blend_policy());
    let builder = if config.embedding.enabled {
        builder.embedding_options(config.embedding_options())
    } else {
        builder.without_embeddings()
    };
    builder.build(items)
}

/// Read and strictly parse a catalog file, reporting errors
pub fn read_catalog(path: &Path) -> Result<(Catalog, String)> {
    let bytes = std::fs::read(path).map_err(|e| PasserelleError::read(path, e))?;
    let catalog = Catalog::from_json(&bytes)?;
    Ok((catalog, compute_fingerprint(&bytes)))
}
