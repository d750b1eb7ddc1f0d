// Index cache
//
// *Le Cache* (The Cache) - File-backed snapshot of the resolved catalog, keyed by content and platform

use crate::fingerprint::compute_fingerprint;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Bumped whenever the cached payload layout changes
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// File name of the cache inside its directory
pub const CACHE_FILE_NAME: &str = "index-cache.json";

/// Everything a cached snapshot depends on
///
/// Two keys are equal only if every field is equal; any difference is a miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKey {
    /// Payload layout version
    pub schema_version: u32,

    /// Fingerprint of the catalog bytes
    pub catalog_hash: String,

    /// Platform build number, if known
    pub build_number: Option<u32>,

    /// Platform tags that feed availability, sorted
    #[serde(default)]
    pub platform_tags: Vec<String>,

    /// Version of the application that wrote the cache
    pub app_version: String,
}

impl CacheKey {
    /// Key for the given catalog bytes on the given platform
    pub fn new(catalog_bytes: &[u8], build_number: Option<u32>, app_version: impl Into<String>) -> Self {
        Self {
            schema_version: CACHE_SCHEMA_VERSION,
            catalog_hash: compute_fingerprint(catalog_bytes),
            build_number,
            platform_tags: Vec::new(),
            app_version: app_version.into(),
        }
    }

    /// Add platform tags to the key
    pub fn with_platform_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags: Vec<String> = tags
            .into_iter()
            .map(|t| t.as_ref().to_lowercase())
            .collect();
        tags.sort();
        tags.dedup();
        self.platform_tags = tags;
        self
    }
}

/// On-disk envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedIndex<T> {
    /// Key the payload was stored under
    pub key: CacheKey,

    /// When the payload was written
    pub saved_at: DateTime<Utc>,

    /// Stored payload
    pub items: T,
}

/// Borrowing form of [`CachedIndex`] used for writes
#[derive(Serialize)]
struct CachedIndexRef<'a, T> {
    key: &'a CacheKey,
    saved_at: DateTime<Utc>,
    items: &'a T,
}

/// How a snapshot was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Loaded from a valid cache entry
    Hit,
    /// Rebuilt because the entry was missing, stale or unreadable
    Miss,
    /// Rebuilt without consulting any cache
    Disabled,
}

/// Cache errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Reading, writing or removing the cache file failed
    #[error("Cache I/O error at {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The payload could not be encoded
    #[error("Cache encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Single-file JSON cache for a resolved catalog snapshot
#[derive(Debug, Clone)]
pub struct IndexCache {
    path: PathBuf,
}

impl IndexCache {
    /// Cache stored as [`CACHE_FILE_NAME`] inside `directory`
    pub fn new(directory: &Path) -> Self {
        Self {
            path: directory.join(CACHE_FILE_NAME),
        }
    }

    /// Cache file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot stored under `key`
    ///
    /// A missing file or a key mismatch is `Ok(None)`. A file that does not
    /// decode is removed and also reported as `Ok(None)`. Only I/O failures
    /// are errors.
    pub fn load<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<CachedIndex<T>>, CacheError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let cached: CachedIndex<T> = match serde_json::from_slice(&bytes) {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding corrupted index cache");
                if let Err(e) = fs::remove_file(&self.path) {
                    tracing::warn!(path = %self.path.display(), error = %e, "failed to remove corrupted index cache");
                }
                return Ok(None);
            }
        };

        if &cached.key != key {
            tracing::debug!(
                stored = %cached.key.catalog_hash,
                wanted = %key.catalog_hash,
                "index cache key mismatch"
            );
            return Ok(None);
        }

        Ok(Some(cached))
    }

    /// Write `items` under `key`, replacing any previous entry
    pub fn store<T: Serialize>(&self, key: &CacheKey, items: &T) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let envelope = CachedIndexRef {
            key,
            saved_at: Utc::now(),
            items,
        };
        let bytes = serde_json::to_vec(&envelope)?;

        fs::write(&self.path, bytes).map_err(|source| CacheError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Remove the cache file; `Ok(false)` if there was none
    pub fn clear(&self) -> Result<bool, CacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// Load a snapshot from `cache`, or rebuild it and write it back
///
/// Read failures count as a miss and write failures are only logged, so this
/// never fails. With no cache the snapshot is always rebuilt.
pub fn load_or_rebuild<T, F>(cache: Option<&IndexCache>, key: &CacheKey, rebuild: F) -> (T, CacheStatus)
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    let Some(cache) = cache else {
        return (rebuild(), CacheStatus::Disabled);
    };

    match cache.load::<T>(key) {
        Ok(Some(cached)) => {
            tracing::debug!(saved_at = %cached.saved_at, "index cache hit");
            return (cached.items, CacheStatus::Hit);
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "index cache unreadable, rebuilding"),
    }

    let items = rebuild();
    if let Err(e) = cache.store(key, &items) {
        tracing::warn!(error = %e, "failed to write index cache");
    }
    (items, CacheStatus::Miss)
}
