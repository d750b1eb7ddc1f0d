// Engine Configuration
//
// *La Configuration* (The Configuration) - Ranking, embedding, cache and platform settings

use crate::errors::{PasserelleError, Result as PasserelleResult};
use anyhow::{Context, Result};
use lecatalogue::PlatformFacts;
use lerecherche::ranking::{
    DEFAULT_SEMANTIC_BLEND_WEIGHT, DEFAULT_SEMANTIC_BOOST, DEFAULT_SEMANTIC_MIN_SIMILARITY,
    DEFAULT_STRONG_LEXICAL_THRESHOLD,
};
use lerecherche::semantic::{DEFAULT_MIN_SIMILARITY, DEFAULT_VOCABULARY_CAP};
use lerecherche::{BlendPolicy, EmbeddingOptions, DEFAULT_MAX_RESULTS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory name under the platform config/cache roots
pub const APP_DIR_NAME: &str = "reglages";

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Default debounce quiet window in milliseconds
pub const DEFAULT_QUIET_MS: u64 = 50;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Ranking settings
    pub search: SearchConfig,

    /// Embedding layer settings
    pub embedding: EmbeddingConfig,

    /// Startup cache settings
    pub cache: CacheConfig,

    /// Keystroke debouncing
    pub debounce: DebounceConfig,

    /// Platform facts used for availability
    pub platform: PlatformConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    ///
    /// A missing file yields the default configuration. The loaded values
    /// are validated before being returned.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(EngineConfig::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: EngineConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;

        Ok(config)
    }

    /// Save configuration as TOML, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Default config file location, `<config dir>/reglages/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(DEFAULT_CONFIG_FILE))
    }

    /// Check value ranges
    pub fn validate(&self) -> PasserelleResult<()> {
        let search = &self.search;
        if search.max_results == 0 {
            return Err(PasserelleError::invalid_config(
                "search.max_results",
                "must be at least 1",
            ));
        }
        for (field, value) in [
            ("search.strong_lexical_threshold", search.strong_lexical_threshold),
            ("search.semantic_boost", search.semantic_boost),
            ("search.semantic_blend_weight", search.semantic_blend_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PasserelleError::invalid_config(field, "must be a non-negative number"));
            }
        }
        if !(0.0..=1.0).contains(&search.semantic_min_similarity) {
            return Err(PasserelleError::invalid_config(
                "search.semantic_min_similarity",
                "must be between 0 and 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.embedding.min_similarity) {
            return Err(PasserelleError::invalid_config(
                "embedding.min_similarity",
                "must be between 0 and 1",
            ));
        }
        Ok(())
    }

    /// Blend policy built from `[search]`
    pub fn blend_policy(&self) -> BlendPolicy {
        BlendPolicy {
            strong_lexical_threshold: self.search.strong_lexical_threshold,
            semantic_min_similarity: self.search.semantic_min_similarity,
            semantic_boost: self.search.semantic_boost,
            semantic_blend_weight: self.search.semantic_blend_weight,
        }
    }

    /// Embedding options built from `[embedding]`
    pub fn embedding_options(&self) -> EmbeddingOptions {
        EmbeddingOptions {
            vocabulary_cap: self.embedding.vocabulary_cap,
            min_similarity: self.embedding.min_similarity,
        }
    }

    /// Platform facts built from `[platform]`
    pub fn platform_facts(&self) -> PlatformFacts {
        let facts = match self.platform.build_number {
            Some(build) => PlatformFacts::with_build(build),
            None => PlatformFacts::unknown(),
        };
        facts.with_tags(&self.platform.tags)
    }

    /// Cache directory: configured, else `<cache dir>/reglages`
    pub fn cache_directory(&self) -> Option<PathBuf> {
        self.cache
            .directory
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join(APP_DIR_NAME)))
    }

    /// Debounce quiet window
    pub fn quiet_window(&self) -> Duration {
        Duration::from_millis(self.debounce.quiet_ms)
    }
}

/// Ranking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Results returned per query
    pub max_results: usize,

    /// Lexical top score that skips the semantic layer
    pub strong_lexical_threshold: f64,

    /// Semantic hits below this similarity are ignored when blending
    pub semantic_min_similarity: f64,

    /// Similarity to score multiplier
    pub semantic_boost: f64,

    /// Semantic share when both signals are present
    pub semantic_blend_weight: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            strong_lexical_threshold: DEFAULT_STRONG_LEXICAL_THRESHOLD,
            semantic_min_similarity: DEFAULT_SEMANTIC_MIN_SIMILARITY,
            semantic_boost: DEFAULT_SEMANTIC_BOOST,
            semantic_blend_weight: DEFAULT_SEMANTIC_BLEND_WEIGHT,
        }
    }
}

/// Embedding layer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Build the term-frequency semantic layer
    pub enabled: bool,

    /// Vocabulary slots
    pub vocabulary_cap: usize,

    /// Similarity floor for lookups (exclusive)
    pub min_similarity: f32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            vocabulary_cap: DEFAULT_VOCABULARY_CAP,
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }
}

/// Startup cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Use the on-disk index cache
    pub enabled: bool,

    /// Cache directory override
    pub directory: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
        }
    }
}

/// Debounce configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Quiet window before a query is run
    pub quiet_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            quiet_ms: DEFAULT_QUIET_MS,
        }
    }
}

/// Platform configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PlatformConfig {
    /// OS build number; unknown when absent
    pub build_number: Option<u32>,

    /// Edition or capability tags, e.g. `pro`
    pub tags: Vec<String>,
}
