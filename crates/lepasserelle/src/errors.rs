// Error Handling
//
// *La Gestion des Erreurs* (The Error Management) - Host-side error types

use std::path::PathBuf;
use thiserror::Error;

/// Result type for host operations
pub type Result<T> = std::result::Result<T, PasserelleError>;

/// Host bridge errors
///
/// The search engine itself never fails; these cover the edges around it.
#[derive(Debug, Error)]
pub enum PasserelleError {
    /// A configuration value is out of range
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// Dotted config key, e.g. `search.max_results`
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// A file the host was asked to read could not be read
    #[error("Failed to read {path:?}: {source}")]
    Read {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Catalog document could not be parsed
    #[error(transparent)]
    Catalog(#[from] lecatalogue::CatalogError),

    /// Index cache failure
    #[error(transparent)]
    Cache(#[from] lestockage::CacheError),
}

impl PasserelleError {
    /// Create a configuration error
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        PasserelleError::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a read error
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PasserelleError::Read {
            path: path.into(),
            source,
        }
    }

    /// Short remedy shown by the CLI, when one exists
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            PasserelleError::InvalidConfig { .. } => {
                Some("Fix the value or delete the key to use the default")
            }
            PasserelleError::Read { .. } => Some("Check the path passed with --catalog"),
            PasserelleError::Catalog(_) => Some("Validate the catalog JSON document"),
            PasserelleError::Cache(_) => Some("Run with --no-cache or clear the cache directory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let error = PasserelleError::invalid_config("search.max_results", "must be at least 1");
        assert_eq!(
            error.to_string(),
            "Invalid configuration for search.max_results: must be at least 1"
        );
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_catalog_error_converts() {
        let parse = lecatalogue::Catalog::from_json(b"not json").expect_err("invalid");
        let error: PasserelleError = parse.into();
        assert!(matches!(error, PasserelleError::Catalog(_)));
    }

    #[test]
    fn test_read_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = PasserelleError::read("/tmp/catalog.json", io);
        assert!(std::error::Error::source(&error).is_some());
    }
}
