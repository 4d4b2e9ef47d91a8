//! Error types for loading catalog files
//!
//! Covers every way reading the on-disk dataset can fail:
//! - Missing files (taxonomy, schema, CSV inputs)
//! - IO failures while reading or writing
//! - Malformed YAML / JSON / TOML content
//! - Invalid discovery globs

use std::path::PathBuf;

/// Errors raised while reading or writing catalog files
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Required file does not exist
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// IO error during read or write
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML content could not be parsed or emitted
    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON content could not be parsed or converted
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Project configuration file is malformed
    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Discovery glob is not a valid pattern
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

impl LoadError {
    /// Create IO error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create YAML error for path
    pub fn yaml(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            path: path.into(),
            source,
        }
    }

    /// Create JSON error for path
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// Check if the error is a missing file
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for model operations
pub type LoadResult<T> = Result<T, LoadError>;
