//! Error types for curation operations
//!
//! Only conditions that stop a whole run travel through these types:
//! - Missing or unreadable taxonomy / schema / paper files
//! - A schema that does not compile
//! - An empty paper set
//!
//! Per-paper problems found by the validator are reported as
//! [`ValidationFinding`](crate::validate::ValidationFinding) values instead.

use std::path::PathBuf;

use exposome_model::LoadError;

/// Fatal curation errors
#[derive(Debug, thiserror::Error)]
pub enum CurationError {
    /// File loading failed
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Schema file is not a valid draft 2020-12 schema
    #[error("schema {} does not compile: {message}", path.display())]
    SchemaCompile { path: PathBuf, message: String },

    /// Papers glob matched nothing
    #[error("no paper files match {pattern}")]
    NoPapers { pattern: String },

    /// Classifier rule is malformed
    #[error("invalid classifier rule '{pattern}' → '{key}': {reason}")]
    InvalidRule {
        pattern: String,
        key: String,
        reason: String,
    },
}

impl CurationError {
    /// Create schema compile error for path
    pub fn schema_compile(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SchemaCompile {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for curation operations
pub type CurationResult<T> = Result<T, CurationError>;
