//! Error types for export operations

use std::path::{Path, PathBuf};

use exposome_model::LoadError;

/// Export errors
///
/// Every variant is fatal for the run that raised it.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Source file loading failed
    #[error(transparent)]
    Load(#[from] LoadError),

    /// CSV read or write failed
    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Required CSV columns are absent
    #[error("CSV missing required columns: {missing:?}")]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    /// Image rendering failed
    #[error("rendering {} failed: {message}", path.display())]
    Render { path: PathBuf, message: String },
}

impl ExportError {
    /// Create CSV error for path
    pub fn csv(path: impl AsRef<Path>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create render error for path
    pub fn render(path: impl AsRef<Path>, message: impl ToString) -> Self {
        Self::Render {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;
