//! Paper discovery and YAML file IO

use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, warn};

use crate::error::{LoadError, LoadResult};
use crate::paper::PaperRecord;

/// Expand a papers glob into sorted, de-duplicated paths
///
/// A `*.yaml` pattern is paired with its `*.yml` twin so both spellings are
/// picked up.
///
/// # Errors
/// Returns [`LoadError::Pattern`] for an invalid glob.
pub fn discover_papers(pattern: &str) -> LoadResult<Vec<PathBuf>> {
    let mut patterns = vec![pattern.to_string()];
    let yml = pattern.replace("*.yaml", "*.yml");
    if yml != pattern {
        patterns.push(yml);
    }

    let mut paths = Vec::new();
    for pattern in patterns {
        let entries = glob::glob(&pattern).map_err(|source| LoadError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(err) => warn!(error = %err, "skipping unreadable glob entry"),
            }
        }
    }

    paths.sort();
    paths.dedup();
    debug!(pattern, count = paths.len(), "discovered paper files");
    Ok(paths)
}

/// Load every paper, failing on the first unreadable file
///
/// # Errors
/// Returns the first IO or YAML error encountered.
pub fn load_papers(paths: &[PathBuf]) -> LoadResult<Vec<PaperRecord>> {
    paths.iter().map(|p| PaperRecord::load(p)).collect()
}

/// Read a YAML file into a raw value
///
/// # Errors
/// Returns [`LoadError::NotFound`], IO or YAML errors.
pub fn read_yaml(path: &Path) -> LoadResult<Value> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    serde_yaml::from_str(&text).map_err(|e| LoadError::yaml(path, e))
}

/// Write a YAML value, creating parent directories
///
/// # Errors
/// Returns IO or YAML errors tagged with the path.
pub fn write_yaml(path: &Path, value: &Value) -> LoadResult<()> {
    let text = serde_yaml::to_string(value).map_err(|e| LoadError::yaml(path, e))?;
    write_text(path, &text)
}

/// Write text, creating parent directories
///
/// # Errors
/// Returns [`LoadError::Io`] on failure.
pub fn write_text(path: &Path, text: &str) -> LoadResult<()> {
    ensure_parent(path)?;
    std::fs::write(path, text).map_err(|e| LoadError::io(path, e))
}

/// Create the parent directory of `path` if needed
///
/// # Errors
/// Returns [`LoadError::Io`] on failure.
pub fn ensure_parent(path: &Path) -> LoadResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| LoadError::io(parent, e))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn discovers_yaml_and_yml_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let papers = dir.path().join("papers");
        std::fs::create_dir_all(&papers).unwrap();
        for name in ["b.yaml", "a.yml", "c.txt"] {
            std::fs::write(papers.join(name), "{}").unwrap();
        }

        let pattern = format!("{}/*.yaml", papers.display());
        let found = discover_papers(&pattern).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.yml", "b.yaml"]);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = discover_papers("papers/[*.yaml").unwrap_err();
        assert!(matches!(err, LoadError::Pattern { .. }));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/deeper/out.yaml");
        write_yaml(&target, &Value::from("hello")).unwrap();
        assert_eq!(read_yaml(&target).unwrap(), Value::from("hello"));
    }

    #[test]
    fn read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_yaml(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.is_not_found());
    }
}
