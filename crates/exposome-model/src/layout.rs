//! Project layout and configuration
//!
//! Every operation agrees on where the dataset lives relative to a project root:
//!
//! ```text
//! <root>/
//!   papers/*.yaml               paper records
//!   taxonomy/domains.yaml       taxonomy
//!   schema/paper.schema.json    JSON Schema (draft 2020-12)
//!   plot/                       derived outputs
//!   exposome.toml               optional overrides
//! ```
//!
//! The root is resolved from an explicit argument, then `EXPOSOME_ROOT`, then
//! the current directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{LoadError, LoadResult};

/// Default papers glob, relative to the root
pub const DEFAULT_PAPERS_GLOB: &str = "papers/*.yaml";
/// Default taxonomy path, relative to the root
pub const DEFAULT_TAXONOMY_PATH: &str = "taxonomy/domains.yaml";
/// Default schema path, relative to the root
pub const DEFAULT_SCHEMA_PATH: &str = "schema/paper.schema.json";
/// Default output directory, relative to the root
pub const DEFAULT_PLOT_DIR: &str = "plot";
/// Optional per-project configuration file
pub const CONFIG_FILE_NAME: &str = "exposome.toml";
/// Environment variable naming the project root
pub const ROOT_ENV_VAR: &str = "EXPOSOME_ROOT";

/// Preferred domain order for exports
pub const PREFERRED_DOMAIN_ORDER: [&str; 5] = ["chemical", "physical", "climate", "social", "built"];

/// Derived output file names inside the plot directory
pub const CSV_FILE_NAME: &str = "domain_subdomain_indicator.csv";
/// Mindmap Markdown output name
pub const MINDMAP_MD_FILE_NAME: &str = "exposome_mindmap.md";
/// Mindmap HTML output name
pub const MINDMAP_HTML_FILE_NAME: &str = "exposome_mindmap.html";
/// Tripartite plot output name
pub const PLOT_PNG_FILE_NAME: &str = "domain_subdomain_indicator.png";

/// Overrides read from `exposome.toml`
///
/// Relative paths are resolved against the project root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    /// Papers glob
    pub papers_glob: Option<String>,
    /// Taxonomy file
    pub taxonomy: Option<PathBuf>,
    /// Schema file
    pub schema: Option<PathBuf>,
    /// Output directory
    pub plot_dir: Option<PathBuf>,
    /// Preferred domain order
    pub domain_order: Option<Vec<String>>,
}

impl LayoutConfig {
    /// Parse configuration text
    ///
    /// # Errors
    /// Returns [`LoadError::Config`] for malformed TOML or unknown keys.
    pub fn parse(path: &Path, text: &str) -> LoadResult<Self> {
        toml::from_str(text).map_err(|source| LoadError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolved locations of the dataset and its outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
    papers_glob: String,
    taxonomy_path: PathBuf,
    schema_path: PathBuf,
    plot_dir: PathBuf,
    domain_order: Vec<String>,
}

impl ProjectLayout {
    /// Default layout under `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            papers_glob: root.join(DEFAULT_PAPERS_GLOB).to_string_lossy().into_owned(),
            taxonomy_path: root.join(DEFAULT_TAXONOMY_PATH),
            schema_path: root.join(DEFAULT_SCHEMA_PATH),
            plot_dir: root.join(DEFAULT_PLOT_DIR),
            domain_order: PREFERRED_DOMAIN_ORDER.iter().map(ToString::to_string).collect(),
            root,
        }
    }

    /// Resolve root and apply `exposome.toml` if present
    ///
    /// # Errors
    /// Returns IO or config errors for an unreadable configuration file.
    pub fn resolve(explicit_root: Option<PathBuf>) -> LoadResult<Self> {
        let root = explicit_root
            .or_else(|| std::env::var_os(ROOT_ENV_VAR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        let layout = Self::new(&root);

        let config_path = root.join(CONFIG_FILE_NAME);
        if !config_path.is_file() {
            debug!(root = %root.display(), "no project config, using defaults");
            return Ok(layout);
        }
        let text =
            std::fs::read_to_string(&config_path).map_err(|e| LoadError::io(&config_path, e))?;
        let config = LayoutConfig::parse(&config_path, &text)?;
        debug!(path = %config_path.display(), "applied project config");
        Ok(layout.with_config(config))
    }

    /// Apply configuration overrides
    #[must_use]
    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        if let Some(glob) = config.papers_glob {
            self = self.with_papers_glob(glob);
        }
        if let Some(path) = config.taxonomy {
            self.taxonomy_path = self.root.join(path);
        }
        if let Some(path) = config.schema {
            self.schema_path = self.root.join(path);
        }
        if let Some(path) = config.plot_dir {
            self.plot_dir = self.root.join(path);
        }
        if let Some(order) = config.domain_order {
            self.domain_order = order;
        }
        self
    }

    /// With papers glob (relative globs resolve against the root)
    #[must_use]
    pub fn with_papers_glob(mut self, glob: impl AsRef<str>) -> Self {
        let glob = glob.as_ref();
        self.papers_glob = if Path::new(glob).is_absolute() {
            glob.to_string()
        } else {
            self.root.join(glob).to_string_lossy().into_owned()
        };
        self
    }

    /// With taxonomy file
    #[inline]
    #[must_use]
    pub fn with_taxonomy_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.taxonomy_path = path.into();
        self
    }

    /// With schema file
    #[inline]
    #[must_use]
    pub fn with_schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema_path = path.into();
        self
    }

    /// With output directory
    #[inline]
    #[must_use]
    pub fn with_plot_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.plot_dir = path.into();
        self
    }

    /// With preferred domain order
    #[inline]
    #[must_use]
    pub fn with_domain_order(mut self, order: Vec<String>) -> Self {
        self.domain_order = order;
        self
    }

    /// Project root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Papers glob
    #[inline]
    #[must_use]
    pub fn papers_glob(&self) -> &str {
        &self.papers_glob
    }

    /// Taxonomy file
    #[inline]
    #[must_use]
    pub fn taxonomy_path(&self) -> &Path {
        &self.taxonomy_path
    }

    /// Schema file
    #[inline]
    #[must_use]
    pub fn schema_path(&self) -> &Path {
        &self.schema_path
    }

    /// Output directory
    #[inline]
    #[must_use]
    pub fn plot_dir(&self) -> &Path {
        &self.plot_dir
    }

    /// Preferred domain order
    #[inline]
    #[must_use]
    pub fn domain_order(&self) -> &[String] {
        &self.domain_order
    }

    /// Default CSV export path
    #[must_use]
    pub fn csv_path(&self) -> PathBuf {
        self.plot_dir.join(CSV_FILE_NAME)
    }

    /// Default plot image path
    #[must_use]
    pub fn plot_path(&self) -> PathBuf {
        self.plot_dir.join(PLOT_PNG_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_relative_to_root() {
        let layout = ProjectLayout::new("/data/catalog");
        assert_eq!(layout.taxonomy_path(), Path::new("/data/catalog/taxonomy/domains.yaml"));
        assert_eq!(layout.papers_glob(), "/data/catalog/papers/*.yaml");
        assert_eq!(
            layout.csv_path(),
            PathBuf::from("/data/catalog/plot/domain_subdomain_indicator.csv")
        );
        assert_eq!(layout.domain_order()[0], "chemical");
    }

    #[test]
    fn config_overrides_paths_and_order() {
        let config = LayoutConfig::parse(
            Path::new("exposome.toml"),
            r#"
papers_glob = "records/*.yaml"
plot_dir = "figures"
domain_order = ["social", "chemical"]
"#,
        )
        .unwrap();
        let layout = ProjectLayout::new("/repo").with_config(config);
        assert_eq!(layout.papers_glob(), "/repo/records/*.yaml");
        assert_eq!(layout.plot_dir(), Path::new("/repo/figures"));
        assert_eq!(layout.domain_order(), &["social".to_string(), "chemical".to_string()]);
        assert_eq!(layout.schema_path(), Path::new("/repo/schema/paper.schema.json"));
    }

    #[test]
    fn unknown_config_key_rejected() {
        let err = LayoutConfig::parse(Path::new("exposome.toml"), "colour = \"red\"\n").unwrap_err();
        assert!(matches!(err, LoadError::Config { .. }));
    }

    #[test]
    fn resolve_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "schema = \"s.json\"\n").unwrap();
        let layout = ProjectLayout::resolve(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(layout.schema_path(), dir.path().join("s.json"));
    }

    #[test]
    fn absolute_glob_kept_verbatim() {
        let layout = ProjectLayout::new("/repo").with_papers_glob("/elsewhere/*.yaml");
        assert_eq!(layout.papers_glob(), "/elsewhere/*.yaml");
    }
}
