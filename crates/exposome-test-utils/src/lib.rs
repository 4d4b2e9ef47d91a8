//! Testing utilities for the exposome catalog workspace
//!
//! Shared on-disk fixtures: a temporary project root with the standard
//! `papers/`, `taxonomy/` and `schema/` layout.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use exposome_model::layout::{DEFAULT_SCHEMA_PATH, DEFAULT_TAXONOMY_PATH};
use exposome_model::ProjectLayout;
use tempfile::TempDir;

/// Permissive schema: an object with an optional string title and a relaxed
/// `subdomains` object
pub fn minimal_schema() -> serde_json::Value {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "properties": {
            "title": {"type": "string"},
            "domains": {"type": "array", "items": {"type": "string"}},
            "subdomains": {
                "type": ["object", "array"],
                "patternProperties": {"^[a-zA-Z0-9]+(\\.[a-zA-Z0-9]+)*$": {}},
                "additionalProperties": true
            }
        }
    })
}

/// Standard taxonomy used across tests
pub const SAMPLE_TAXONOMY: &str = "\
version: 1
domains:
  - name: chemical
    subdomains: [metals, airpollution.ambient]
  - name: physical
    subdomains: [physical.noise]
";

/// Temporary project directory
pub struct CorpusFixture {
    dir: TempDir,
}

impl CorpusFixture {
    /// Empty project root
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("papers")).unwrap();
        Self { dir }
    }

    /// Project root with [`SAMPLE_TAXONOMY`] and [`minimal_schema`]
    pub fn standard() -> Self {
        let fixture = Self::new();
        fixture.write_taxonomy(SAMPLE_TAXONOMY);
        fixture.write_schema(&minimal_schema());
        fixture
    }

    /// Project root
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Default layout rooted at the fixture
    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(self.root())
    }

    /// Write `papers/<id>.yaml`
    pub fn write_paper(&self, id: &str, yaml: &str) -> PathBuf {
        let path = self.root().join("papers").join(format!("{id}.yaml"));
        fs::write(&path, yaml).unwrap();
        path
    }

    /// Write the taxonomy file
    pub fn write_taxonomy(&self, yaml: &str) -> PathBuf {
        self.write_file(DEFAULT_TAXONOMY_PATH, yaml)
    }

    /// Write the schema file
    pub fn write_schema(&self, schema: &serde_json::Value) -> PathBuf {
        self.write_file(DEFAULT_SCHEMA_PATH, &serde_json::to_string_pretty(schema).unwrap())
    }

    /// Write any file relative to the root
    pub fn write_file(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    /// Read any file relative to the root
    pub fn read_file(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative)).unwrap()
    }
}

impl Default for CorpusFixture {
    fn default() -> Self {
        Self::new()
    }
}
