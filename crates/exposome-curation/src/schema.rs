//! Paper JSON Schema
//!
//! Loads `schema/paper.schema.json`, compiles it as draft 2020-12 and reports
//! structural violations. Also provides a summary of how permissive the
//! `subdomains` property is, which helps when loosening the schema for group
//! keys.

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

use exposome_model::LoadError;
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use tracing::debug;

use crate::error::{CurationError, CurationResult};

/// Compiled paper schema
pub struct PaperSchema {
    path: PathBuf,
    raw: Value,
    compiled: JSONSchema,
}

impl fmt::Debug for PaperSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaperSchema")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl PaperSchema {
    /// Read raw schema JSON
    ///
    /// # Errors
    /// Returns [`LoadError::NotFound`], IO or JSON errors.
    pub fn read_raw(path: &Path) -> CurationResult<Value> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()).into());
        }
        let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        let raw = serde_json::from_str(&text).map_err(|e| LoadError::json(path, e))?;
        Ok(raw)
    }

    /// Load and compile schema from disk
    ///
    /// # Errors
    /// Returns load errors or [`CurationError::SchemaCompile`].
    pub fn load(path: &Path) -> CurationResult<Self> {
        let raw = Self::read_raw(path)?;
        Self::compile(path, raw)
    }

    /// Compile an in-memory schema
    ///
    /// # Errors
    /// Returns [`CurationError::SchemaCompile`] if the schema is invalid.
    pub fn compile(path: impl Into<PathBuf>, raw: Value) -> CurationResult<Self> {
        let path = path.into();
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft202012)
            .compile(&raw)
            .map_err(|e| CurationError::schema_compile(&path, e.to_string()))?;
        debug!(path = %path.display(), "compiled paper schema");
        Ok(Self {
            path,
            raw,
            compiled,
        })
    }

    /// Schema source path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw schema JSON
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Violation messages for one instance, empty when valid
    #[must_use]
    pub fn violations(&self, instance: &Value) -> Vec<String> {
        match self.compiled.validate(instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.map(|e| e.to_string()).collect(),
        }
    }
}

/// Permissiveness facts about a paper schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSummary {
    /// `patternProperties` keys of `properties.subdomains`
    pub subdomain_patterns: Vec<String>,
    /// `additionalProperties` of `properties.subdomains`, if set
    pub subdomain_additional: Option<Value>,
    /// A pattern key is itself a plain alphanumeric group key and extra keys
    /// are allowed
    pub subdomains_relaxed: bool,
    /// `study_type` of the first `data.oneOf` branch has no enum; `None` if absent
    pub study_type_free_text: Option<bool>,
}

impl SchemaSummary {
    /// Summarize a raw schema
    #[must_use]
    pub fn of(raw: &Value) -> Self {
        let subdomains = raw.pointer("/properties/subdomains");

        let subdomain_patterns: Vec<String> = subdomains
            .and_then(|s| s.get("patternProperties"))
            .and_then(Value::as_object)
            .map(|patterns| patterns.keys().cloned().collect())
            .unwrap_or_default();

        let subdomain_additional = subdomains
            .and_then(|s| s.get("additionalProperties"))
            .cloned();

        let has_group_key = subdomain_patterns
            .iter()
            .any(|pattern| is_plain_group_key(pattern));
        let subdomains_relaxed =
            has_group_key && subdomain_additional == Some(Value::Bool(true));

        let study_type_free_text = raw
            .pointer("/properties/data/oneOf/0/properties/study_type")
            .map(|study_type| study_type.get("enum").is_none());

        Self {
            subdomain_patterns,
            subdomain_additional,
            subdomains_relaxed,
            study_type_free_text,
        }
    }

    /// Human-readable report
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let additional = self
            .subdomain_additional
            .as_ref()
            .map_or_else(|| "absent".to_string(), ToString::to_string);
        let _ = writeln!(out, "patternProperties keys: {:?}", self.subdomain_patterns);
        let _ = writeln!(out, "additionalProperties on subdomains: {additional}");
        let _ = writeln!(out, "subdomains relaxed: {}", yes_no(self.subdomains_relaxed));
        let study = match self.study_type_free_text {
            Some(free) => yes_no(free),
            None => "absent",
        };
        let _ = write!(out, "study_type is free text: {study}");
        out
    }
}

/// Key text is `^[a-zA-Z0-9]+$` in full
fn is_plain_group_key(pattern: &str) -> bool {
    !pattern.is_empty() && pattern.chars().all(|c| c.is_ascii_alphanumeric())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
