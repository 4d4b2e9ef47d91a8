//! Paper records
//!
//! A paper record is one hand-authored YAML file under `papers/`. The record
//! keeps the raw YAML document (so schema validation and write-back see exactly
//! what was authored) and exposes normalized views over the fields the tooling
//! cares about:
//!
//! - `domains` (list) or legacy `domain` (string)
//! - `subdomains` (mapping key → indicators, or list of keys) or legacy `subdomain`
//! - `indicators` (flat fallback list)
//!
//! All views are lenient: fields with unexpected shapes are treated as absent.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::error::{LoadError, LoadResult};
use crate::key::SubdomainKey;

/// One paper's metadata, identified by its filename stem
#[derive(Debug, Clone, PartialEq)]
pub struct PaperRecord {
    id: String,
    path: PathBuf,
    document: Value,
}

impl PaperRecord {
    /// Wrap an already-parsed document
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, document: Value) -> Self {
        let path = path.into();
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { id, path, document }
    }

    /// Parse record text
    ///
    /// An empty file parses to a null document.
    ///
    /// # Errors
    /// Returns [`LoadError::Yaml`] if the text is not a single YAML document.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> LoadResult<Self> {
        let path = path.into();
        let document: Value =
            serde_yaml::from_str(text).map_err(|e| LoadError::yaml(&path, e))?;
        Ok(Self::new(path, document))
    }

    /// Read and parse a record from disk
    ///
    /// # Errors
    /// Returns IO or YAML errors tagged with the record path.
    pub fn load(path: &Path) -> LoadResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        Self::parse(path, &text)
    }

    /// Paper identifier (filename stem)
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Source path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw YAML document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Mutable raw document, for write-back transformations
    #[inline]
    pub fn document_mut(&mut self) -> &mut Value {
        &mut self.document
    }

    /// Top-level mapping, if the document is one
    #[inline]
    #[must_use]
    pub fn as_mapping(&self) -> Option<&Mapping> {
        self.document.as_mapping()
    }

    /// Domains in exporter order: the `domains` list, else legacy `domain`
    #[must_use]
    pub fn listed_domains(&self) -> Vec<String> {
        match (self.document.get("domains"), self.document.get("domain")) {
            (Some(Value::Sequence(items)), _) => items.iter().filter_map(scalar_text).collect(),
            (_, Some(Value::String(single))) => non_blank(single).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Union of `domains` items and legacy `domain`
    #[must_use]
    pub fn declared_domains(&self) -> BTreeSet<String> {
        let mut declared = BTreeSet::new();
        if let Some(Value::Sequence(items)) = self.document.get("domains") {
            declared.extend(items.iter().filter_map(scalar_text));
        }
        if let Some(Value::String(single)) = self.document.get("domain") {
            declared.extend(non_blank(single));
        }
        declared
    }

    /// Domains as the validator sees them
    ///
    /// Same as [`declared_domains`](Self::declared_domains), except that a
    /// whitespace-only list item or a blank legacy `domain` counts as the
    /// empty domain `""`. An empty-string list item is still skipped.
    #[must_use]
    pub fn stated_domains(&self) -> BTreeSet<String> {
        let mut stated = self.declared_domains();
        if let Some(Value::Sequence(items)) = self.document.get("domains") {
            let padded = items
                .iter()
                .any(|item| matches!(item, Value::String(s) if !s.is_empty() && s.trim().is_empty()));
            if padded {
                stated.insert(String::new());
            }
        }
        if let Some(Value::String(single)) = self.document.get("domain") {
            if single.trim().is_empty() {
                stated.insert(String::new());
            }
        }
        stated
    }

    /// Subdomain entries in authored order
    ///
    /// Mapping form keeps each value; list and legacy forms carry no value.
    #[must_use]
    pub fn subdomain_entries(&self) -> Vec<SubdomainEntry> {
        match (self.document.get("subdomains"), self.document.get("subdomain")) {
            (Some(Value::Mapping(map)), _) => map
                .iter()
                .filter_map(|(k, v)| SubdomainEntry::keyed(k, Some(v.clone())))
                .collect(),
            (Some(Value::Sequence(items)), _) => items
                .iter()
                .filter_map(|k| SubdomainEntry::keyed(k, None))
                .collect(),
            (_, Some(legacy)) if legacy.is_string() => {
                SubdomainEntry::keyed(legacy, None).into_iter().collect()
            }
            _ => Vec::new(),
        }
    }

    /// Dotted subdomain keys used by this paper
    #[must_use]
    pub fn dotted_subdomains(&self) -> BTreeSet<SubdomainKey> {
        self.subdomain_entries()
            .into_iter()
            .map(|entry| entry.key)
            .filter(SubdomainKey::is_dotted)
            .collect()
    }

    /// Names from the flat top-level `indicators` list
    #[must_use]
    pub fn top_level_indicators(&self) -> Vec<String> {
        match self.document.get("indicators") {
            Some(Value::Sequence(items)) => items.iter().filter_map(indicator_name).collect(),
            _ => Vec::new(),
        }
    }

    /// Document converted to JSON for schema validation
    ///
    /// # Errors
    /// Returns [`LoadError::Json`] when the document has keys JSON cannot represent.
    pub fn to_json(&self) -> LoadResult<serde_json::Value> {
        serde_json::to_value(&self.document).map_err(|e| LoadError::json(&self.path, e))
    }
}

/// One subdomain key together with its authored value
#[derive(Debug, Clone, PartialEq)]
pub struct SubdomainEntry {
    /// Trimmed key
    pub key: SubdomainKey,
    /// Value under the key (mapping form only)
    pub value: Option<Value>,
}

impl SubdomainEntry {
    fn keyed(key: &Value, value: Option<Value>) -> Option<Self> {
        let key = scalar_text(key)?.parse().ok()?;
        Some(Self { key, value })
    }

    /// Indicator names listed under this key
    ///
    /// Non-list values contribute nothing.
    #[must_use]
    pub fn indicators(&self) -> Vec<String> {
        match &self.value {
            Some(Value::Sequence(items)) => items.iter().filter_map(indicator_name).collect(),
            _ => Vec::new(),
        }
    }
}

/// Indicator name from a list item: `name` of a mapping or the scalar itself
#[must_use]
pub fn indicator_name(item: &Value) -> Option<String> {
    match item {
        Value::Mapping(map) => map.get("name").and_then(scalar_text),
        other => scalar_text(other),
    }
}

/// Trimmed, non-empty text form of a scalar
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Short name of a value's YAML kind, used in diagnostics
#[must_use]
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "dict",
        Value::Tagged(_) => "tagged value",
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(text: &str) -> PaperRecord {
        PaperRecord::parse("papers/smith2021.yaml", text).unwrap()
    }

    #[test]
    fn id_is_file_stem() {
        assert_eq!(record("{}").id(), "smith2021");
    }

    #[test]
    fn listed_domains_prefers_list_over_legacy() {
        let paper = record("domains: [chemical, ' physical ', '']\ndomain: social\n");
        assert_eq!(paper.listed_domains(), vec!["chemical", "physical"]);

        let legacy = record("domain: ' social '\n");
        assert_eq!(legacy.listed_domains(), vec!["social"]);
    }

    #[test]
    fn declared_domains_unions_both_fields() {
        let paper = record("domains: [chemical]\ndomain: social\n");
        let declared: Vec<_> = paper.declared_domains().into_iter().collect();
        assert_eq!(declared, vec!["chemical", "social"]);
    }

    #[test]
    fn stated_domains_keep_blank_entries() {
        let paper = record("domains: [chemical, '   ', '']\n");
        let stated: Vec<_> = paper.stated_domains().into_iter().collect();
        assert_eq!(stated, vec!["", "chemical"]);
        assert_eq!(paper.declared_domains().len(), 1);

        let legacy = record("domain: ' '\n");
        assert_eq!(legacy.stated_domains().into_iter().collect::<Vec<_>>(), vec![""]);
        assert!(record("domains: ['']\n").stated_domains().is_empty());
    }

    #[test]
    fn mapping_subdomains_keep_values() {
        let paper = record(
            "subdomains:\n  chemical.metals: [Pb, {name: Hg}, '']\n  chemical: [PM2.5]\n",
        );
        let entries = paper.subdomain_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key.as_str(), "chemical.metals");
        assert_eq!(entries[0].indicators(), vec!["Pb", "Hg"]);
        assert!(!entries[1].key.is_dotted());
    }

    #[test]
    fn list_and_legacy_subdomains_have_no_values() {
        let listed = record("subdomains: [chemical.metals, physical]\n");
        assert!(listed.subdomain_entries().iter().all(|e| e.value.is_none()));
        assert_eq!(listed.dotted_subdomains().len(), 1);

        let legacy = record("subdomain: physical.noise\n");
        let keys: Vec<_> = legacy
            .dotted_subdomains()
            .into_iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(keys, vec!["physical.noise"]);
    }

    #[test]
    fn legacy_subdomain_ignored_when_list_present() {
        let paper = record("subdomains: []\nsubdomain: physical.noise\n");
        assert!(paper.subdomain_entries().is_empty());
    }

    #[test]
    fn top_level_indicators_normalize_items() {
        let paper = record("indicators: [Noise, {name: ' NDVI '}, {unit: db}, 42]\n");
        assert_eq!(paper.top_level_indicators(), vec!["Noise", "NDVI", "42"]);
    }

    #[test]
    fn value_kind_names() {
        let tagged: Value = serde_yaml::from_str("!date 2020-01-01").unwrap();
        assert_eq!(value_kind(&tagged), "tagged value");
        assert_eq!(value_kind(&Value::Null), "null");
    }

    #[test]
    fn empty_file_is_null_document() {
        let paper = record("");
        assert!(paper.as_mapping().is_none());
        assert!(paper.listed_domains().is_empty());
    }

    #[test]
    fn json_conversion() {
        let paper = record("domains: [chemical]\nyear: 2021\n");
        let json = paper.to_json().unwrap();
        assert_eq!(json["year"], serde_json::json!(2021));
    }
}
