//! Taxonomy registry
//!
//! `taxonomy/domains.yaml` is the authoritative list of domains and their
//! subdomains:
//!
//! ```yaml
//! version: 1
//! domains:
//!   - name: chemical
//!     subdomains: [metals, airpollution.ambient]
//!   - name: physical
//!     subdomains: [physical.noise]   # full keys are accepted too
//! ```
//!
//! Loading is lenient: a non-mapping file becomes an empty taxonomy. Entries
//! that cannot be read (a domain without a name, a subdomain that is not a
//! scalar) are carried verbatim and written back at their original index, so
//! a load/save round trip never loses content. Unknown fields survive too.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{LoadError, LoadResult};
use crate::paper::scalar_text;

/// Version written into freshly created taxonomies
pub const DEFAULT_TAXONOMY_VERSION: u64 = 1;

/// One domain and its registered subdomains
#[derive(Debug, Clone, PartialEq)]
pub struct DomainNode {
    name: String,
    subdomains: Vec<String>,
    unparsed: Vec<(usize, Value)>,
    extra: Mapping,
}

impl DomainNode {
    /// Create node with no subdomains
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subdomains: Vec::new(),
            unparsed: Vec::new(),
            extra: Mapping::new(),
        }
    }

    /// Domain name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subdomain tokens as stored (tails or full keys)
    #[inline]
    #[must_use]
    pub fn subdomains(&self) -> &[String] {
        &self.subdomains
    }

    /// Subdomains with any `name.` prefix removed
    pub fn tails(&self) -> impl Iterator<Item = &str> + '_ {
        self.subdomains.iter().map(|s| self.strip_prefix(s))
    }

    /// Check if `tail` is stored verbatim or as `name.tail`
    #[must_use]
    pub fn has_tail(&self, tail: &str) -> bool {
        self.subdomains
            .iter()
            .any(|s| s == tail || self.strip_prefix(s) == tail)
    }

    /// Append a subdomain token
    pub fn push_subdomain(&mut self, token: impl Into<String>) {
        self.subdomains.push(token.into());
    }

    fn strip_prefix<'a>(&self, token: &'a str) -> &'a str {
        token
            .strip_prefix(self.name.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(token)
    }

    /// Drop duplicate tokens (first wins) and sort case-insensitively
    fn normalize(&mut self) {
        let mut seen = BTreeSet::new();
        self.subdomains.retain(|s| seen.insert(s.clone()));
        self.subdomains.sort_by_key(|s| s.to_lowercase());
    }

    fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_mapping()?;
        let name = map.get("name").and_then(scalar_text)?;
        let mut subdomains = Vec::new();
        let mut unparsed = Vec::new();
        if let Some(Value::Sequence(items)) = map.get("subdomains") {
            for (idx, item) in items.iter().enumerate() {
                match scalar_text(item) {
                    Some(token) => subdomains.push(token),
                    None => unparsed.push((idx, item.clone())),
                }
            }
        }
        let extra = map
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), Some("name" | "subdomains")))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Some(Self {
            name,
            subdomains,
            unparsed,
            extra,
        })
    }

    fn to_value(&self) -> Value {
        let mut map = Mapping::new();
        map.insert("name".into(), self.name.clone().into());
        let tokens = self.subdomains.iter().cloned().map(Value::from).collect();
        map.insert(
            "subdomains".into(),
            Value::Sequence(splice_unparsed(tokens, &self.unparsed)),
        );
        for (k, v) in &self.extra {
            map.insert(k.clone(), v.clone());
        }
        Value::Mapping(map)
    }
}

/// Re-insert verbatim items at their recorded indices, clamped to the end
fn splice_unparsed(mut items: Vec<Value>, unparsed: &[(usize, Value)]) -> Vec<Value> {
    for (idx, value) in unparsed {
        items.insert((*idx).min(items.len()), value.clone());
    }
    items
}

/// Parsed taxonomy document
#[derive(Debug, Clone, PartialEq)]
pub struct Taxonomy {
    version: Value,
    domains: Vec<DomainNode>,
    unparsed: Vec<(usize, Value)>,
    extra: Mapping,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::new()
    }
}

impl Taxonomy {
    /// Empty taxonomy at the default version
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: Value::from(DEFAULT_TAXONOMY_VERSION),
            domains: Vec::new(),
            unparsed: Vec::new(),
            extra: Mapping::new(),
        }
    }

    /// Build from a raw YAML value, tolerating missing or malformed sections
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_mapping() else {
            return Self::new();
        };

        let version = map
            .get("version")
            .cloned()
            .unwrap_or_else(|| Value::from(DEFAULT_TAXONOMY_VERSION));

        let mut domains = Vec::new();
        let mut unparsed = Vec::new();
        if let Some(Value::Sequence(items)) = map.get("domains") {
            for (idx, item) in items.iter().enumerate() {
                match DomainNode::from_value(item) {
                    Some(node) => domains.push(node),
                    None => {
                        debug!(entry = ?item, "keeping taxonomy entry without a name as-is");
                        unparsed.push((idx, item.clone()));
                    }
                }
            }
        }

        let extra = map
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), Some("version" | "domains")))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            version,
            domains,
            unparsed,
            extra,
        }
    }

    /// Raw YAML value for writing
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Mapping::new();
        map.insert("version".into(), self.version.clone());
        let nodes = self.domains.iter().map(DomainNode::to_value).collect();
        map.insert(
            "domains".into(),
            Value::Sequence(splice_unparsed(nodes, &self.unparsed)),
        );
        for (k, v) in &self.extra {
            map.insert(k.clone(), v.clone());
        }
        Value::Mapping(map)
    }

    /// Parse taxonomy text
    ///
    /// # Errors
    /// Returns [`LoadError::Yaml`] for malformed YAML.
    pub fn parse(path: impl Into<PathBuf>, text: &str) -> LoadResult<Self> {
        let value: Value =
            serde_yaml::from_str(text).map_err(|e| LoadError::yaml(path.into(), e))?;
        Ok(Self::from_value(&value))
    }

    /// Load taxonomy, returning `None` when the file does not exist
    ///
    /// # Errors
    /// Returns IO or YAML errors for an existing but unreadable file.
    pub fn load(path: &Path) -> LoadResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
        Self::parse(path, &text).map(Some)
    }

    /// Load taxonomy that must exist
    ///
    /// # Errors
    /// Returns [`LoadError::NotFound`] when the file is missing.
    pub fn load_required(path: &Path) -> LoadResult<Self> {
        Self::load(path)?.ok_or_else(|| LoadError::NotFound(path.to_path_buf()))
    }

    /// Write taxonomy, creating parent directories
    ///
    /// # Errors
    /// Returns IO or YAML errors tagged with the path.
    pub fn save(&self, path: &Path) -> LoadResult<()> {
        crate::corpus::write_yaml(path, &self.to_value())
    }

    /// Named domain nodes in document order
    #[inline]
    #[must_use]
    pub fn domains(&self) -> &[DomainNode] {
        &self.domains
    }

    /// Find a domain node
    #[must_use]
    pub fn domain(&self, name: &str) -> Option<&DomainNode> {
        self.domains.iter().find(|d| d.name == name)
    }

    /// Find or append a domain node
    ///
    /// Returns the node and whether it was created.
    pub fn ensure_domain(&mut self, name: &str) -> (&mut DomainNode, bool) {
        match self.domains.iter().position(|d| d.name == name) {
            Some(idx) => (&mut self.domains[idx], false),
            None => {
                self.domains.push(DomainNode::new(name));
                let last = self.domains.len() - 1;
                (&mut self.domains[last], true)
            }
        }
    }

    /// De-duplicate domains by name (first wins), normalize each node's
    /// subdomains, and sort domains by name
    pub fn normalize(&mut self) {
        let mut seen = BTreeSet::new();
        self.domains.retain(|d| seen.insert(d.name.clone()));
        for node in &mut self.domains {
            node.normalize();
        }
        self.domains.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// `(domain, tail)` pairs for every registered subdomain
    #[must_use]
    pub fn subdomain_pairs(&self) -> Vec<(String, String)> {
        self.domains
            .iter()
            .flat_map(|d| d.tails().map(move |t| (d.name.clone(), t.to_string())))
            .collect()
    }

    /// Lookup sets for validation
    #[must_use]
    pub fn registry(&self) -> TaxonomyRegistry {
        let mut registry = TaxonomyRegistry::default();
        for node in &self.domains {
            registry.domains.insert(node.name.clone());
            let tails = registry.tails.entry(node.name.clone()).or_default();
            for tail in node.tails() {
                tails.insert(tail.to_string());
                registry.full_keys.insert(format!("{}.{tail}", node.name));
            }
        }
        registry
    }
}

/// Allowed domains and full subdomain keys derived from a [`Taxonomy`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyRegistry {
    domains: BTreeSet<String>,
    full_keys: BTreeSet<String>,
    tails: BTreeMap<String, BTreeSet<String>>,
}

impl TaxonomyRegistry {
    /// Check if domain is registered
    #[inline]
    #[must_use]
    pub fn allows_domain(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    /// Check if full `domain.tail` key is registered
    #[inline]
    #[must_use]
    pub fn allows_subdomain(&self, full_key: &str) -> bool {
        self.full_keys.contains(full_key)
    }

    /// Registered domain names, sorted
    #[inline]
    #[must_use]
    pub fn domains(&self) -> &BTreeSet<String> {
        &self.domains
    }

    /// Registered tails of one domain
    #[must_use]
    pub fn tails_of(&self, domain: &str) -> Option<&BTreeSet<String>> {
        self.tails.get(domain)
    }
}
