//! Subdomain migration
//!
//! Adds a `subdomains_normalized` preview next to a paper's authored
//! `subdomains` mapping:
//! - dotted keys are copied as they are
//! - items under a group key are classified, or bucketed under `<group>.UNMAPPED`
//!
//! The authored `subdomains` field is never touched. [`strip_normalized`]
//! removes the preview again.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use exposome_model::{corpus, scalar_text, PaperRecord, SubdomainKey};
use serde_yaml::{Mapping, Value};
use tracing::{debug, info};

use crate::classify::KeywordClassifier;
use crate::error::CurationResult;

/// Field holding the migrated preview
pub const NORMALIZED_FIELD: &str = "subdomains_normalized";

/// Build the normalized mapping for one `subdomains` mapping
///
/// A scalar value counts as a one-item list and null as an empty list. Items
/// are de-duplicated by text and sorted case-insensitively; keys are sorted.
#[must_use]
pub fn normalize_subdomains(subdomains: &Mapping, classifier: &KeywordClassifier) -> Mapping {
    let mut buckets: BTreeMap<String, Vec<Value>> = BTreeMap::new();

    for (key, value) in subdomains {
        let Some(key) = scalar_text(key) else {
            continue;
        };
        let items = as_items(value);
        if key.contains('.') {
            buckets.entry(key).or_default().extend(items);
            continue;
        }
        for item in items {
            let target = classifier.classify_or_unmapped(&item_text(&item), &key);
            buckets.entry(target.to_string()).or_default().push(item);
        }
    }

    buckets
        .into_iter()
        .map(|(key, items)| {
            let mut seen = BTreeSet::new();
            let mut unique: Vec<Value> = items
                .into_iter()
                .filter(|item| seen.insert(item_text(item)))
                .collect();
            unique.sort_by_cached_key(|item| item_text(item).to_lowercase());
            (Value::from(key), Value::Sequence(unique))
        })
        .collect()
}

fn as_items(value: &Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Sequence(items) => items.clone(),
        other => vec![other.clone()],
    }
}

/// Text form of an item, used for classification and de-duplication
fn item_text(item: &Value) -> String {
    scalar_text(item).unwrap_or_else(|| {
        serde_yaml::to_string(item)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    })
}

/// Add the normalized preview to a paper in memory
///
/// Returns `false` when the paper has no `subdomains` mapping.
pub fn migrate_paper(paper: &mut PaperRecord, classifier: &KeywordClassifier) -> bool {
    let Some(Value::Mapping(subdomains)) = paper.document().get("subdomains") else {
        return false;
    };
    let normalized = normalize_subdomains(subdomains, classifier);
    match paper.document_mut() {
        Value::Mapping(doc) => {
            doc.insert(NORMALIZED_FIELD.into(), Value::Mapping(normalized));
            true
        }
        _ => false,
    }
}

/// Migrate every paper file, writing previews back
///
/// Returns the files that were rewritten.
///
/// # Errors
/// Returns the first load or write error.
pub fn migrate_corpus(paths: &[PathBuf], classifier: &KeywordClassifier) -> CurationResult<Vec<PathBuf>> {
    let mut migrated = Vec::new();
    for path in paths {
        let mut paper = PaperRecord::load(path)?;
        if !migrate_paper(&mut paper, classifier) {
            debug!(paper = paper.id(), "no subdomains mapping, skipped");
            continue;
        }
        corpus::write_yaml(path, paper.document())?;
        info!(path = %path.display(), "added normalized subdomains");
        migrated.push(path.clone());
    }
    Ok(migrated)
}

/// Remove the normalized preview from one file
///
/// Returns whether the file was rewritten.
///
/// # Errors
/// Returns load or write errors.
pub fn strip_paper(path: &Path) -> CurationResult<bool> {
    let mut doc = corpus::read_yaml(path)?;
    let removed = match &mut doc {
        Value::Mapping(map) => map.shift_remove(NORMALIZED_FIELD).is_some(),
        _ => false,
    };
    if removed {
        corpus::write_yaml(path, &doc)?;
        debug!(path = %path.display(), "stripped normalized subdomains");
    }
    Ok(removed)
}

/// Remove the normalized preview from every file that has it
///
/// # Errors
/// Returns the first load or write error.
pub fn strip_normalized(paths: &[PathBuf]) -> CurationResult<Vec<PathBuf>> {
    let mut stripped = Vec::new();
    for path in paths {
        if strip_paper(path)? {
            stripped.push(path.clone());
        }
    }
    Ok(stripped)
}

/// Keys of a normalized mapping
#[must_use]
pub fn normalized_keys(normalized: &Mapping) -> Vec<SubdomainKey> {
    normalized
        .keys()
        .filter_map(scalar_text)
        .filter_map(|k| k.parse().ok())
        .collect()
}
