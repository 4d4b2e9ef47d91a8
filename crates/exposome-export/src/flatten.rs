//! Paper flattening
//!
//! Turns each paper into `(domain, subdomain, indicator, paper)` rows. For
//! every declared domain, the subdomains aligned with it are those equal to
//! `(none)` or starting with `<domain>.`; a domain with no aligned subdomain
//! falls back to `(none)`. Indicators come from the subdomain's own list, then
//! the paper's top-level `indicators`, then `(none)`.

use exposome_model::{corpus, PaperRecord, ProjectLayout, NONE_SENTINEL};
use indexmap::{IndexMap, IndexSet};
use serde_yaml::Value;
use tracing::debug;

use crate::error::ExportResult;
use crate::order::DomainOrder;
use crate::row::IndicatorRow;

/// Rows for one paper, in generation order
///
/// Documents that are neither a mapping nor empty produce no rows.
#[must_use]
pub fn flatten_paper(paper: &PaperRecord, only_dotted: bool) -> Vec<IndicatorRow> {
    if !matches!(paper.document(), Value::Mapping(_) | Value::Null) {
        debug!(paper = paper.id(), "skipping non-mapping document");
        return Vec::new();
    }

    let mut domains = paper.listed_domains();
    if domains.is_empty() {
        domains.push(NONE_SENTINEL.to_string());
    }

    let mut subdomains: IndexMap<String, Vec<String>> = IndexMap::new();
    for entry in paper.subdomain_entries() {
        subdomains.insert(entry.key.to_string(), entry.indicators());
    }
    if only_dotted {
        subdomains.retain(|key, _| key.contains('.'));
    }
    if subdomains.is_empty() {
        subdomains.insert(NONE_SENTINEL.to_string(), Vec::new());
    }

    let top_level = paper.top_level_indicators();
    let mut aligned_keys: IndexSet<&str> = IndexSet::new();
    let mut rows = Vec::new();

    for domain in &domains {
        let prefix = format!("{domain}.");
        let mut matched: Vec<&str> = subdomains
            .keys()
            .map(String::as_str)
            .filter(|key| *key == NONE_SENTINEL || key.starts_with(&prefix))
            .collect();
        if matched.is_empty() {
            matched.push(NONE_SENTINEL);
        }

        for subdomain in matched {
            aligned_keys.insert(subdomain);
            let own = subdomains.get(subdomain).filter(|list| !list.is_empty());
            let indicators: Vec<&str> = match own {
                Some(list) => list.iter().map(String::as_str).collect(),
                None if !top_level.is_empty() => top_level.iter().map(String::as_str).collect(),
                None => vec![NONE_SENTINEL],
            };
            for indicator in indicators {
                rows.push(IndicatorRow::new(
                    domain.as_str(),
                    subdomain,
                    indicator,
                    paper.id(),
                ));
            }
        }
    }

    for key in subdomains.keys().filter(|k| !aligned_keys.contains(k.as_str())) {
        debug!(
            paper = paper.id(),
            subdomain = %key,
            "subdomain matches no declared domain, not exported"
        );
    }

    rows
}

/// Flatten papers, drop duplicate rows (first wins) and sort
#[must_use]
pub fn export_rows(papers: &[PaperRecord], only_dotted: bool, base_order: &[String]) -> Vec<IndicatorRow> {
    let unique: IndexSet<IndicatorRow> = papers
        .iter()
        .flat_map(|paper| flatten_paper(paper, only_dotted))
        .collect();
    let mut rows: Vec<IndicatorRow> = unique.into_iter().collect();
    DomainOrder::for_rows(base_order, &rows).sort(&mut rows);
    rows
}

/// Load every paper of a project and flatten it
///
/// Unreadable YAML is fatal here, unlike in validation.
///
/// # Errors
/// Returns glob, IO or YAML errors.
pub fn collect_rows(layout: &ProjectLayout, only_dotted: bool) -> ExportResult<Vec<IndicatorRow>> {
    let paths = corpus::discover_papers(layout.papers_glob())?;
    let papers = corpus::load_papers(&paths)?;
    let rows = export_rows(&papers, only_dotted, layout.domain_order());
    debug!(papers = papers.len(), rows = rows.len(), "flattened papers");
    Ok(rows)
}
