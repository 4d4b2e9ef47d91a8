//! Taxonomy synchronization
//!
//! Scans paper records for the domains and dotted subdomain keys they use and
//! merges anything missing into `taxonomy/domains.yaml`. Merging is union plus
//! de-duplication; entries no longer referenced are never removed.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use exposome_model::{corpus, PaperRecord, SubdomainKey, Taxonomy};
use tracing::{debug, info, warn};

use crate::error::CurationResult;

/// Synchronizer switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Store `domain.tail` instead of the bare tail
    pub full_keys: bool,
    /// Compute and report without writing
    pub dry_run: bool,
}

/// Domains and dotted keys used across a paper set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageScan {
    /// Declared domains
    pub domains: BTreeSet<String>,
    /// Dotted subdomain keys
    pub dotted: BTreeSet<SubdomainKey>,
    /// Files that could not be read
    pub skipped: Vec<PathBuf>,
}

impl UsageScan {
    /// Add one paper's usage
    pub fn record(&mut self, paper: &PaperRecord) {
        if paper.as_mapping().is_none() {
            debug!(paper = paper.id(), "ignoring non-mapping document");
            return;
        }
        self.domains.extend(paper.declared_domains());
        self.dotted.extend(paper.dotted_subdomains());
    }
}

/// Scan files, skipping unreadable ones with a warning
#[must_use]
pub fn scan_usage(paths: &[PathBuf]) -> UsageScan {
    let mut scan = UsageScan::default();
    for path in paths {
        match PaperRecord::load(path) {
            Ok(paper) => scan.record(&paper),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable paper");
                scan.skipped.push(path.clone());
            }
        }
    }
    scan
}

/// Additions made by a merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Domains created, in creation order
    pub added_domains: Vec<String>,
    /// Subdomains added, as `domain.tail`
    pub added_subdomains: Vec<String>,
}

/// Merge usage into a taxonomy and normalize it
///
/// Domains are added first (sorted), then every dotted key (sorted). A
/// subdomain already stored as tail or full key is left alone.
pub fn merge_usage(taxonomy: &mut Taxonomy, usage: &UsageScan, full_keys: bool) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for domain in &usage.domains {
        if taxonomy.ensure_domain(domain).1 {
            outcome.added_domains.push(domain.clone());
        }
    }

    for key in &usage.dotted {
        let Some((domain, tail)) = key.split() else {
            continue;
        };
        let (node, created) = taxonomy.ensure_domain(domain);
        if created {
            outcome.added_domains.push(domain.to_string());
        }
        if node.has_tail(tail) {
            continue;
        }
        let token = if full_keys { key.as_str() } else { tail };
        node.push_subdomain(token);
        outcome.added_subdomains.push(key.to_string());
    }

    taxonomy.normalize();
    outcome
}

/// Result of one synchronizer run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Taxonomy file
    pub taxonomy_path: PathBuf,
    /// Scanned glob
    pub papers_glob: String,
    /// Options used
    pub options: SyncOptions,
    /// Additions
    pub outcome: MergeOutcome,
    /// Files skipped while scanning
    pub skipped: Vec<PathBuf>,
}

impl SyncReport {
    /// Check if nothing was added
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.outcome.added_domains.is_empty() && self.outcome.added_subdomains.is_empty()
    }

    /// Human-readable summary
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.options.dry_run {
            out.push_str("---- Dry run (not written) ----\n");
        }
        let _ = writeln!(out, "Taxonomy file:    {}", self.taxonomy_path.display());
        let _ = writeln!(out, "Scanned glob:     {}", self.papers_glob);
        let _ = writeln!(
            out,
            "Added domains:    {} -> {}",
            self.outcome.added_domains.len(),
            list_or_dash(&self.outcome.added_domains)
        );
        let _ = writeln!(
            out,
            "Added subdomains: {} -> {}",
            self.outcome.added_subdomains.len(),
            list_or_dash(&self.outcome.added_subdomains)
        );
        if !self.skipped.is_empty() {
            let _ = writeln!(out, "Skipped files:    {}", self.skipped.len());
        }
        let style = if self.options.full_keys {
            "full keys (e.g. chemical.metals)"
        } else {
            "tails (e.g. metals)"
        };
        let _ = write!(out, "Subdomains stored as {style}");
        out
    }
}

fn list_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "—".to_string()
    } else {
        format!("[{}]", items.join(", "))
    }
}

/// Scan papers and bring the taxonomy file up to date
///
/// A missing taxonomy starts empty and is created on write.
///
/// # Errors
/// Returns errors for an invalid glob, an unreadable taxonomy, or a failed write.
pub fn sync_taxonomy(
    taxonomy_path: &Path,
    papers_glob: &str,
    options: SyncOptions,
) -> CurationResult<SyncReport> {
    let mut taxonomy = Taxonomy::load(taxonomy_path)?.unwrap_or_default();
    let paths = corpus::discover_papers(papers_glob)?;
    let usage = scan_usage(&paths);
    let outcome = merge_usage(&mut taxonomy, &usage, options.full_keys);

    if options.dry_run {
        debug!(path = %taxonomy_path.display(), "dry run, taxonomy not written");
    } else {
        taxonomy.save(taxonomy_path)?;
        info!(
            path = %taxonomy_path.display(),
            domains = outcome.added_domains.len(),
            subdomains = outcome.added_subdomains.len(),
            "taxonomy written"
        );
    }

    Ok(SyncReport {
        taxonomy_path: taxonomy_path.to_path_buf(),
        papers_glob: papers_glob.to_string(),
        options,
        outcome,
        skipped: usage.skipped,
    })
}
