//! Exposome catalog curation
//!
//! Operations that check or rewrite the source data:
//! - [`sync`]: bring the taxonomy up to date with the papers
//! - [`validate`]: JSON Schema plus taxonomy checks, collected per paper
//! - [`schema`]: schema loading, compilation and inspection
//! - [`classify`] / [`migrate`]: keyword-based subdomain migration preview

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod classify;
pub mod error;
pub mod migrate;
pub mod schema;
pub mod sync;
pub mod validate;

// Re-exports
pub use classify::{ClassifierRule, KeywordClassifier, BUILTIN_RULES};
pub use error::{CurationError, CurationResult};
pub use migrate::{
    migrate_corpus, migrate_paper, normalize_subdomains, strip_normalized, NORMALIZED_FIELD,
};
pub use schema::{PaperSchema, SchemaSummary};
pub use sync::{merge_usage, scan_usage, sync_taxonomy, MergeOutcome, SyncOptions, SyncReport, UsageScan};
pub use validate::{
    taxonomy_findings, validate_corpus, PaperValidator, ValidationFinding, ValidationReport,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
