//! Paper validation
//!
//! Every paper is checked against:
//! - the JSON Schema (structure)
//! - the taxonomy (declared domains are registered)
//! - its own `domains` (each dotted subdomain's prefix is declared)
//! - the taxonomy again (each dotted subdomain key is registered)
//! - a light type check of the value stored under each dotted key
//!
//! Group (undotted) subdomain keys are never checked. Findings from all files
//! are collected before reporting; one bad file does not stop the others.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

use exposome_model::{
    corpus, value_kind, PaperRecord, ProjectLayout, SubdomainKey, Taxonomy, TaxonomyRegistry,
};
use serde_yaml::Value;
use tracing::{debug, info};

use crate::error::{CurationError, CurationResult};
use crate::schema::PaperSchema;

/// One problem found in one paper
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFinding {
    /// File could not be read or parsed
    Unreadable { path: PathBuf, reason: String },
    /// JSON Schema violation
    Schema { path: PathBuf, message: String },
    /// Neither `domains` nor legacy `domain` declared
    MissingDomains { path: PathBuf },
    /// Declared domain is not registered
    UnknownDomain {
        path: PathBuf,
        domain: String,
        allowed: Vec<String>,
    },
    /// Dotted key's domain prefix is not declared by the paper
    DomainPrefixMismatch {
        path: PathBuf,
        key: SubdomainKey,
        domain: String,
    },
    /// Dotted key is not registered
    UnknownSubdomain { path: PathBuf, key: SubdomainKey },
    /// Value under a dotted key has an unsupported kind
    IndicatorValueType {
        path: PathBuf,
        key: SubdomainKey,
        kind: &'static str,
    },
}

impl ValidationFinding {
    /// File the finding refers to
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Unreadable { path, .. }
            | Self::Schema { path, .. }
            | Self::MissingDomains { path }
            | Self::UnknownDomain { path, .. }
            | Self::DomainPrefixMismatch { path, .. }
            | Self::UnknownSubdomain { path, .. }
            | Self::IndicatorValueType { path, .. } => path,
        }
    }
}

impl Display for ValidationFinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let path = self.path().display();
        match self {
            Self::Unreadable { reason, .. } => write!(f, "{path}: cannot read YAML ({reason})"),
            Self::Schema { message, .. } => write!(f, "{path}: {message}"),
            Self::MissingDomains { .. } => {
                write!(f, "{path}: missing 'domains' (or legacy 'domain').")
            }
            Self::UnknownDomain {
                domain, allowed, ..
            } => {
                let allowed: Vec<String> = allowed.iter().map(|d| format!("'{d}'")).collect();
                write!(
                    f,
                    "{path}: domain '{domain}' not in taxonomy (allowed: [{}]).",
                    allowed.join(", ")
                )
            }
            Self::DomainPrefixMismatch { key, domain, .. } => write!(
                f,
                "{path}: subdomain '{key}' has domain '{domain}' not listed in 'domains'."
            ),
            Self::UnknownSubdomain { key, .. } => {
                write!(f, "{path}: subdomain '{key}' not in taxonomy.")
            }
            Self::IndicatorValueType { key, kind, .. } => write!(
                f,
                "{path}: subdomain '{key}' value should be list/str/dict/number; got {kind}."
            ),
        }
    }
}

/// Outcome of validating a paper set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Number of files examined
    pub files_checked: usize,
    /// All findings, in file order
    pub findings: Vec<ValidationFinding>,
}

impl ValidationReport {
    /// Check if no findings were recorded
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.findings.is_empty()
    }

    /// Human-readable report
    #[must_use]
    pub fn render(&self) -> String {
        if self.passed() {
            return format!("All {} papers passed validation.", self.files_checked);
        }
        let mut lines = vec!["VALIDATION FAILED:".to_string()];
        lines.extend(self.findings.iter().map(|f| format!(" - {f}")));
        lines.join("\n")
    }
}

/// Taxonomy-only checks for one paper
///
/// Kept separate from schema validation so the rules can be exercised without
/// a compiled schema.
#[must_use]
pub fn taxonomy_findings(paper: &PaperRecord, registry: &TaxonomyRegistry) -> Vec<ValidationFinding> {
    let path = paper.path().to_path_buf();
    let mut findings = Vec::new();

    let declared = paper.stated_domains();
    if declared.is_empty() {
        findings.push(ValidationFinding::MissingDomains { path: path.clone() });
    } else {
        for domain in declared.iter().filter(|d| !registry.allows_domain(d)) {
            findings.push(ValidationFinding::UnknownDomain {
                path: path.clone(),
                domain: domain.clone(),
                allowed: registry.domains().iter().cloned().collect(),
            });
        }
    }

    let dotted: BTreeMap<SubdomainKey, Option<Value>> = paper
        .subdomain_entries()
        .into_iter()
        .filter(|entry| entry.key.is_dotted())
        .map(|entry| (entry.key, entry.value))
        .collect();

    for (key, value) in dotted {
        if let Some(domain) = key.domain() {
            if !declared.contains(domain) {
                findings.push(ValidationFinding::DomainPrefixMismatch {
                    path: path.clone(),
                    domain: domain.to_string(),
                    key: key.clone(),
                });
            }
        }
        if !registry.allows_subdomain(key.as_str()) {
            findings.push(ValidationFinding::UnknownSubdomain {
                path: path.clone(),
                key: key.clone(),
            });
        }
        if let Some(value @ Value::Tagged(_)) = &value {
            findings.push(ValidationFinding::IndicatorValueType {
                path: path.clone(),
                key,
                kind: value_kind(value),
            });
        }
    }

    findings
}

/// Schema plus taxonomy validator
#[derive(Debug)]
pub struct PaperValidator {
    schema: PaperSchema,
    registry: TaxonomyRegistry,
}

impl PaperValidator {
    /// Create validator from compiled parts
    #[inline]
    #[must_use]
    pub fn new(schema: PaperSchema, registry: TaxonomyRegistry) -> Self {
        Self { schema, registry }
    }

    /// Load schema and taxonomy named by the layout
    ///
    /// The schema is checked first, then the taxonomy; either missing is fatal.
    ///
    /// # Errors
    /// Returns load or schema compile errors.
    pub fn from_layout(layout: &ProjectLayout) -> CurationResult<Self> {
        let raw_schema = PaperSchema::read_raw(layout.schema_path())?;
        let taxonomy = Taxonomy::load_required(layout.taxonomy_path())?;
        let schema = PaperSchema::compile(layout.schema_path(), raw_schema)?;
        Ok(Self::new(schema, taxonomy.registry()))
    }

    /// Taxonomy registry in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &TaxonomyRegistry {
        &self.registry
    }

    /// All findings for one parsed paper
    #[must_use]
    pub fn check(&self, paper: &PaperRecord) -> Vec<ValidationFinding> {
        let mut findings = match paper.to_json() {
            Ok(instance) => self
                .schema
                .violations(&instance)
                .into_iter()
                .map(|message| ValidationFinding::Schema {
                    path: paper.path().to_path_buf(),
                    message,
                })
                .collect(),
            Err(err) => vec![ValidationFinding::Schema {
                path: paper.path().to_path_buf(),
                message: format!("document is not representable as JSON ({err})"),
            }],
        };
        findings.extend(taxonomy_findings(paper, &self.registry));
        findings
    }

    /// Validate files, collecting findings across all of them
    #[must_use]
    pub fn validate_paths(&self, paths: &[PathBuf]) -> ValidationReport {
        let mut report = ValidationReport::default();
        for path in paths {
            report.files_checked += 1;
            match PaperRecord::load(path) {
                Ok(paper) => {
                    let findings = self.check(&paper);
                    debug!(paper = paper.id(), findings = findings.len(), "validated paper");
                    report.findings.extend(findings);
                }
                Err(err) => report.findings.push(ValidationFinding::Unreadable {
                    path: path.clone(),
                    reason: err.to_string(),
                }),
            }
        }
        report
    }
}

/// Validate every paper of a project
///
/// # Errors
/// Returns fatal errors: missing schema or taxonomy, uncompilable schema, or no
/// paper files.
pub fn validate_corpus(layout: &ProjectLayout) -> CurationResult<ValidationReport> {
    info!(
        schema = %layout.schema_path().display(),
        taxonomy = %layout.taxonomy_path().display(),
        "validating papers"
    );
    let validator = PaperValidator::from_layout(layout)?;
    let paths = corpus::discover_papers(layout.papers_glob())?;
    if paths.is_empty() {
        return Err(CurationError::NoPapers {
            pattern: layout.papers_glob().to_string(),
        });
    }
    Ok(validator.validate_paths(&paths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry() -> TaxonomyRegistry {
        Taxonomy::parse(
            "taxonomy/domains.yaml",
            "domains:\n  - name: chemical\n    subdomains: [metals]\n  - name: physical\n    subdomains: [physical.noise]\n",
        )
        .unwrap()
        .registry()
    }

    fn paper(text: &str) -> PaperRecord {
        PaperRecord::parse("papers/p1.yaml", text).unwrap()
    }

    #[test]
    fn clean_paper_has_no_findings() {
        let p = paper("domains: [chemical, physical]\nsubdomains:\n  chemical.metals: [Pb]\n  physical.noise: Lden\n  chemical: [anything]\n");
        assert!(taxonomy_findings(&p, &registry()).is_empty());
    }

    #[test]
    fn missing_domains_reported() {
        let findings = taxonomy_findings(&paper("title: no domains\n"), &registry());
        assert_eq!(
            findings,
            vec![ValidationFinding::MissingDomains {
                path: PathBuf::from("papers/p1.yaml")
            }]
        );
        assert_eq!(
            findings[0].to_string(),
            "papers/p1.yaml: missing 'domains' (or legacy 'domain')."
        );
    }

    #[test]
    fn unknown_domain_lists_allowed() {
        let findings = taxonomy_findings(&paper("domain: cosmic\n"), &registry());
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].to_string(),
            "papers/p1.yaml: domain 'cosmic' not in taxonomy (allowed: ['chemical', 'physical'])."
        );
    }

    #[test]
    fn blank_domain_is_unknown_not_missing() {
        let findings = taxonomy_findings(&paper("domains: ['  ']\n"), &registry());
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].to_string(),
            "papers/p1.yaml: domain '' not in taxonomy (allowed: ['chemical', 'physical'])."
        );
    }

    #[test]
    fn prefix_mismatch_and_unknown_key() {
        let findings = taxonomy_findings(
            &paper("domains: [chemical]\nsubdomains:\n  physical.noise: []\n  chemical.phenols: []\n"),
            &registry(),
        );
        let messages: Vec<String> = findings.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "papers/p1.yaml: subdomain 'chemical.phenols' not in taxonomy.",
                "papers/p1.yaml: subdomain 'physical.noise' has domain 'physical' not listed in 'domains'.",
            ]
        );
    }

    #[test]
    fn tagged_value_fails_type_check() {
        let findings = taxonomy_findings(
            &paper("domains: [chemical]\nsubdomains:\n  chemical.metals: !measured 2020-01-01\n"),
            &registry(),
        );
        assert_eq!(findings.len(), 1);
        assert!(matches!(
            findings[0],
            ValidationFinding::IndicatorValueType { kind: "tagged value", .. }
        ));
    }

    #[test]
    fn group_keys_are_ignored() {
        let findings = taxonomy_findings(
            &paper("domains: [chemical]\nsubdomains: [chemical, cosmic]\n"),
            &registry(),
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn report_render() {
        let passed = ValidationReport {
            files_checked: 3,
            findings: vec![],
        };
        assert_eq!(passed.render(), "All 3 papers passed validation.");

        let failed = ValidationReport {
            files_checked: 1,
            findings: vec![ValidationFinding::MissingDomains {
                path: PathBuf::from("p.yaml"),
            }],
        };
        assert!(!failed.passed());
        assert_eq!(
            failed.render(),
            "VALIDATION FAILED:\n - p.yaml: missing 'domains' (or legacy 'domain')."
        );
    }
}
