//! Keyword classifier
//!
//! Guesses a dotted subdomain key for a free-text indicator name using an
//! ordered table of regular expressions. The first matching rule wins. The
//! result is a heuristic for curators, never an authoritative mapping.

use exposome_model::SubdomainKey;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::error::{CurationError, CurationResult};

/// Built-in rule table, matched against lower-cased text in this order
pub const BUILTIN_RULES: &[(&str, &str)] = &[
    (r"\bpm2\.?5\b|\bno2\b|air\s*pollution|ambient", "chemical.airpollution.ambient"),
    (r"\blead\b|\bpb\b|mercury|hg|cadmium|cd|arsenic|as|molybdenum", "chemical.metals"),
    (r"pfas|pfoa|pfos|pfhxs|pfna|pfunda", "chemical.persistent"),
    (r"pcb|pbde|ddt|dde|hcb|organochlor", "chemical.persistent"),
    (r"phthalate|dehp|mbzp|mibp|mnbp", "chemical.phthalates"),
    (r"phenol|bisphenol|bpa|paraben|triclosan", "chemical.phenols"),
    (r"\bnoise\b|dnl|l\w?night", "physical.noise"),
    (r"temperature\b|heat|cold|humidity|meteorolog", "climate.meteorological"),
    (r"extreme|wildfire|drought|heatwave|cold\s*snap", "climate.extremes"),
    (r"ndvi|green\s*space|blue\s*space|park|greenness", "built.environment"),
    (
        r"walkability|connectivity|building\s*density|urban\s*design|land\s*use|traffic",
        "built.struct.urbandesign",
    ),
    (r"bus|transit|access\b", "built.access"),
    (r"microbiome|16s|shotgun", "biological.microbiome"),
    (
        r"omics|genomic|epigenomic|transcriptomic|proteomic|metabolomic",
        "biological.omics",
    ),
    (r"smok|alcohol|diet|physical\s*activity|folic", "social.lifestyle"),
    (r"demographic|cultur", "social.cultural.demographics"),
    (r"stress|inequity|injustice|allostatic", "social.economic.stressors"),
];

static BUILTIN: Lazy<Option<KeywordClassifier>> =
    Lazy::new(|| KeywordClassifier::new(BUILTIN_RULES).ok());

/// One compiled rule
#[derive(Debug, Clone)]
pub struct ClassifierRule {
    pattern: Regex,
    key: SubdomainKey,
}

impl ClassifierRule {
    /// Compile a rule
    ///
    /// # Errors
    /// Returns [`CurationError::InvalidRule`] for a bad pattern or blank key.
    pub fn new(pattern: &str, key: &str) -> CurationResult<Self> {
        let invalid = |reason: String| CurationError::InvalidRule {
            pattern: pattern.to_string(),
            key: key.to_string(),
            reason,
        };
        let compiled = Regex::new(pattern).map_err(|e| invalid(e.to_string()))?;
        let key = key.parse().map_err(|e: exposome_model::KeyError| invalid(e.to_string()))?;
        Ok(Self {
            pattern: compiled,
            key,
        })
    }

    /// Target key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &SubdomainKey {
        &self.key
    }
}

/// Ordered rule list
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: Vec<ClassifierRule>,
}

impl KeywordClassifier {
    /// Compile rules in order
    ///
    /// # Errors
    /// Returns the first rule that fails to compile.
    pub fn new(rules: &[(&str, &str)]) -> CurationResult<Self> {
        let rules = rules
            .iter()
            .map(|(pattern, key)| ClassifierRule::new(pattern, key))
            .collect::<CurationResult<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Classifier over [`BUILTIN_RULES`]
    ///
    /// # Errors
    /// Returns [`CurationError::InvalidRule`] if the built-in table fails to compile.
    pub fn builtin() -> CurationResult<Self> {
        match BUILTIN.as_ref() {
            Some(classifier) => Ok(classifier.clone()),
            None => Self::new(BUILTIN_RULES),
        }
    }

    /// Number of rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no rules
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Key of the first rule matching the lower-cased text
    #[must_use]
    pub fn classify(&self, text: &str) -> Option<&SubdomainKey> {
        let lowered = text.to_lowercase();
        let hit = self
            .rules
            .iter()
            .find(|rule| rule.pattern.is_match(&lowered))
            .map(ClassifierRule::key);
        trace!(text, key = ?hit.map(SubdomainKey::as_str), "classified");
        hit
    }

    /// Classified key, or `<group>.UNMAPPED`
    #[must_use]
    pub fn classify_or_unmapped(&self, text: &str, group: &str) -> SubdomainKey {
        self.classify(text)
            .cloned()
            .unwrap_or_else(|| SubdomainKey::unmapped(group))
    }
}
