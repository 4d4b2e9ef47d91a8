//! Flattened `(domain, subdomain, indicator, paper)` rows

use std::fmt::{self, Display, Formatter};

use exposome_model::NONE_SENTINEL;
use serde::{Deserialize, Serialize};

/// CSV column names, in output order
pub const COLUMNS: [&str; 4] = ["domain", "subdomain", "indicator", "paper"];

/// One exported combination
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub domain: String,
    pub subdomain: String,
    pub indicator: String,
    pub paper: String,
}

impl IndicatorRow {
    /// Create row
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        subdomain: impl Into<String>,
        indicator: impl Into<String>,
        paper: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            subdomain: subdomain.into(),
            indicator: indicator.into(),
            paper: paper.into(),
        }
    }

    /// Build from raw cells: trimmed, empty cells become `(none)`
    #[must_use]
    pub fn cleaned(domain: &str, subdomain: &str, indicator: &str, paper: &str) -> Self {
        Self::new(clean(domain), clean(subdomain), clean(indicator), clean(paper))
    }
}

fn clean(cell: &str) -> String {
    match cell.trim() {
        "" => NONE_SENTINEL.to_string(),
        trimmed => trimmed.to_string(),
    }
}

impl Display for IndicatorRow {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.domain, self.subdomain, self.indicator, self.paper
        )
    }
}
