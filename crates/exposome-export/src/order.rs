//! Domain category ordering
//!
//! Rows sort by domain category first: the preferred order, then every other
//! observed domain alphabetically, then `(none)` strictly last. Ties break on
//! subdomain, indicator and paper.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use exposome_model::{NONE_SENTINEL, PREFERRED_DOMAIN_ORDER};

use crate::row::IndicatorRow;

/// Ordered domain categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainOrder {
    categories: Vec<String>,
}

impl DomainOrder {
    /// Build categories from a base order and the domains actually present
    ///
    /// `(none)` and repeats are dropped from the base so the sentinel always
    /// ranks last.
    #[must_use]
    pub fn new<'a>(
        base: impl IntoIterator<Item = &'a str>,
        present: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut categories: Vec<String> = Vec::new();
        for domain in base {
            if domain != NONE_SENTINEL && !categories.iter().any(|c| c == domain) {
                categories.push(domain.to_string());
            }
        }
        let extras: BTreeSet<&str> = present
            .into_iter()
            .filter(|d| *d != NONE_SENTINEL && !categories.iter().any(|c| c == d))
            .collect();
        categories.extend(extras.into_iter().map(ToString::to_string));
        categories.push(NONE_SENTINEL.to_string());
        Self { categories }
    }

    /// Categories over the default preferred order
    #[must_use]
    pub fn preferred<'a>(present: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(PREFERRED_DOMAIN_ORDER, present)
    }

    /// Categories for a row set
    #[must_use]
    pub fn for_rows(base: &[String], rows: &[IndicatorRow]) -> Self {
        Self::new(
            base.iter().map(String::as_str),
            rows.iter().map(|r| r.domain.as_str()),
        )
    }

    /// Ordered categories, `(none)` last
    #[inline]
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Position of a domain; unknown domains rank after every category
    #[must_use]
    pub fn rank(&self, domain: &str) -> usize {
        self.categories
            .iter()
            .position(|c| c == domain)
            .unwrap_or(self.categories.len())
    }

    /// Compare two rows
    #[must_use]
    pub fn compare(&self, a: &IndicatorRow, b: &IndicatorRow) -> Ordering {
        self.rank(&a.domain)
            .cmp(&self.rank(&b.domain))
            .then_with(|| a.subdomain.cmp(&b.subdomain))
            .then_with(|| a.indicator.cmp(&b.indicator))
            .then_with(|| a.paper.cmp(&b.paper))
    }

    /// Stable sort of rows
    pub fn sort(&self, rows: &mut [IndicatorRow]) {
        rows.sort_by(|a, b| self.compare(a, b));
    }
}

/// Parse a comma-separated order, `None` when nothing usable is given
#[must_use]
pub fn parse_domain_order(text: &str) -> Option<Vec<String>> {
    let order: Vec<String> = text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect();
    (!order.is_empty()).then_some(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn preferred_then_alphabetical_then_none() {
        let order = DomainOrder::preferred(["(none)", "zeta", "social", "biological"]);
        assert_eq!(
            order.categories(),
            &[
                "chemical",
                "physical",
                "climate",
                "social",
                "built",
                "biological",
                "zeta",
                "(none)"
            ]
        );
    }

    #[test]
    fn sentinel_in_base_still_last() {
        let order = DomainOrder::new(["(none)", "social", "social"], ["chemical"]);
        assert_eq!(order.categories(), &["social", "chemical", "(none)"]);
        assert!(order.rank("(none)") > order.rank("chemical"));
    }

    #[test]
    fn rows_sort_by_rank_then_fields() {
        let mut rows = vec![
            IndicatorRow::new("(none)", "(none)", "x", "A"),
            IndicatorRow::new("biological", "b.m", "x", "A"),
            IndicatorRow::new("physical", "physical.noise", "Lden", "B"),
            IndicatorRow::new("chemical", "chemical.metals", "Pb", "B"),
            IndicatorRow::new("chemical", "chemical.metals", "Pb", "A"),
        ];
        let order = DomainOrder::for_rows(&[], &rows);
        // empty base: alphabetical only
        assert_eq!(order.categories()[0], "biological");

        let order = DomainOrder::preferred(rows.iter().map(|r| r.domain.as_str()));
        order.sort(&mut rows);
        let papers: Vec<_> = rows.iter().map(|r| (r.domain.as_str(), r.paper.as_str())).collect();
        assert_eq!(
            papers,
            vec![
                ("chemical", "A"),
                ("chemical", "B"),
                ("physical", "B"),
                ("biological", "A"),
                ("(none)", "A"),
            ]
        );
    }

    #[test]
    fn parse_order_text() {
        assert_eq!(
            parse_domain_order(" social, ,chemical "),
            Some(vec!["social".to_string(), "chemical".to_string()])
        );
        assert_eq!(parse_domain_order(" , "), None);
    }
}
