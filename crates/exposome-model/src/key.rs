//! Subdomain keys
//!
//! Provides [`SubdomainKey`] for the `<domain>.<tail...>` addressing used by
//! paper records and the taxonomy. Undotted keys are *group* keys.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Placeholder used wherever a domain, subdomain or indicator is missing
pub const NONE_SENTINEL: &str = "(none)";

/// Suffix for the bucket collecting items no rule could classify
pub const UNMAPPED_SUFFIX: &str = "UNMAPPED";

/// Subdomain key as written in a paper record or taxonomy
///
/// # Examples
/// - `chemical.metals` → domain `chemical`, tail `metals`
/// - `chemical.airpollution.ambient` → domain `chemical`, tail `airpollution.ambient`
/// - `chemical` → group key, no domain/tail split
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubdomainKey(String);

impl SubdomainKey {
    /// Build a dotted key from a domain and a tail
    #[inline]
    #[must_use]
    pub fn full(domain: &str, tail: &str) -> Self {
        Self(format!("{domain}.{tail}"))
    }

    /// Bucket key for unclassified items under a group key
    #[inline]
    #[must_use]
    pub fn unmapped(group: &str) -> Self {
        Self::full(group, UNMAPPED_SUFFIX)
    }

    /// Key text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if key has a domain prefix
    #[inline]
    #[must_use]
    pub fn is_dotted(&self) -> bool {
        self.0.contains('.')
    }

    /// Split into `(domain, tail)` at the first dot
    #[inline]
    #[must_use]
    pub fn split(&self) -> Option<(&str, &str)> {
        self.0.split_once('.')
    }

    /// Domain prefix (dotted keys only)
    #[inline]
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.split().map(|(domain, _)| domain)
    }

    /// Everything after the domain prefix (dotted keys only)
    #[inline]
    #[must_use]
    pub fn tail(&self) -> Option<&str> {
        self.split().map(|(_, tail)| tail)
    }

    /// Check if key sits under `domain`
    #[must_use]
    pub fn belongs_to(&self, domain: &str) -> bool {
        self.0
            .strip_prefix(domain)
            .is_some_and(|rest| rest.starts_with('.'))
    }
}

impl Display for SubdomainKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SubdomainKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(KeyError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for SubdomainKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors when parsing subdomain keys
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Key was blank after trimming
    #[error("empty subdomain key")]
    Empty,
}
