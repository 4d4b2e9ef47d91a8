//! Exposome catalog data model
//!
//! Shared vocabulary for every catalog operation.
//!
//! # Core Concepts
//!
//! - [`PaperRecord`]: one paper's YAML metadata with normalized views
//! - [`Taxonomy`]: the registry of allowed domains and subdomains
//! - [`SubdomainKey`]: dotted `<domain>.<tail>` addressing
//! - [`ProjectLayout`]: where papers, taxonomy, schema and outputs live
//!
//! # Example
//!
//! ```rust,no_run
//! use exposome_model::{corpus, ProjectLayout, Taxonomy};
//!
//! # fn example() -> Result<(), exposome_model::LoadError> {
//! let layout = ProjectLayout::resolve(None)?;
//! let papers = corpus::load_papers(&corpus::discover_papers(layout.papers_glob())?)?;
//! let taxonomy = Taxonomy::load_required(layout.taxonomy_path())?;
//!
//! for paper in &papers {
//!     println!("{} → {:?}", paper.id(), paper.declared_domains());
//! }
//! # let _ = taxonomy;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod corpus;
pub mod error;
pub mod key;
pub mod layout;
pub mod paper;
pub mod taxonomy;

// Re-exports
pub use error::{LoadError, LoadResult};
pub use key::{KeyError, SubdomainKey, NONE_SENTINEL, UNMAPPED_SUFFIX};
pub use layout::{LayoutConfig, ProjectLayout, PREFERRED_DOMAIN_ORDER};
pub use paper::{indicator_name, scalar_text, value_kind, PaperRecord, SubdomainEntry};
pub use taxonomy::{DomainNode, Taxonomy, TaxonomyRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
