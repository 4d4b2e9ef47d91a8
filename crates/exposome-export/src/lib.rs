//! Exposome catalog exports
//!
//! Derived, disposable artifacts built from the paper records:
//! - [`flatten`] / [`table`]: `domain,subdomain,indicator,paper` CSV
//! - [`order`]: domain category ordering shared by CSV and mindmap
//! - [`mindmap`]: markmap Markdown and HTML from the CSV
//! - [`plot`]: tripartite domain/subdomain/indicator PNG

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod flatten;
pub mod mindmap;
pub mod order;
pub mod plot;
pub mod row;
pub mod table;

// Re-exports
pub use error::{ExportError, ExportResult};
pub use flatten::{collect_rows, export_rows, flatten_paper};
pub use mindmap::{
    build_markdown, resolve_outputs, wrap_html, write_mindmap, MindmapOutputs, DEFAULT_TITLE,
};
pub use order::{parse_domain_order, DomainOrder};
pub use plot::{
    plot_corpus, render_png, GraphLayout, Layer, PositionedNode, TripartiteGraph, DEFAULT_DPI,
    FONT_ENV_VAR, MAX_DPI, MAX_PIXELS,
};
pub use row::{IndicatorRow, COLUMNS};
pub use table::{preview, read_rows, write_rows, PREVIEW_ROWS};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
