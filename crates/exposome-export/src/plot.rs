//! Tripartite plot
//!
//! Builds a three-layer graph (domains, subdomains, indicators) from the
//! taxonomy and the papers' top-level indicators, lays it out in fixed
//! columns and renders it to PNG with plotters.
//!
//! Layout: column x is 0, 1 or 2 per layer; within a column nodes are sorted
//! by label and stacked at `y = i - (n - 1) / 2`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use exposome_model::{corpus, PaperRecord, ProjectLayout, Taxonomy};
use once_cell::sync::Lazy;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontStyle};
use tracing::{debug, info, warn};

use crate::error::{ExportError, ExportResult};

/// Default output resolution
pub const DEFAULT_DPI: u32 = 200;
/// Highest accepted output resolution
pub const MAX_DPI: u32 = 600;
/// Largest bitmap, in pixels, the renderer will allocate
pub const MAX_PIXELS: u64 = 100_000_000;
/// Figure width in inches
pub const FIGURE_WIDTH_IN: f64 = 16.0;
/// Minimum figure height in inches
pub const MIN_FIGURE_HEIGHT_IN: f64 = 6.0;

/// Node areas in square points, per layer
const DOMAIN_NODE_AREA: f64 = 800.0;
const LEAF_NODE_AREA: f64 = 600.0;
const LABEL_POINTS: f64 = 8.0;
const EDGE_OPACITY: f64 = 0.3;
const NODE_OPACITY: f64 = 0.9;

/// Environment variable naming a TTF file for node labels
pub const FONT_ENV_VAR: &str = "EXPOSOME_PLOT_FONT";

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static LABEL_FONT: Lazy<bool> = Lazy::new(register_label_font);

/// Register the first readable label font as `sans-serif`
fn register_label_font() -> bool {
    let from_env = std::env::var(FONT_ENV_VAR).ok();
    let candidates = from_env
        .iter()
        .map(String::as_str)
        .chain(FONT_CANDIDATES.iter().copied());
    for candidate in candidates {
        let Ok(bytes) = std::fs::read(candidate) else {
            continue;
        };
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font("sans-serif", FontStyle::Normal, bytes) {
            Ok(()) => {
                debug!(font = candidate, "registered label font");
                return true;
            }
            Err(_) => warn!(font = candidate, "unusable label font"),
        }
    }
    false
}

/// Graph layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Domain,
    Subdomain,
    Indicator,
}

impl Layer {
    /// Column position
    #[must_use]
    pub fn x(self) -> f64 {
        match self {
            Self::Domain => 0.0,
            Self::Subdomain => 1.0,
            Self::Indicator => 2.0,
        }
    }

    fn color(self) -> RGBColor {
        match self {
            Self::Domain => RGBColor(31, 119, 180),
            Self::Subdomain => RGBColor(255, 127, 14),
            Self::Indicator => RGBColor(44, 160, 44),
        }
    }

    fn node_area(self) -> f64 {
        match self {
            Self::Domain => DOMAIN_NODE_AREA,
            Self::Subdomain | Self::Indicator => LEAF_NODE_AREA,
        }
    }
}

/// Domain → subdomain → indicator graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripartiteGraph {
    domains: BTreeSet<String>,
    /// `domain.tail` label → owning domain
    subdomains: BTreeMap<String, String>,
    /// indicator → domains it is linked from
    indicators: BTreeMap<String, BTreeSet<String>>,
}

impl TripartiteGraph {
    /// Build from an optional taxonomy and the papers
    ///
    /// Indicators are linked only to declared domains that exist as nodes.
    #[must_use]
    pub fn build(taxonomy: Option<&Taxonomy>, papers: &[PaperRecord]) -> Self {
        let mut graph = Self::default();
        if let Some(taxonomy) = taxonomy {
            graph
                .domains
                .extend(taxonomy.domains().iter().map(|d| d.name().to_string()));
            for (domain, tail) in taxonomy.subdomain_pairs() {
                graph.subdomains.insert(format!("{domain}.{tail}"), domain);
            }
        }

        for paper in papers {
            let declared = paper.listed_domains();
            for indicator in paper.top_level_indicators() {
                let linked = graph.indicators.entry(indicator).or_default();
                linked.extend(
                    declared
                        .iter()
                        .filter(|d| graph.domains.contains(*d))
                        .cloned(),
                );
            }
        }
        graph
    }

    /// Node counts per layer
    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.domains.len(), self.subdomains.len(), self.indicators.len())
    }

    /// Number of edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.subdomains.len() + self.indicators.values().map(BTreeSet::len).sum::<usize>()
    }

    /// Positioned nodes and edges
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn layout(&self) -> GraphLayout {
        let mut nodes = Vec::new();
        let mut index = BTreeMap::new();
        let columns: [(Layer, Vec<&String>); 3] = [
            (Layer::Domain, self.domains.iter().collect()),
            (Layer::Subdomain, self.subdomains.keys().collect()),
            (Layer::Indicator, self.indicators.keys().collect()),
        ];
        for (layer, labels) in columns {
            let offset = labels.len().saturating_sub(1) as f64 / 2.0;
            for (i, label) in labels.into_iter().enumerate() {
                let node = PositionedNode {
                    layer,
                    label: label.clone(),
                    x: layer.x(),
                    y: i as f64 - offset,
                };
                index.insert((layer, label.as_str()), nodes.len());
                nodes.push(node);
            }
        }

        let mut edges = Vec::new();
        for (label, domain) in &self.subdomains {
            if let (Some(&a), Some(&b)) = (
                index.get(&(Layer::Domain, domain.as_str())),
                index.get(&(Layer::Subdomain, label.as_str())),
            ) {
                edges.push((a, b));
            }
        }
        for (indicator, domains) in &self.indicators {
            for domain in domains {
                if let (Some(&a), Some(&b)) = (
                    index.get(&(Layer::Domain, domain.as_str())),
                    index.get(&(Layer::Indicator, indicator.as_str())),
                ) {
                    edges.push((a, b));
                }
            }
        }
        GraphLayout { nodes, edges }
    }

    /// Figure size in inches: fixed width, height grows with node counts
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn figure_size_inches(&self) -> (f64, f64) {
        let (d, s, i) = self.counts();
        let height = (d as f64 * 0.4 + s as f64 * 0.25 + i as f64 * 0.12).max(MIN_FIGURE_HEIGHT_IN);
        (FIGURE_WIDTH_IN, height)
    }
}

/// Node with its drawing position
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub layer: Layer,
    pub label: String,
    pub x: f64,
    pub y: f64,
}

/// Laid-out graph; edges index into `nodes`
#[derive(Debug, Clone, PartialEq)]
pub struct GraphLayout {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<(usize, usize)>,
}

impl GraphLayout {
    /// Half-height of the tallest column
    fn y_extent(&self) -> f64 {
        self.nodes.iter().map(|n| n.y.abs()).fold(0.0, f64::max)
    }
}

/// Render the graph to a PNG file
///
/// Labels use the font named by `EXPOSOME_PLOT_FONT` or a common system font.
/// Without one, labels are skipped with a warning and the rest of the figure
/// is still written.
///
/// # Errors
/// Returns [`ExportError::Render`] if `dpi` exceeds [`MAX_DPI`], the figure
/// would exceed [`MAX_PIXELS`], or the image cannot be drawn or saved.
/// Size checks run before anything is written.
pub fn render_png(graph: &TripartiteGraph, path: &Path, dpi: u32) -> ExportResult<()> {
    if dpi > MAX_DPI {
        return Err(ExportError::render(
            path,
            format!("dpi {dpi} exceeds the maximum of {MAX_DPI}"),
        ));
    }
    let dpi_f = f64::from(dpi.max(1));
    let (width_in, height_in) = graph.figure_size_inches();
    let size = bitmap_size(width_in * dpi_f, height_in * dpi_f).ok_or_else(|| {
        ExportError::render(
            path,
            format!("figure of {width_in:.1}x{height_in:.1} in at {dpi} dpi exceeds {MAX_PIXELS} pixels"),
        )
    })?;
    corpus::ensure_parent(path)?;
    let points = |pt: f64| pt * dpi_f / 72.0;

    let layout = graph.layout();
    let extent = layout.y_extent() + 1.0;

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| ExportError::render(path, e))?;
    let mut chart = ChartBuilder::on(&root)
        .margin(to_pixels(points(12.0)))
        .build_cartesian_2d(-0.25f64..2.25f64, -extent..extent)
        .map_err(|e| ExportError::render(path, e))?;

    chart
        .draw_series(layout.edges.iter().map(|&(a, b)| {
            let (from, to) = (&layout.nodes[a], &layout.nodes[b]);
            PathElement::new(
                vec![(from.x, from.y), (to.x, to.y)],
                BLACK.mix(EDGE_OPACITY).stroke_width(1),
            )
        }))
        .map_err(|e| ExportError::render(path, e))?;

    chart
        .draw_series(layout.nodes.iter().map(|node| {
            let radius = to_pixels(points(node.layer.node_area().sqrt() / 2.0));
            Circle::new(
                (node.x, node.y),
                radius,
                node.layer.color().mix(NODE_OPACITY).filled(),
            )
        }))
        .map_err(|e| ExportError::render(path, e))?;

    if *LABEL_FONT {
        let label_style = TextStyle::from(("sans-serif", points(LABEL_POINTS)).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        let labels = chart.draw_series(
            layout
                .nodes
                .iter()
                .map(|node| Text::new(node.label.clone(), (node.x, node.y), label_style.clone())),
        );
        if let Err(err) = labels {
            warn!(error = %err, "node labels could not be drawn");
        }
    } else if !layout.nodes.is_empty() {
        warn!("no label font found, set {FONT_ENV_VAR} to a TTF file; drawing unlabeled nodes");
    }

    root.present().map_err(|e| ExportError::render(path, e))?;
    let (domains, subdomains, indicators) = graph.counts();
    info!(
        path = %path.display(),
        domains,
        subdomains,
        indicators,
        "tripartite plot written"
    );
    Ok(())
}

/// Build the graph for a project and render it to `out`
///
/// A missing taxonomy yields a graph of indicators only.
///
/// # Errors
/// Returns load errors for unreadable files, or render errors.
pub fn plot_corpus(layout: &ProjectLayout, out: &Path, dpi: u32) -> ExportResult<TripartiteGraph> {
    let taxonomy = Taxonomy::load(layout.taxonomy_path())?;
    if taxonomy.is_none() {
        warn!(path = %layout.taxonomy_path().display(), "taxonomy missing, plotting indicators only");
    }
    let paths = corpus::discover_papers(layout.papers_glob())?;
    let papers = corpus::load_papers(&paths)?;
    let graph = TripartiteGraph::build(taxonomy.as_ref(), &papers);
    render_png(&graph, out, dpi)?;
    Ok(graph)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_pixels(value: f64) -> u32 {
    value.round().max(1.0) as u32
}

/// Pixel dimensions, or `None` when the bitmap would exceed [`MAX_PIXELS`]
#[allow(clippy::cast_precision_loss)]
fn bitmap_size(width_px: f64, height_px: f64) -> Option<(u32, u32)> {
    let limit = MAX_PIXELS as f64;
    if !(width_px.is_finite() && height_px.is_finite()) || width_px > limit || height_px > limit {
        return None;
    }
    let (width, height) = (to_pixels(width_px), to_pixels(height_px));
    let pixels = u64::from(width).checked_mul(u64::from(height))?;
    (pixels <= MAX_PIXELS).then_some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn taxonomy() -> Taxonomy {
        Taxonomy::parse(
            "t.yaml",
            "domains:\n  - name: physical\n    subdomains: [physical.noise]\n  - name: chemical\n    subdomains: [metals, airpollution.ambient]\n",
        )
        .unwrap()
    }

    fn papers() -> Vec<PaperRecord> {
        vec![
            PaperRecord::parse("A.yaml", "domains: [chemical, cosmic]\nindicators: [Pb, {name: NO2}]\n").unwrap(),
            PaperRecord::parse("B.yaml", "domain: physical\nindicators: [Lden, Pb]\n").unwrap(),
        ]
    }

    #[test]
    fn graph_nodes_and_edges() {
        let graph = TripartiteGraph::build(Some(&taxonomy()), &papers());
        assert_eq!(graph.counts(), (2, 3, 3));
        // 3 taxonomy edges + Pb(chemical, physical) + NO2(chemical) + Lden(physical)
        assert_eq!(graph.edge_count(), 7);
    }

    #[test]
    fn missing_taxonomy_keeps_unlinked_indicators() {
        let graph = TripartiteGraph::build(None, &papers());
        assert_eq!(graph.counts(), (0, 0, 3));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn layout_stacks_sorted_columns() {
        let layout = TripartiteGraph::build(Some(&taxonomy()), &papers()).layout();
        let column: Vec<(&str, f64)> = layout
            .nodes
            .iter()
            .filter(|n| n.layer == Layer::Subdomain)
            .map(|n| (n.label.as_str(), n.y))
            .collect();
        assert_eq!(
            column,
            vec![
                ("chemical.airpollution.ambient", -1.0),
                ("chemical.metals", 0.0),
                ("physical.noise", 1.0),
            ]
        );
        let domains: Vec<(f64, f64)> = layout
            .nodes
            .iter()
            .filter(|n| n.layer == Layer::Domain)
            .map(|n| (n.x, n.y))
            .collect();
        assert_eq!(domains, vec![(0.0, -0.5), (0.0, 0.5)]);
        assert_eq!(layout.edges.len(), 7);
    }

    #[test]
    fn figure_height_has_floor_and_grows() {
        assert_eq!(TripartiteGraph::default().figure_size_inches(), (16.0, 6.0));

        let mut graph = TripartiteGraph::default();
        for i in 0..100 {
            graph.indicators.insert(format!("i{i:03}"), BTreeSet::new());
        }
        let (_, height) = graph.figure_size_inches();
        assert!((height - 12.0).abs() < 1e-9);
    }

    #[test]
    fn bitmap_size_rounds_and_caps() {
        assert_eq!(bitmap_size(320.4, 119.6), Some((320, 120)));
        assert_eq!(bitmap_size(0.2, 0.2), Some((1, 1)));
        assert_eq!(bitmap_size(20_000.0, 20_000.0), None);
        assert_eq!(bitmap_size(f64::INFINITY, 1.0), None);
        assert_eq!(bitmap_size(1e12, 1.0), None);
    }

    #[test]
    fn oversized_requests_fail_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot/out.png");

        let err = render_png(&TripartiteGraph::default(), &path, u32::MAX).unwrap_err();
        assert!(matches!(err, ExportError::Render { .. }));
        assert!(err.to_string().contains("exceeds the maximum"));

        let names: Vec<String> = (0..200).map(|i| format!("ind{i}")).collect();
        let crowded =
            PaperRecord::parse("papers/p1.yaml", &format!("indicators: [{}]\n", names.join(", ")))
                .unwrap();
        let graph = TripartiteGraph::build(None, &[crowded]);
        assert_eq!(graph.counts(), (0, 0, 200));
        let err = render_png(&graph, &path, MAX_DPI).unwrap_err();
        assert!(err.to_string().contains("pixels"));
        assert!(!dir.path().join("plot").exists());
    }

    #[test]
    fn empty_graph_renders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot/out.png");
        render_png(&TripartiteGraph::default(), &path, 10).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }
}
