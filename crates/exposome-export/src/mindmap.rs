//! Mindmap rendering
//!
//! Groups sorted rows into a four-level bullet tree
//! (domain → subdomain → indicator → paper) for markmap, and wraps the
//! Markdown in a self-contained HTML page with a domain filter.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use exposome_model::corpus;
use exposome_model::layout::{MINDMAP_HTML_FILE_NAME, MINDMAP_MD_FILE_NAME};
use indexmap::IndexMap;
use tracing::info;

use crate::error::ExportResult;
use crate::order::DomainOrder;
use crate::row::IndicatorRow;

/// Default mindmap title
pub const DEFAULT_TITLE: &str = "Exposome Mindmap";

const TITLE_MARKER: &str = "@@TITLE@@";
const MARKDOWN_MARKER: &str = "@@MARKDOWN@@";

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8" />
  <title>@@TITLE@@</title>
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <style>
    html, body { height: 100%; margin: 0; background:#111; color:#eee; font-family: system-ui, -apple-system, Segoe UI, Roboto, "Noto Sans", "Helvetica Neue", Arial; }
    header { padding: 8px 12px; display:flex; gap:12px; align-items:center; border-bottom:1px solid #333; }
    #wrap { height: calc(100% - 48px); }
    #mindmap { width: 100%; height: 100%; }
    select, button { background:#1b1b1b; color:#eee; border:1px solid #333; padding:6px 8px; border-radius:6px; }
    .toolbar { margin-left:auto; display:flex; gap:8px; }
  </style>
  <script src="https://cdn.jsdelivr.net/npm/markmap-autoloader@0.17.2"></script>
  <script src="https://cdn.jsdelivr.net/npm/markmap-toolbar@0.17.2/dist/index.umd.min.js"></script>
</head>
<body>
  <header>
    <strong>@@TITLE@@</strong>
    <label>Domain:</label>
    <select id="domain">
      <option value="__all__">All</option>
    </select>
    <div class="toolbar" id="mm-toolbar"></div>
  </header>
  <div id="wrap">
    <svg id="mindmap"></svg>
  </div>

  <script id="mm-md" type="text/markdown">
@@MARKDOWN@@
  </script>

  <script>
  function parseMarkdown(md) {
    const { Transformer, Markmap } = window.markmap;
    const { root } = new Transformer().transform(md);
    return { root, Markmap };
  }

  function listDomains(root) {
    return (root.children || [])
      .filter(c => c.type !== 'heading' && c.content)
      .map(c => c.content)
      .sort();
  }

  function filterTreeByDomain(root, domain) {
    const out = JSON.parse(JSON.stringify(root));
    if (domain !== "__all__") {
      out.children = (out.children || []).filter(c => c.content === domain);
    }
    return out;
  }

  (() => {
    const md = document.getElementById('mm-md').textContent;
    const { root, Markmap } = parseMarkdown(md);

    const sel = document.getElementById('domain');
    for (const d of listDomains(root)) {
      const opt = document.createElement('option');
      opt.value = d;
      opt.textContent = d;
      sel.appendChild(opt);
    }

    const mm = Markmap.create(document.getElementById('mindmap'), { fit: true }, root);

    if (window.markmap && window.markmap.Toolbar) {
      const toolbar = new window.markmap.Toolbar();
      toolbar.attach(mm);
      document.getElementById('mm-toolbar').append(toolbar.render());
    }

    sel.addEventListener('change', () => {
      mm.setData(filterTreeByDomain(root, sel.value));
      mm.fit();
    });
  })();
  </script>
</body>
</html>
"#;

type IndicatorPapers = BTreeMap<String, BTreeSet<String>>;

/// Markdown bullet tree for rows
///
/// Domains follow `order`; only domains present in `rows` appear. Subdomains,
/// indicators and papers are sorted, and each paper is listed once.
#[must_use]
pub fn build_markdown(rows: &[IndicatorRow], order: &DomainOrder, title: &str) -> String {
    let mut sorted = rows.to_vec();
    order.sort(&mut sorted);

    let mut tree: IndexMap<&str, BTreeMap<String, IndicatorPapers>> = IndexMap::new();
    for row in &sorted {
        tree.entry(row.domain.as_str())
            .or_default()
            .entry(row.subdomain.clone())
            .or_default()
            .entry(row.indicator.clone())
            .or_default()
            .insert(row.paper.clone());
    }

    let mut lines = vec![format!("# {title}"), String::new()];
    for (domain, subdomains) in &tree {
        lines.push(format!("- {domain}"));
        for (subdomain, indicators) in subdomains {
            lines.push(format!("  - {subdomain}"));
            for (indicator, papers) in indicators {
                lines.push(format!("    - {indicator}"));
                lines.extend(papers.iter().map(|paper| format!("      - `{paper}`")));
            }
        }
    }
    lines.join("\n")
}

/// Self-contained markmap page embedding `markdown`
#[must_use]
pub fn wrap_html(markdown: &str, title: &str) -> String {
    let safe_markdown = markdown.replace("</script>", "<\\/script>");
    let safe_title = escape_html(title);

    // Single pass over the template so substituted text is never rescanned
    let mut html = String::with_capacity(HTML_TEMPLATE.len() + safe_markdown.len());
    let mut rest = HTML_TEMPLATE;
    while let Some(start) = rest.find("@@") {
        let (before, tail) = rest.split_at(start);
        html.push_str(before);
        if let Some(after) = tail.strip_prefix(TITLE_MARKER) {
            html.push_str(&safe_title);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(MARKDOWN_MARKER) {
            html.push_str(&safe_markdown);
            rest = after;
        } else {
            html.push_str("@@");
            rest = &tail[2..];
        }
    }
    html.push_str(rest);
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Output locations for one mindmap run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MindmapOutputs {
    pub markdown: PathBuf,
    pub html: PathBuf,
}

/// Render and write both mindmap files
///
/// # Errors
/// Returns IO errors tagged with the failing path.
pub fn write_mindmap(
    rows: &[IndicatorRow],
    order: &DomainOrder,
    title: &str,
    outputs: &MindmapOutputs,
) -> ExportResult<()> {
    let markdown = build_markdown(rows, order, title);
    corpus::write_text(&outputs.markdown, &markdown)?;
    corpus::write_text(&outputs.html, &wrap_html(&markdown, title))?;
    info!(
        markdown = %outputs.markdown.display(),
        html = %outputs.html.display(),
        "mindmap written"
    );
    Ok(())
}

/// Resolve output paths
///
/// Bare file names are placed in `out_dir`; paths with a directory are used
/// as given. Missing names fall back to the defaults.
#[must_use]
pub fn resolve_outputs(
    out_dir: &Path,
    markdown: Option<PathBuf>,
    html: Option<PathBuf>,
) -> MindmapOutputs {
    let place = |name: Option<PathBuf>, default: &str| match name {
        Some(path) if path.parent().is_some_and(|p| !p.as_os_str().is_empty()) => path,
        Some(path) => out_dir.join(path),
        None => out_dir.join(default),
    };
    MindmapOutputs {
        markdown: place(markdown, MINDMAP_MD_FILE_NAME),
        html: place(html, MINDMAP_HTML_FILE_NAME),
    }
}
