//! CSV table IO
//!
//! Writes rows as `domain,subdomain,indicator,paper` with a header, and reads
//! them back for the mindmap with cleaning applied (trim, empty → `(none)`,
//! duplicate rows dropped).

use std::fmt::Write as _;
use std::path::Path;

use exposome_model::{corpus, LoadError};
use indexmap::IndexSet;
use tracing::debug;

use crate::error::{ExportError, ExportResult};
use crate::row::{IndicatorRow, COLUMNS};

/// Rows shown by [`preview`] in export summaries
pub const PREVIEW_ROWS: usize = 20;

/// Write rows with a header, creating parent directories
///
/// # Errors
/// Returns IO or CSV errors tagged with the path.
pub fn write_rows(path: &Path, rows: &[IndicatorRow]) -> ExportResult<()> {
    corpus::ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path).map_err(|e| ExportError::csv(path, e))?;
    if rows.is_empty() {
        writer
            .write_record(COLUMNS)
            .map_err(|e| ExportError::csv(path, e))?;
    }
    for row in rows {
        writer.serialize(row).map_err(|e| ExportError::csv(path, e))?;
    }
    writer
        .flush()
        .map_err(|e| LoadError::io(path, e))?;
    debug!(path = %path.display(), rows = rows.len(), "wrote CSV");
    Ok(())
}

/// Read and clean rows
///
/// Columns are located by header name; extra columns are ignored.
///
/// # Errors
/// Returns [`LoadError::NotFound`], [`ExportError::MissingColumns`] or CSV errors.
pub fn read_rows(path: &Path) -> ExportResult<Vec<IndicatorRow>> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()).into());
    }
    let mut reader = csv::Reader::from_path(path).map_err(|e| ExportError::csv(path, e))?;
    let headers = reader.headers().map_err(|e| ExportError::csv(path, e))?.clone();

    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let indices: Vec<Option<usize>> = COLUMNS.iter().map(|&c| position(c)).collect();
    let missing: Vec<String> = COLUMNS
        .iter()
        .zip(&indices)
        .filter(|(_, idx)| idx.is_none())
        .map(|(c, _)| (*c).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ExportError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    }
    let indices: Vec<usize> = indices.into_iter().flatten().collect();

    let mut rows = IndexSet::new();
    for record in reader.records() {
        let record = record.map_err(|e| ExportError::csv(path, e))?;
        let cell = |i: usize| record.get(indices[i]).unwrap_or("");
        rows.insert(IndicatorRow::cleaned(cell(0), cell(1), cell(2), cell(3)));
    }
    debug!(path = %path.display(), rows = rows.len(), "read CSV");
    Ok(rows.into_iter().collect())
}

/// Fixed-width preview of the first rows
#[must_use]
pub fn preview(rows: &[IndicatorRow], limit: usize) -> String {
    let shown = &rows[..rows.len().min(limit)];
    let mut widths = COLUMNS.map(str::len);
    for row in shown {
        for (w, cell) in widths.iter_mut().zip(cells(row)) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let line = |out: &mut String, values: [&str; 4]| {
        let padded: Vec<String> = values
            .iter()
            .zip(widths)
            .map(|(v, w)| format!("{v:<w$}"))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };
    line(&mut out, COLUMNS);
    for row in shown {
        line(&mut out, cells(row));
    }
    if rows.len() > shown.len() {
        let _ = writeln!(out, "... {} more rows", rows.len() - shown.len());
    }
    out
}

fn cells(row: &IndicatorRow) -> [&str; 4] {
    [&row.domain, &row.subdomain, &row.indicator, &row.paper]
}
