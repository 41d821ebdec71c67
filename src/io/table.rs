//! CSV table loading and field resolution.
//!
//! The whole table is read into memory once. That keeps the source
//! re-iterable (extraction and formula application each walk all rows) and
//! makes the total count available up front for progress reporting.
//!
//! Design goals:
//! - **Strict schema** only for the four user-named columns (clear errors)
//! - **Deterministic behavior** (no hidden randomness, source order kept)
//! - **Separation of concerns**: no numeric conversion here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::error::AppError;

/// The four caller-chosen attribute names.
#[derive(Debug, Clone)]
pub struct FieldNames {
    pub e1: String,
    pub e2: String,
    pub peak_sv: String,
    pub depth: String,
}

/// Resolved column indices for the four inputs.
#[derive(Debug, Clone, Copy)]
pub struct FieldSelection {
    pub e1: usize,
    pub e2: usize,
    pub peak_sv: usize,
    pub depth: usize,
}

/// An in-memory CSV table: headers plus data rows in source order.
#[derive(Debug, Clone)]
pub struct CsvTable {
    headers: Vec<String>,
    header_map: HashMap<String, usize>,
    rows: Vec<StringRecord>,
}

impl CsvTable {
    /// Load a CSV file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::config(format!("Failed to open CSV '{}': {e}", path.display()))
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::config(format!("Failed to read CSV headers: {e}")))?
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record =
                result.map_err(|e| AppError::config(format!("Failed to read CSV row: {e}")))?;
            rows.push(record);
        }

        Ok(Self::from_parts(headers, rows))
    }

    /// Build a table from in-memory rows (used by tests and the sample writer).
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let rows: Vec<StringRecord> = rows
            .iter()
            .map(|row| StringRecord::from(row.to_vec()))
            .collect();
        Self::from_parts(headers, rows)
    }

    fn from_parts(headers: Vec<String>, rows: Vec<StringRecord>) -> Self {
        let header_map = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (normalize_header_name(name), idx))
            .collect();
        Self {
            headers,
            header_map,
            rows,
        }
    }

    /// Total number of data rows (progress denominators use this).
    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Look up a column by name (case-insensitive, BOM-tolerant).
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.header_map.get(&normalize_header_name(name)).copied()
    }

    /// Resolve all four input columns, failing fast on any missing name.
    pub fn resolve_fields(&self, names: &FieldNames) -> Result<FieldSelection, AppError> {
        let resolve = |name: &str| {
            self.field_index(name)
                .ok_or_else(|| AppError::config(format!("Missing required column: `{name}`")))
        };
        Ok(FieldSelection {
            e1: resolve(&names.e1)?,
            e2: resolve(&names.e2)?,
            peak_sv: resolve(&names.peak_sv)?,
            depth: resolve(&names.depth)?,
        })
    }

    /// Cell value for `(row, column)`; `None` for missing or empty cells.
    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)?
            .get(column)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Iterate data rows in source order with their stable ids.
    pub fn row_ids(&self) -> impl Iterator<Item = u64> + '_ {
        0..self.rows.len() as u64
    }

    /// Raw record for output re-emission.
    pub fn row(&self, row: usize) -> Option<&StringRecord> {
        self.rows.get(row)
    }
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿E1"). If we don't strip it, field resolution would
    // incorrectly report a missing column.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> FieldNames {
        FieldNames {
            e1: "E1".to_string(),
            e2: "E2".to_string(),
            peak_sv: "PeakSV".to_string(),
            depth: "Depth".to_string(),
        }
    }

    #[test]
    fn resolves_fields_case_insensitively() {
        let table = CsvTable::from_rows(
            &["id", "e1", "e2", "peaksv", "depth"],
            &[&["1", "10", "5", "2", "1"]],
        );
        let sel = table.resolve_fields(&names()).unwrap();
        assert_eq!(sel.e1, 1);
        assert_eq!(sel.depth, 4);
    }

    #[test]
    fn missing_column_is_a_config_error() {
        let table = CsvTable::from_rows(&["E1", "E2", "Depth"], &[]);
        let err = table.resolve_fields(&names()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_cells_read_as_none() {
        let table = CsvTable::from_rows(&["E1", "E2"], &[&["10", ""], &["", "3"]]);
        assert_eq!(table.value(0, 0), Some("10"));
        assert_eq!(table.value(0, 1), None);
        assert_eq!(table.value(1, 0), None);
        assert_eq!(table.total(), 2);
    }

    #[test]
    fn bom_prefixed_header_still_resolves() {
        let table = CsvTable::from_rows(&["\u{feff}E1", "E2", "PeakSV", "Depth"], &[]);
        assert_eq!(table.field_index("E1"), Some(0));
    }
}
