//! Hardness formula application.
//!
//! `evaluate` is a pure function of `(e1, e2, peak_sv, k, linearize)`: no
//! hidden state, identical inputs always produce identical output, whether
//! invoked in a dry run or the real pass.
//!
//! `apply_to_table` walks the *original unfiltered* source again with the raw
//! (non-normalized) values. Outlier removal and normalization affect only
//! coefficient estimation, never which records receive an output. Only the
//! three formula inputs are read here; a record with an unusable depth value
//! still gets a result.

use std::collections::BTreeMap;

use crate::domain::{Coefficients, Confidence, HardnessResult};
use crate::io::ingest::{parse_cell, ratio_term};
use crate::io::table::{CsvTable, FieldSelection};

/// Compute one record's hardness value and confidence.
pub fn evaluate(
    e1: f64,
    e2: f64,
    peak_sv: f64,
    k: &Coefficients,
    linearize: bool,
) -> HardnessResult {
    if !(e1 > 0.0 && peak_sv > 0.0) {
        return HardnessResult {
            value: None,
            confidence: Confidence::Null,
        };
    }

    let (value, confidence) = match ratio_term(e1, e2, linearize) {
        Some(ratio) => (k.k1 * e1 + k.k2 * ratio + k.k3 * peak_sv, Confidence::High),
        // `e2 <= 0`: drop the ratio term instead of the record.
        None => (k.k1 * e1 + k.k3 * peak_sv, Confidence::Low),
    };

    // Pathological inputs can overflow the linearized ratio; degrade the value
    // rather than hand a non-finite number downstream.
    let value = if value.is_finite() { Some(value) } else { None };
    HardnessResult { value, confidence }
}

/// Apply the formula to every source record.
///
/// Records whose formula inputs fail numeric conversion are skipped and never
/// appear in the mapping. `progress` receives `(done, total)` once per row.
pub fn apply_to_table(
    table: &CsvTable,
    fields: &FieldSelection,
    k: &Coefficients,
    linearize: bool,
    mut progress: impl FnMut(usize, usize),
) -> BTreeMap<u64, HardnessResult> {
    let total = table.total();
    let mut results = BTreeMap::new();

    for id in table.row_ids() {
        let row = id as usize;

        let parsed = (
            parse_cell(table, row, fields.e1),
            parse_cell(table, row, fields.e2),
            parse_cell(table, row, fields.peak_sv),
        );
        if let (Some(e1), Some(e2), Some(peak_sv)) = parsed {
            results.insert(id, evaluate(e1, e2, peak_sv, k, linearize));
        }

        progress(row + 1, total);
    }

    results
}
