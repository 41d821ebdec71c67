//! Record extraction for fitting.
//!
//! This module turns the raw table into the clean set of `PointRecord`s that
//! are safe to fit:
//!
//! - all four fields convert to finite numbers
//! - `e1 > 0` and `peak_sv > 0`
//! - the ratio term is defined (`e2 > 0`)
//!
//! Anything else is a silent skip. That is the system's tolerant-ingestion
//! policy: a bad row must never abort the batch, and the caller learns about
//! skips only through the summary counts.
//!
//! Note the formula evaluator performs its own, independent `e2 > 0` check at
//! application time; the requirement here is about fitting only.

use crate::domain::PointRecord;
use crate::io::table::{CsvTable, FieldSelection};

/// Counts describing an extraction pass.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionSummary {
    pub rows_read: usize,
    pub rows_used: usize,
    pub rows_skipped: usize,
}

/// Extraction output: fit-ready records plus counts.
#[derive(Debug, Clone)]
pub struct ExtractedData {
    pub records: Vec<PointRecord>,
    pub summary: ExtractionSummary,
}

/// Derived ratio term; `None` when `e2 <= 0`.
pub fn ratio_term(e1: f64, e2: f64, linearize: bool) -> Option<f64> {
    if e2 > 0.0 {
        if linearize {
            Some(10f64.powf((e1 - e2) / 10.0))
        } else {
            Some(e1 / e2)
        }
    } else {
        None
    }
}

/// Walk every row, keeping those usable for fitting.
///
/// `progress` receives the fraction `(index + 1) / total` once per row. It is
/// purely cosmetic and must not affect ordering or results; the caller decides
/// how often to surface it.
pub fn extract_records(
    table: &CsvTable,
    fields: &FieldSelection,
    linearize: bool,
    mut progress: impl FnMut(f64),
) -> ExtractedData {
    let total = table.total();
    let mut records = Vec::new();

    for id in table.row_ids() {
        let row = id as usize;

        let parsed = (
            parse_cell(table, row, fields.e1),
            parse_cell(table, row, fields.e2),
            parse_cell(table, row, fields.peak_sv),
            parse_cell(table, row, fields.depth),
        );
        if let (Some(e1), Some(e2), Some(peak_sv), Some(depth)) = parsed {
            if e1 > 0.0 && peak_sv > 0.0 {
                if let Some(ratio) = ratio_term(e1, e2, linearize) {
                    records.push(PointRecord {
                        id,
                        e1,
                        e2,
                        peak_sv,
                        depth,
                        ratio,
                    });
                }
            }
        }

        progress((row + 1) as f64 / total.max(1) as f64);
    }

    let rows_used = records.len();
    ExtractedData {
        records,
        summary: ExtractionSummary {
            rows_read: total,
            rows_used,
            rows_skipped: total - rows_used,
        },
    }
}

/// Numeric cell conversion; non-finite values count as unparsable.
pub fn parse_cell(table: &CsvTable, row: usize, column: usize) -> Option<f64> {
    let v = table.value(row, column)?.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::table::FieldNames;

    fn fixture() -> (CsvTable, FieldSelection) {
        let table = CsvTable::from_rows(
            &["E1", "E2", "PeakSV", "Depth"],
            &[
                &["10", "5", "2", "1"],    // kept
                &["10", "0", "2", "1"],    // e2 <= 0: no ratio, skipped for fitting
                &["0", "5", "2", "1"],     // e1 <= 0: skipped
                &["10", "5", "-2", "1"],   // peak_sv <= 0: skipped
                &["ten", "5", "2", "1"],   // unparsable: skipped
                &["10", "5", "2", ""],     // missing depth: skipped
                &["8", "4", "3", "2"],     // kept
            ],
        );
        let names = FieldNames {
            e1: "E1".to_string(),
            e2: "E2".to_string(),
            peak_sv: "PeakSV".to_string(),
            depth: "Depth".to_string(),
        };
        let sel = table.resolve_fields(&names).unwrap();
        (table, sel)
    }

    #[test]
    fn keeps_only_fit_ready_records() {
        let (table, sel) = fixture();
        let data = extract_records(&table, &sel, false, |_| {});

        assert_eq!(data.summary.rows_read, 7);
        assert_eq!(data.summary.rows_used, 2);
        assert_eq!(data.summary.rows_skipped, 5);

        assert_eq!(data.records[0].id, 0);
        assert!((data.records[0].ratio - 2.0).abs() < 1e-12);
        assert_eq!(data.records[1].id, 6);
        assert!((data.records[1].ratio - 2.0).abs() < 1e-12);
    }

    #[test]
    fn linearized_ratio_uses_log_form() {
        let (table, sel) = fixture();
        let data = extract_records(&table, &sel, true, |_| {});
        // 10^((10-5)/10) = 10^0.5
        assert!((data.records[0].ratio - 10f64.powf(0.5)).abs() < 1e-12);
    }

    #[test]
    fn progress_fraction_is_monotone_and_ends_at_one() {
        let (table, sel) = fixture();
        let mut seen = Vec::new();
        extract_records(&table, &sel, false, |f| seen.push(f));

        assert_eq!(seen.len(), 7);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!((seen.last().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn source_order_and_duplicates_are_preserved() {
        let table = CsvTable::from_rows(
            &["E1", "E2", "PeakSV", "Depth"],
            &[&["10", "5", "2", "1"], &["10", "5", "2", "1"]],
        );
        let names = FieldNames {
            e1: "E1".to_string(),
            e2: "E2".to_string(),
            peak_sv: "PeakSV".to_string(),
            depth: "Depth".to_string(),
        };
        let sel = table.resolve_fields(&names).unwrap();
        let data = extract_records(&table, &sel, false, |_| {});
        assert_eq!(data.records.len(), 2);
        assert_eq!(data.records[0].id, 0);
        assert_eq!(data.records[1].id, 1);
    }
}
