//! Result sink: two new output attributes plus one batch write.
//!
//! The sink contract mirrors what the backing store offers:
//!
//! - declare a double-valued hardness attribute and a short-string confidence
//!   attribute, dodging name collisions with `_1`, `_2`, … suffixes
//! - accept the complete `{record id -> result}` mapping as one batch and
//!   report how much of it was applied
//!
//! The pipeline assembles the whole mapping in memory before calling
//! `write_batch`, so the sink never sees partial state from our side. A
//! partial write reported back is the caller's warn-and-continue case, not an
//! abort.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::domain::HardnessResult;
use crate::error::AppError;
use crate::io::table::CsvTable;

/// Batch-write outcome. `unmatched` counts result ids the sink could not
/// attach to any stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub applied: usize,
    pub unmatched: usize,
}

impl WriteOutcome {
    pub fn all_applied(&self) -> bool {
        self.unmatched == 0
    }
}

/// Persistence seam for the computed results.
pub trait ResultSink {
    /// Reserve the two output attribute names, avoiding collisions with
    /// existing attributes. Returns `(hardness_name, confidence_name)`.
    fn reserve_output_fields(&mut self) -> (String, String);

    /// Apply the complete result mapping as one batch.
    fn write_batch(
        &mut self,
        results: &BTreeMap<u64, HardnessResult>,
    ) -> Result<WriteOutcome, AppError>;
}

/// Pick the first free name among `base`, `base_1`, `base_2`, …
pub fn unique_field_name(existing: &[String], base: &str) -> String {
    let taken = |name: &str| existing.iter().any(|h| h.eq_ignore_ascii_case(name));

    if !taken(base) {
        return base.to_string();
    }
    let mut counter = 1usize;
    loop {
        let candidate = format!("{base}_{counter}");
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// CSV-backed sink: re-emits the source table with the two new columns
/// appended, into a separate output file.
pub struct CsvSink<'a> {
    table: &'a CsvTable,
    path: PathBuf,
    output_fields: Option<(String, String)>,
}

impl<'a> CsvSink<'a> {
    pub fn new(table: &'a CsvTable, path: impl Into<PathBuf>) -> Self {
        Self {
            table,
            path: path.into(),
            output_fields: None,
        }
    }

    fn format_row(&self, id: u64, results: &BTreeMap<u64, HardnessResult>) -> (String, String) {
        match results.get(&id) {
            Some(result) => {
                let value = result
                    .value
                    .map(|v| format!("{v}"))
                    .unwrap_or_default();
                (value, result.confidence.label().to_string())
            }
            // Rows skipped during evaluation keep empty cells.
            None => (String::new(), String::new()),
        }
    }
}

impl ResultSink for CsvSink<'_> {
    fn reserve_output_fields(&mut self) -> (String, String) {
        let hardness = unique_field_name(self.table.headers(), "Hardness");
        let confidence = unique_field_name(self.table.headers(), "Confidence");
        self.output_fields = Some((hardness.clone(), confidence.clone()));
        (hardness, confidence)
    }

    fn write_batch(
        &mut self,
        results: &BTreeMap<u64, HardnessResult>,
    ) -> Result<WriteOutcome, AppError> {
        let (hardness_field, confidence_field) = self
            .output_fields
            .clone()
            .unwrap_or_else(|| {
                let h = unique_field_name(self.table.headers(), "Hardness");
                let c = unique_field_name(self.table.headers(), "Confidence");
                (h, c)
            });

        let file = File::create(&self.path).map_err(|e| {
            AppError::config(format!(
                "Failed to create output CSV '{}': {e}",
                self.path.display()
            ))
        })?;
        let mut writer = csv::Writer::from_writer(file);

        let mut header: Vec<String> = self.table.headers().to_vec();
        header.push(hardness_field);
        header.push(confidence_field);
        writer
            .write_record(&header)
            .map_err(|e| AppError::config(format!("Failed to write output CSV header: {e}")))?;

        let total = self.table.total();
        for id in self.table.row_ids() {
            let Some(record) = self.table.row(id as usize) else {
                continue;
            };

            let (value, confidence) = self.format_row(id, results);

            let mut out: Vec<String> = record.iter().map(str::to_string).collect();
            // Flexible inputs may have ragged rows; pad before appending.
            out.resize(self.table.headers().len(), String::new());
            out.push(value);
            out.push(confidence);
            writer
                .write_record(&out)
                .map_err(|e| AppError::config(format!("Failed to write output CSV row: {e}")))?;
        }

        writer
            .flush()
            .map_err(|e| AppError::config(format!("Failed to flush output CSV: {e}")))?;

        let unmatched = results
            .keys()
            .filter(|id| **id >= total as u64)
            .count();
        Ok(WriteOutcome {
            applied: results.len() - unmatched,
            unmatched,
        })
    }
}

/// In-memory sink for tests: records the batch and can simulate a store that
/// rejects part of it.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub existing_fields: Vec<String>,
    pub capacity: Option<u64>,
    pub written: BTreeMap<u64, HardnessResult>,
}

impl MemorySink {
    pub fn with_fields(existing_fields: &[&str]) -> Self {
        Self {
            existing_fields: existing_fields.iter().map(|s| s.to_string()).collect(),
            capacity: None,
            written: BTreeMap::new(),
        }
    }
}

impl ResultSink for MemorySink {
    fn reserve_output_fields(&mut self) -> (String, String) {
        let hardness = unique_field_name(&self.existing_fields, "Hardness");
        let confidence = unique_field_name(&self.existing_fields, "Confidence");
        self.existing_fields.push(hardness.clone());
        self.existing_fields.push(confidence.clone());
        (hardness, confidence)
    }

    fn write_batch(
        &mut self,
        results: &BTreeMap<u64, HardnessResult>,
    ) -> Result<WriteOutcome, AppError> {
        let mut applied = 0usize;
        let mut unmatched = 0usize;
        for (id, result) in results {
            match self.capacity {
                Some(cap) if *id >= cap => unmatched += 1,
                _ => {
                    self.written.insert(*id, *result);
                    applied += 1;
                }
            }
        }
        Ok(WriteOutcome { applied, unmatched })
    }
}

/// Default output path: `<input stem>_hardness.csv` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}_hardness.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Confidence;

    #[test]
    fn collision_avoidance_appends_counters() {
        let existing = vec![
            "Hardness".to_string(),
            "Hardness_1".to_string(),
            "Other".to_string(),
        ];
        assert_eq!(unique_field_name(&existing, "Hardness"), "Hardness_2");
        assert_eq!(unique_field_name(&existing, "Confidence"), "Confidence");
    }

    #[test]
    fn memory_sink_reserves_both_fields() {
        let mut sink = MemorySink::with_fields(&["E1", "Hardness"]);
        let (h, c) = sink.reserve_output_fields();
        assert_eq!(h, "Hardness_1");
        assert_eq!(c, "Confidence");
    }

    #[test]
    fn memory_sink_reports_partial_writes() {
        let mut sink = MemorySink::default();
        sink.capacity = Some(1);

        let mut results = BTreeMap::new();
        results.insert(
            0,
            HardnessResult {
                value: Some(8.6),
                confidence: Confidence::High,
            },
        );
        results.insert(
            5,
            HardnessResult {
                value: None,
                confidence: Confidence::Null,
            },
        );

        let outcome = sink.write_batch(&results).unwrap();
        assert_eq!(outcome.applied, 1);
        assert_eq!(outcome.unmatched, 1);
        assert!(!outcome.all_applied());
    }

    #[test]
    fn csv_sink_appends_two_columns() {
        let table = CsvTable::from_rows(
            &["E1", "E2", "PeakSV", "Depth"],
            &[&["10", "5", "2", "1"], &["0", "5", "2", "1"]],
        );
        let path = std::env::temp_dir().join("hardness_calc_sink_test.csv");
        let mut sink = CsvSink::new(&table, &path);
        let (h, c) = sink.reserve_output_fields();
        assert_eq!(h, "Hardness");
        assert_eq!(c, "Confidence");

        let mut results = BTreeMap::new();
        results.insert(
            0,
            HardnessResult {
                value: Some(8.6),
                confidence: Confidence::High,
            },
        );
        results.insert(
            1,
            HardnessResult {
                value: None,
                confidence: Confidence::Null,
            },
        );

        let outcome = sink.write_batch(&results).unwrap();
        assert!(outcome.all_applied());
        assert_eq!(outcome.applied, 2);

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next().unwrap(), "E1,E2,PeakSV,Depth,Hardness,Confidence");
        assert_eq!(lines.next().unwrap(), "10,5,2,1,8.6,High");
        assert_eq!(lines.next().unwrap(), "0,5,2,1,,");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn default_output_path_uses_input_stem() {
        let path = default_output_path(Path::new("/data/survey.csv"));
        assert_eq!(path, PathBuf::from("/data/survey_hardness.csv"));
    }
}
