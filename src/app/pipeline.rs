//! The calculation pipeline.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! validate config -> extract -> (Optimized) filter + solve -> apply formula
//!
//! The CLI front-end then focuses on presentation and persistence. Manual and
//! Optimized runs share this single path, parameterized by `FitConfig::mode`.

use std::collections::BTreeMap;

use crate::domain::{
    Coefficients, DiagnosticFit, FitConfig, HardnessResult, Mode, PointRecord,
};
use crate::error::AppError;
use crate::fit::filter::{FilterSummary, remove_outliers};
use crate::fit::solver::fit_coefficients;
use crate::formula::apply_to_table;
use crate::io::ingest::{ExtractionSummary, extract_records};
use crate::io::table::{CsvTable, FieldNames};
use crate::math::correlation_matrix;
use crate::report::format::format_correlation_matrix;
use crate::report::log::ProcessingLog;

/// All computed outputs of a single calculator run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub extraction: ExtractionSummary,
    /// Present iff the run was Optimized.
    pub filter: Option<FilterSummary>,
    /// The production coefficient triple (fitted or user-supplied).
    pub coefficients: Coefficients,
    /// Present iff the run was Optimized; logging/inspection only.
    pub diagnostic: Option<DiagnosticFit>,
    /// Complete result mapping, assembled before any write is attempted.
    pub results: BTreeMap<u64, HardnessResult>,
}

impl RunOutput {
    /// Number of records that actually entered the bounded solve.
    pub fn records_fitted(&self) -> usize {
        self.filter
            .map(|f| f.kept)
            .unwrap_or(self.extraction.rows_used)
    }
}

/// Execute the full pipeline and return the computed outputs.
///
/// The caller hands the result mapping to a sink; nothing here writes
/// anything except log lines.
pub fn run_calculation(
    table: &CsvTable,
    names: &FieldNames,
    config: &FitConfig,
    log: &mut ProcessingLog,
) -> Result<RunOutput, AppError> {
    // All user input checking happens before any record is touched.
    config.validate()?;
    let fields = table.resolve_fields(names)?;

    log.line(&format!(
        "Linearization: {}",
        if config.linearize { "Enabled" } else { "Disabled" }
    ));
    log.line("Selected fields:");
    log.line(&format!("  E1: {}", names.e1));
    log.line(&format!("  E2: {}", names.e2));
    log.line(&format!("  PeakSV: {}", names.peak_sv));
    log.line(&format!("  Depth: {}", names.depth));
    log.line(&format!("Total records in source: {}", table.total()));

    // Extraction; surface the cosmetic progress fraction at decile steps.
    let mut last_decile = 0u32;
    let extracted = extract_records(table, &fields, config.linearize, |fraction| {
        let decile = (fraction * 10.0) as u32;
        if decile > last_decile {
            last_decile = decile;
            log.line(&format!("Extraction progress: {}%", decile * 10));
        }
    });
    log.line(&format!(
        "Valid records for processing: {}",
        extracted.summary.rows_used
    ));

    if extracted.records.is_empty() {
        return Err(AppError::no_data(
            "No valid data found in the selected fields.",
        ));
    }

    let (coefficients, diagnostic, filter) = match config.mode {
        Mode::Manual => {
            log.line("Manual Mode Selected");
            log.line("User defined parameters:");
            log.line(&format!("  k1: {:.4}", config.manual.k1));
            log.line(&format!("  k2: {:.4}", config.manual.k2));
            log.line(&format!("  k3: {:.4}", config.manual.k3));
            (config.manual, None, None)
        }
        Mode::Optimized => {
            log.line("Optimized Mode Selected");
            log.line("Percentile settings:");
            log.line(&format!("  Lower: {}%", config.lower_percentile * 100.0));
            log.line(&format!("  Upper: {}%", config.upper_percentile * 100.0));

            let (kept, summary) = remove_outliers(
                &extracted.records,
                config.lower_percentile,
                config.upper_percentile,
            )?;
            log.line(&format!("Data points after outlier removal: {}", summary.kept));
            log.line(&format!("Outliers removed: {}", summary.removed));

            log_correlations(log, &kept);

            let result = fit_coefficients(&kept, &config.bounds())?;
            log.line("Unbounded Regression Results:");
            log.line(&format!("  k1: {:.4}", result.diagnostic.k1));
            log.line(&format!("  k2: {:.4}", result.diagnostic.k2));
            log.line(&format!("  k3: {:.4}", result.diagnostic.k3));
            log.line(&format!("  Intercept: {:.4}", result.diagnostic.intercept));
            log.line("Bounded Regression Results (Final Parameters):");
            log.line(&format!("  k1: {:.4}", result.coefficients.k1));
            log.line(&format!("  k2: {:.4}", result.coefficients.k2));
            log.line(&format!("  k3: {:.4}", result.coefficients.k3));

            (result.coefficients, Some(result.diagnostic), Some(summary))
        }
    };

    // Apply the formula over the original unfiltered source with raw values.
    log.line(&format!(
        "Starting hardness calculation for {} records",
        table.total()
    ));
    let update_interval = (table.total() / 100).clamp(1, 1000);
    let results = apply_to_table(table, &fields, &coefficients, config.linearize, |done, total| {
        if done % update_interval == 0 || done == total {
            let pct = done as f64 / total.max(1) as f64 * 100.0;
            log.line(&format!("Progress: {pct:.1}% ({done}/{total} records)"));
        }
    });

    Ok(RunOutput {
        extraction: extracted.summary,
        filter,
        coefficients,
        diagnostic,
        results,
    })
}

fn log_correlations(log: &mut ProcessingLog, records: &[PointRecord]) {
    let e1: Vec<f64> = records.iter().map(|r| r.e1).collect();
    let ratio: Vec<f64> = records.iter().map(|r| r.ratio).collect();
    let peak_sv: Vec<f64> = records.iter().map(|r| r.peak_sv).collect();
    let depth: Vec<f64> = records.iter().map(|r| r.depth).collect();

    let matrix = correlation_matrix(&[&e1, &ratio, &peak_sv, &depth]);
    log.block(&format_correlation_matrix(
        &["E1", "E1_E2_ratio", "PeakSV", "Depth"],
        &matrix,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Confidence;

    fn names() -> FieldNames {
        FieldNames {
            e1: "E1".to_string(),
            e2: "E2".to_string(),
            peak_sv: "PeakSV".to_string(),
            depth: "Depth".to_string(),
        }
    }

    fn manual_config() -> FitConfig {
        FitConfig {
            mode: Mode::Manual,
            linearize: false,
            manual: Coefficients::new(0.7, 0.5, 0.3),
            lower_percentile: 0.05,
            upper_percentile: 0.95,
        }
    }

    fn table_from(rows: &[Vec<String>]) -> CsvTable {
        let row_refs: Vec<Vec<&str>> = rows
            .iter()
            .map(|r| r.iter().map(String::as_str).collect())
            .collect();
        let slices: Vec<&[&str]> = row_refs.iter().map(|r| r.as_slice()).collect();
        CsvTable::from_rows(&["E1", "E2", "PeakSV", "Depth"], &slices)
    }

    fn row(e1: f64, e2: f64, peak_sv: f64, depth: f64) -> Vec<String> {
        vec![
            format!("{e1}"),
            format!("{e2}"),
            format!("{peak_sv}"),
            format!("{depth}"),
        ]
    }

    /// Rows following depth = 0.9*e1 + 0.3*ratio + 0.35*peak_sv exactly.
    fn linear_rows(n: usize) -> Vec<Vec<String>> {
        (0..n)
            .map(|i| {
                let t = i as f64 / (n as f64 - 1.0);
                let e1 = 5.0 + 10.0 * t;
                let e2 = 2.0 + 3.0 * ((i * 7) % n) as f64 / n as f64;
                let peak_sv = 1.0 + 2.0 * ((i * 3) % n) as f64 / n as f64;
                let depth = 0.9 * e1 + 0.3 * (e1 / e2) + 0.35 * peak_sv;
                row(e1, e2, peak_sv, depth)
            })
            .collect()
    }

    #[test]
    fn manual_run_applies_user_triple() {
        let table = table_from(&[row(10.0, 5.0, 2.0, 1.0)]);
        let output = run_calculation(
            &table,
            &names(),
            &manual_config(),
            &mut ProcessingLog::disabled(),
        )
        .unwrap();

        // ratio = 2.0 -> 0.7*10 + 0.5*2 + 0.3*2 = 8.6
        let result = &output.results[&0];
        assert_eq!(result.confidence, Confidence::High);
        assert!((result.value.unwrap() - 8.6).abs() < 1e-12);
        assert!(output.filter.is_none());
        assert!(output.diagnostic.is_none());
    }

    #[test]
    fn e2_zero_gets_the_two_term_formula() {
        let table = table_from(&[row(10.0, 5.0, 2.0, 1.0), row(10.0, 0.0, 2.0, 1.0)]);
        let output = run_calculation(
            &table,
            &names(),
            &manual_config(),
            &mut ProcessingLog::disabled(),
        )
        .unwrap();

        // 0.7*10 + 0.3*2 = 7.6, ratio term dropped.
        let result = &output.results[&1];
        assert_eq!(result.confidence, Confidence::Low);
        assert!((result.value.unwrap() - 7.6).abs() < 1e-12);
        // The e2=0 row never entered the fit dataset.
        assert_eq!(output.extraction.rows_used, 1);
    }

    #[test]
    fn e1_zero_gets_null_regardless_of_mode() {
        let mut rows = linear_rows(20);
        rows.push(row(0.0, 5.0, 2.0, 1.0));
        let table = table_from(&rows);

        for mode in [Mode::Manual, Mode::Optimized] {
            let config = FitConfig {
                mode,
                ..manual_config()
            };
            let output =
                run_calculation(&table, &names(), &config, &mut ProcessingLog::disabled())
                    .unwrap();
            let result = &output.results[&20];
            assert_eq!(result.value, None);
            assert_eq!(result.confidence, Confidence::Null);
        }
    }

    #[test]
    fn optimized_outlier_is_excluded_from_fit_but_still_evaluated() {
        let mut rows = linear_rows(30);
        // A wildly off-band PeakSV; everything else in range.
        rows.push(row(10.0, 4.0, 500.0, 10.0));
        let table = table_from(&rows);

        let config = FitConfig {
            mode: Mode::Optimized,
            ..manual_config()
        };
        let output =
            run_calculation(&table, &names(), &config, &mut ProcessingLog::disabled()).unwrap();

        let filter = output.filter.unwrap();
        assert!(filter.removed >= 1);
        assert!(filter.kept < output.extraction.rows_used);

        // Fitted coefficients respect the box.
        let bounds = config.bounds();
        let k = [
            output.coefficients.k1,
            output.coefficients.k2,
            output.coefficients.k3,
        ];
        for i in 0..3 {
            assert!(k[i] >= bounds.lower[i] - 1e-12);
            assert!(k[i] <= bounds.upper[i] + 1e-12);
        }

        // The outlier still receives a formula output.
        let outlier = &output.results[&30];
        assert_eq!(outlier.confidence, Confidence::High);
        assert!(outlier.value.is_some());

        assert!(output.diagnostic.is_some());
        assert_eq!(output.records_fitted(), filter.kept);
    }

    #[test]
    fn invalid_percentiles_are_rejected_before_any_record() {
        let table = table_from(&[row(10.0, 5.0, 2.0, 1.0)]);
        let config = FitConfig {
            mode: Mode::Optimized,
            lower_percentile: 0.60,
            upper_percentile: 0.40,
            ..manual_config()
        };
        let err = run_calculation(&table, &names(), &config, &mut ProcessingLog::disabled())
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn all_records_invalid_is_a_no_data_error() {
        let table = table_from(&[row(0.0, 5.0, 2.0, 1.0), row(-1.0, 5.0, 2.0, 1.0)]);
        let err = run_calculation(
            &table,
            &names(),
            &manual_config(),
            &mut ProcessingLog::disabled(),
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn linearized_manual_run_matches_direct_evaluation() {
        let table = table_from(&[row(10.0, 5.0, 2.0, 1.0)]);
        let config = FitConfig {
            linearize: true,
            ..manual_config()
        };
        let output =
            run_calculation(&table, &names(), &config, &mut ProcessingLog::disabled()).unwrap();

        let expected = crate::formula::evaluate(10.0, 5.0, 2.0, &config.manual, true);
        assert_eq!(output.results[&0], expected);
    }
}
