//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::app::pipeline::RunOutput;
use crate::domain::{Confidence, FitConfig, Mode};

/// Format the full run summary (counts + fit diagnostics + final triple).
pub fn format_run_summary(output: &RunOutput, config: &FitConfig) -> String {
    let mut out = String::new();

    out.push_str("=== hardness - Coefficient Estimation ===\n");
    out.push_str(&format!(
        "Mode: {}\n",
        match config.mode {
            Mode::Manual => "Manual",
            Mode::Optimized => "Optimized",
        }
    ));
    out.push_str(&format!(
        "Linearization: {}\n",
        if config.linearize { "Enabled" } else { "Disabled" }
    ));
    out.push_str(&format!(
        "Records: read={} | usable={} | skipped={}\n",
        output.extraction.rows_read, output.extraction.rows_used, output.extraction.rows_skipped
    ));

    if let Some(filter) = &output.filter {
        out.push_str(&format!(
            "Outlier band: [{:.1}%, {:.1}%] | kept={} | removed={}\n",
            config.lower_percentile * 100.0,
            config.upper_percentile * 100.0,
            filter.kept,
            filter.removed
        ));
    }

    if let Some(diag) = &output.diagnostic {
        out.push_str("\nUnbounded regression (diagnostic only):\n");
        out.push_str(&format!(
            "  k1={:.4} k2={:.4} k3={:.4} intercept={:.4}\n",
            diag.k1, diag.k2, diag.k3, diag.intercept
        ));
    }

    let k = &output.coefficients;
    out.push_str(&format!(
        "\nResults (k1, k2, k3): k1: {:.4}, k2: {:.4}, k3: {:.4}\n",
        k.k1, k.k2, k.k3
    ));

    let (high, low, null) = confidence_counts(output);
    out.push_str(&format!(
        "Outputs: {} | High={high} Low={low} Null={null}\n",
        output.results.len()
    ));

    out
}

/// Markdown-style correlation matrix table for the processing log.
pub fn format_correlation_matrix(labels: &[&str], matrix: &[Vec<Option<f64>>]) -> String {
    let mut out = String::new();
    out.push_str("Correlation Matrix:\n");
    out.push_str(&format!("| {:>12} |", ""));
    for label in labels {
        out.push_str(&format!(" {label:>12} |"));
    }
    out.push('\n');

    for (i, label) in labels.iter().enumerate() {
        out.push_str(&format!("| {label:>12} |"));
        for j in 0..labels.len() {
            match matrix[i][j] {
                Some(v) => out.push_str(&format!(" {v:>12.3} |")),
                None => out.push_str(&format!(" {:>12} |", "-")),
            }
        }
        out.push('\n');
    }

    out
}

fn confidence_counts(output: &RunOutput) -> (usize, usize, usize) {
    let mut high = 0;
    let mut low = 0;
    let mut null = 0;
    for result in output.results.values() {
        match result.confidence {
            Confidence::High => high += 1,
            Confidence::Low => low += 1,
            Confidence::Null => null += 1,
        }
    }
    (high, low, null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_table_marks_undefined_entries() {
        let matrix = vec![
            vec![Some(1.0), None],
            vec![None, Some(1.0)],
        ];
        let table = format_correlation_matrix(&["E1", "Depth"], &matrix);
        assert!(table.contains("E1"));
        assert!(table.contains('-'));
        assert!(table.contains("1.000"));
    }
}
