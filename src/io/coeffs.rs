//! Write the coefficients report JSON.
//!
//! This is the "portable" representation of a run's estimation outcome:
//! - mode + linearization choice
//! - final (production) coefficients
//! - the unconstrained diagnostic fit, when one was computed
//! - record counts for context
//!
//! Useful for comparing runs or feeding the coefficients back via manual mode.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Coefficients, DiagnosticFit, Mode};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoefficientsFile {
    pub tool: String,
    pub mode: Mode,
    pub linearize: bool,
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<DiagnosticFit>,
    pub records_total: usize,
    pub records_fitted: usize,
}

impl CoefficientsFile {
    pub fn new(
        mode: Mode,
        linearize: bool,
        coefficients: Coefficients,
        diagnostic: Option<DiagnosticFit>,
        records_total: usize,
        records_fitted: usize,
    ) -> Self {
        Self {
            tool: "hardness".to_string(),
            mode,
            linearize,
            k1: coefficients.k1,
            k2: coefficients.k2,
            k3: coefficients.k3,
            diagnostic,
            records_total,
            records_fitted,
        }
    }
}

/// Write the coefficients report JSON.
pub fn write_coefficients_json(path: &Path, report: &CoefficientsFile) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::config(format!(
            "Failed to create coefficients JSON '{}': {e}",
            path.display()
        ))
    })?;

    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::config(format!("Failed to write coefficients JSON: {e}")))?;

    Ok(())
}
