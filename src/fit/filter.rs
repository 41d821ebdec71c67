//! Percentile-band outlier removal (Optimized mode only).
//!
//! Quantiles are computed independently per column over the current dataset;
//! a record survives only if its value lies within `[q(lo), q(hi)]` for
//! *every* column. Failing the band on any single column drops the record
//! entirely.
//!
//! Re-applying the filter to its own output generally shifts the quantiles,
//! so the operation is not idempotent; that is expected, not a bug.

use crate::domain::PointRecord;
use crate::error::AppError;
use crate::math::quantile;

/// Counts describing a filter pass.
#[derive(Debug, Clone, Copy)]
pub struct FilterSummary {
    pub input: usize,
    pub kept: usize,
    pub removed: usize,
}

/// Per-column `[q(lo), q(hi)]` band applied during filtering.
#[derive(Debug, Clone, Copy)]
struct Band {
    lo: f64,
    hi: f64,
}

impl Band {
    fn contains(&self, v: f64) -> bool {
        self.lo <= v && v <= self.hi
    }
}

/// Drop records outside the per-column percentile band.
pub fn remove_outliers(
    records: &[PointRecord],
    lower: f64,
    upper: f64,
) -> Result<(Vec<PointRecord>, FilterSummary), AppError> {
    if !(lower.is_finite() && upper.is_finite() && 0.0 <= lower && lower < upper && upper <= 1.0) {
        return Err(AppError::config(
            "Percentiles must be between 0 and 100, with lower < upper.",
        ));
    }
    if records.is_empty() {
        return Ok((
            Vec::new(),
            FilterSummary {
                input: 0,
                kept: 0,
                removed: 0,
            },
        ));
    }

    let columns: [Vec<f64>; 4] = [
        records.iter().map(|r| r.e1).collect(),
        records.iter().map(|r| r.ratio).collect(),
        records.iter().map(|r| r.peak_sv).collect(),
        records.iter().map(|r| r.depth).collect(),
    ];

    let mut bands = Vec::with_capacity(columns.len());
    for column in &columns {
        let (Some(lo), Some(hi)) = (quantile(column, lower), quantile(column, upper)) else {
            return Err(AppError::numerical(
                "Failed to compute percentile bounds for outlier removal.",
            ));
        };
        bands.push(Band { lo, hi });
    }

    let kept: Vec<PointRecord> = records
        .iter()
        .filter(|r| {
            let values = [r.e1, r.ratio, r.peak_sv, r.depth];
            values
                .iter()
                .zip(bands.iter())
                .all(|(v, band)| band.contains(*v))
        })
        .cloned()
        .collect();

    let summary = FilterSummary {
        input: records.len(),
        kept: kept.len(),
        removed: records.len() - kept.len(),
    };
    Ok((kept, summary))
}
