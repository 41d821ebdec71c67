//! Min-max normalization of the fit columns.
//!
//! The three regressor columns (E1, ratio, PeakSV) and the target (Depth) are
//! rescaled into [0,1] using the *filtered* dataset's own min/max, recomputed
//! every invocation. This exists solely to make the regressors comparable so
//! the box-constraint bounds apply meaningfully; raw values are untouched and
//! reused for formula application.
//!
//! Degenerate (constant) columns divide by zero and come out all-NaN. The
//! ratio column substitutes 0 for its undefined entries before the solve;
//! any other non-finite column is left for the solver to reject.

use crate::domain::PointRecord;

/// Normalized fit columns, aligned with the input record order.
#[derive(Debug, Clone)]
pub struct NormalizedColumns {
    pub e1: Vec<f64>,
    pub ratio: Vec<f64>,
    pub peak_sv: Vec<f64>,
    pub depth: Vec<f64>,
}

/// `(x - min) / (max - min)` per entry; all-NaN when the column is constant.
pub fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values.iter().map(|v| (v - min) / span).collect()
}

/// Build the normalized design columns for the regression stage.
pub fn normalize_for_fit(records: &[PointRecord]) -> NormalizedColumns {
    let e1 = min_max_scale(&records.iter().map(|r| r.e1).collect::<Vec<_>>());
    let peak_sv = min_max_scale(&records.iter().map(|r| r.peak_sv).collect::<Vec<_>>());
    let depth = min_max_scale(&records.iter().map(|r| r.depth).collect::<Vec<_>>());

    // "No variation / missing ratio" is treated as neutral rather than letting
    // undefined values reach the solve.
    let ratio = min_max_scale(&records.iter().map(|r| r.ratio).collect::<Vec<_>>())
        .into_iter()
        .map(|v| if v.is_finite() { v } else { 0.0 })
        .collect();

    NormalizedColumns {
        e1,
        ratio,
        peak_sv,
        depth,
    }
}
