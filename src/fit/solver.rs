//! The regression stage: one diagnostic solve, one production solve.
//!
//! Both run over the same normalized design matrix
//! `X = [e1_norm, ratio_norm, peak_norm]` and target `y = depth_norm`:
//!
//! - an unconstrained OLS fit (with intercept), kept for logging/inspection
//! - the box-constrained fit (no intercept) whose coefficients go to
//!   production
//!
//! A solve that fails aborts the whole run; partial coefficients are never
//! returned.

use nalgebra::{DMatrix, DVector};

use crate::domain::{CoefficientBounds, Coefficients, DiagnosticFit, PointRecord, RegressionResult};
use crate::error::AppError;
use crate::fit::normalize::normalize_for_fit;
use crate::math::{solve_bounded_least_squares, solve_ols_with_intercept};

/// Fit the coefficient triple over the (already outlier-filtered) records.
pub fn fit_coefficients(
    records: &[PointRecord],
    bounds: &CoefficientBounds,
) -> Result<RegressionResult, AppError> {
    let n = records.len();
    if n < 3 {
        return Err(AppError::numerical(format!(
            "Regression needs at least 3 records, got {n}."
        )));
    }

    let columns = normalize_for_fit(records);

    // The ratio column already had its undefined entries substituted; any
    // other non-finite value means a degenerate normalization and there is no
    // sensible solve to run.
    for (name, column) in [
        ("E1", &columns.e1),
        ("PeakSV", &columns.peak_sv),
        ("Depth", &columns.depth),
    ] {
        if column.iter().any(|v| !v.is_finite()) {
            return Err(AppError::numerical(format!(
                "Degenerate normalization: column `{name}` has no variation."
            )));
        }
    }

    let mut x = DMatrix::<f64>::zeros(n, 3);
    for i in 0..n {
        x[(i, 0)] = columns.e1[i];
        x[(i, 1)] = columns.ratio[i];
        x[(i, 2)] = columns.peak_sv[i];
    }
    let y = DVector::from_iterator(n, columns.depth.iter().copied());

    let (beta, intercept) = solve_ols_with_intercept(&x, &y)
        .ok_or_else(|| AppError::numerical("Unbounded regression failed to solve."))?;
    let diagnostic = DiagnosticFit {
        k1: beta[0],
        k2: beta[1],
        k3: beta[2],
        intercept,
    };

    let bounded = solve_bounded_least_squares(&x, &y, &bounds.lower, &bounds.upper)
        .ok_or_else(|| AppError::numerical("Bounded regression did not converge."))?;

    Ok(RegressionResult {
        coefficients: Coefficients::new(bounded[0], bounded[1], bounded[2]),
        diagnostic,
    })
}
