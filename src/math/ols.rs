//! Unconstrained least squares.
//!
//! The diagnostic fit is a plain OLS problem with an intercept term:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β - b)^2
//! ```
//!
//! Implementation choices:
//! - We solve via SVD, which stays robust for tall design matrices.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The parameter dimension here is tiny (3 regressors + intercept), so SVD
//!   performance is a non-issue.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if the strict solve fails; near-
    // constant normalized columns can make the design almost rank-deficient.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = Xβ + b` and return `(β, b)`.
///
/// The intercept is carried as an appended all-ones column, so the returned
/// `β` has as many entries as `x` has columns.
pub fn solve_ols_with_intercept(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<(DVector<f64>, f64)> {
    let (n, p) = x.shape();
    let mut augmented = DMatrix::<f64>::zeros(n, p + 1);
    for i in 0..n {
        for j in 0..p {
            augmented[(i, j)] = x[(i, j)];
        }
        augmented[(i, p)] = 1.0;
    }

    let solution = solve_least_squares(&augmented, y)?;
    let beta = DVector::from_iterator(p, solution.iter().take(p).copied());
    let intercept = solution[p];
    Some((beta, intercept))
}
