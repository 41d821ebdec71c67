//! Box-constrained least squares.
//!
//! We solve
//!
//! ```text
//! minimize ‖Xβ - y‖²  subject to  lo_i <= β_i <= hi_i
//! ```
//!
//! by cyclic coordinate descent on the normal equations, clamping each
//! coordinate into its box after the closed-form 1-D update. For a convex
//! quadratic with a positive diagonal this converges to the constrained
//! optimum, and it is fully deterministic (same inputs, same iterates), which
//! we prefer over general nonlinear optimizers for the same reasons the
//! rest of the pipeline avoids them.
//!
//! The dimension is tiny (three coefficients), so the dense Gram matrix and
//! the sweep count are both negligible.

use nalgebra::{DMatrix, DVector};

/// Hard cap on coordinate-descent sweeps before declaring non-convergence.
const MAX_SWEEPS: usize = 10_000;

/// Convergence threshold on the largest per-sweep coordinate change.
///
/// Inputs are min-max normalized into [0,1], so an absolute tolerance is
/// meaningful here.
const TOLERANCE: f64 = 1e-12;

/// Solve the box-constrained least-squares problem.
///
/// Returns `None` when the iteration fails to converge within the sweep cap.
/// Bounds must satisfy `lower[i] <= upper[i]`; columns of `x` and entries of
/// `y` must be finite (the caller validates this).
pub fn solve_bounded_least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    lower: &[f64],
    upper: &[f64],
) -> Option<DVector<f64>> {
    let p = x.ncols();
    debug_assert_eq!(lower.len(), p);
    debug_assert_eq!(upper.len(), p);

    let gram = x.transpose() * x;
    let xty = x.transpose() * y;

    // Start from the box midpoint; any feasible start works, this one is
    // symmetric and deterministic.
    let mut beta = DVector::from_iterator(
        p,
        (0..p).map(|i| 0.5 * (lower[i] + upper[i])),
    );

    for _ in 0..MAX_SWEEPS {
        let mut max_delta = 0.0_f64;

        for i in 0..p {
            let diag = gram[(i, i)];
            let candidate = if diag > f64::EPSILON {
                // Residual gradient for coordinate i with all others fixed.
                let mut partial = xty[i];
                for j in 0..p {
                    if j != i {
                        partial -= gram[(i, j)] * beta[j];
                    }
                }
                partial / diag
            } else {
                // Zero-norm column: the coefficient is unidentified, pin it to
                // the clamp of 0 into its box.
                0.0
            };

            let updated = candidate.clamp(lower[i], upper[i]);
            max_delta = max_delta.max((updated - beta[i]).abs());
            beta[i] = updated;
        }

        if max_delta < TOLERANCE {
            return Some(beta);
        }
    }

    None
}
