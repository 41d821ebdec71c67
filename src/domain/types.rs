//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON
//! - reloaded later for comparisons across runs

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// How the coefficient triple is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Use the user-supplied k1/k2/k3 verbatim (no bound checking).
    Manual,
    /// Estimate k1/k2/k3 by bounded regression against the depth column.
    Optimized,
}

/// Which formula variant produced a record's hardness value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    /// Full three-term formula (`e2 > 0`, ratio term included).
    High,
    /// Two-term formula (`e2 <= 0`, ratio term dropped).
    Low,
    /// No value (`e1 <= 0` or `peak_sv <= 0`).
    Null,
}

impl Confidence {
    /// Label written into the string output attribute.
    ///
    /// `Null` maps to an empty cell; the original store wrote a database NULL,
    /// which a CSV cannot express.
    pub fn label(self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Low => "Low",
            Confidence::Null => "",
        }
    }
}

/// The coefficient triple applied in the hardness formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
}

impl Coefficients {
    pub fn new(k1: f64, k2: f64, k3: f64) -> Self {
        Self { k1, k2, k3 }
    }

    pub fn is_finite(&self) -> bool {
        self.k1.is_finite() && self.k2.is_finite() && self.k3.is_finite()
    }
}

/// Box constraints for the bounded solve, one `[lower, upper]` pair per
/// coefficient in k1/k2/k3 order.
///
/// The bounds are chosen on the *normalized* regressor scale (which is what
/// makes them comparable across columns). The ratio term changes scale under
/// linearization, so k2 gets a much tighter band there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientBounds {
    pub lower: [f64; 3],
    pub upper: [f64; 3],
}

impl CoefficientBounds {
    pub fn for_linearization(linearize: bool) -> Self {
        if linearize {
            Self {
                lower: [0.5, 0.01, 0.2],
                upper: [1.5, 0.05, 0.5],
            }
        } else {
            Self {
                lower: [0.5, 0.1, 0.2],
                upper: [1.5, 0.7, 0.5],
            }
        }
    }
}

/// A record that survived extraction.
///
/// Invariant: all raw fields are finite, `e1 > 0`, `peak_sv > 0`, and `ratio`
/// is defined (`e2 > 0` at extraction time).
#[derive(Debug, Clone)]
pub struct PointRecord {
    /// Stable source identity (0-based data row index).
    pub id: u64,
    pub e1: f64,
    pub e2: f64,
    pub peak_sv: f64,
    pub depth: f64,
    /// `e1/e2` (linear) or `10^((e1-e2)/10)` (linearized).
    pub ratio: f64,
}

/// Unconstrained fit over the normalized design, kept for logging and
/// inspection only. Never feeds the production coefficients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DiagnosticFit {
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
    pub intercept: f64,
}

/// Output of the optimized solve.
#[derive(Debug, Clone)]
pub struct RegressionResult {
    /// Bounded-solve coefficients; these are the production values.
    pub coefficients: Coefficients,
    pub diagnostic: DiagnosticFit,
}

/// Per-record formula output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardnessResult {
    pub value: Option<f64>,
    pub confidence: Confidence,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults) and is immutable once built;
/// `validate` is the single boundary where user input is checked, before any
/// record is processed.
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub mode: Mode,
    /// Use `10^((e1-e2)/10)` for the ratio term instead of `e1/e2`.
    pub linearize: bool,
    /// Used iff `mode == Manual`.
    pub manual: Coefficients,
    /// Outlier band as fractions, used iff `mode == Optimized`.
    pub lower_percentile: f64,
    pub upper_percentile: f64,
}

impl FitConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        match self.mode {
            Mode::Manual => {
                if !self.manual.is_finite() {
                    return Err(AppError::config(
                        "Please enter valid numeric values for k1, k2, and k3.",
                    ));
                }
            }
            Mode::Optimized => {
                let (lo, hi) = (self.lower_percentile, self.upper_percentile);
                if !(lo.is_finite() && hi.is_finite() && 0.0 <= lo && lo < hi && hi <= 1.0) {
                    return Err(AppError::config(
                        "Percentiles must be between 0 and 100, with lower < upper.",
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn bounds(&self) -> CoefficientBounds {
        CoefficientBounds::for_linearization(self.linearize)
    }
}
