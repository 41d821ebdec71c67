//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input configuration (`Mode`, `FitConfig`, `CoefficientBounds`)
//! - extracted point records (`PointRecord`)
//! - fit outputs (`Coefficients`, `DiagnosticFit`, `RegressionResult`)
//! - per-record formula outputs (`HardnessResult`, `Confidence`)

pub mod types;

pub use types::*;
