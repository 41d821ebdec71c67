//! Mathematical utilities: least-squares solvers and column statistics.

pub mod bvls;
pub mod ols;
pub mod stats;

pub use bvls::*;
pub use ols::*;
pub use stats::*;
