//! Coefficient estimation.
//!
//! Responsibilities:
//!
//! - percentile-band outlier removal (`filter`)
//! - min-max normalization of the fit columns (`normalize`)
//! - the diagnostic and bounded regression solves (`solver`)

pub mod filter;
pub mod normalize;
pub mod solver;

pub use filter::*;
pub use normalize::*;
pub use solver::*;
