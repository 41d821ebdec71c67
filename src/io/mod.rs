//! Input/output helpers.
//!
//! - CSV table load + field resolution (`table`)
//! - record extraction for fitting (`ingest`)
//! - result sink + output CSV (`export`)
//! - coefficients-report JSON (`coeffs`)

pub mod coeffs;
pub mod export;
pub mod ingest;
pub mod table;

pub use coeffs::*;
pub use export::*;
pub use ingest::*;
pub use table::*;
