//! Reporting utilities: the processing log and formatted terminal output.

pub mod format;
pub mod log;

pub use format::*;
pub use log::*;
