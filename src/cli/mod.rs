//! Command-line parsing for the hardness calculator.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Mode;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hardness", version, about = "Subsurface hardness calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate (or take) k1/k2/k3 and apply the hardness formula to a CSV.
    Fit(FitArgs),
    /// Generate a synthetic survey CSV for trying out `fit`.
    Sample(SampleArgs),
}

/// Options for the calculator run.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Input CSV with the point records.
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Column holding the first energy measurement.
    #[arg(long, default_value = "E1")]
    pub e1_field: String,

    /// Column holding the second energy measurement.
    #[arg(long, default_value = "E2")]
    pub e2_field: String,

    /// Column holding the peak signal value.
    #[arg(long, default_value = "PeakSV")]
    pub peak_field: String,

    /// Column holding the reference depth.
    #[arg(long, default_value = "Depth")]
    pub depth_field: String,

    /// Calculation mode.
    #[arg(short = 'm', long, value_enum, default_value_t = Mode::Manual)]
    pub mode: Mode,

    /// Use the linearized E1/E2 form `10^((E1-E2)/10)` for the ratio term.
    #[arg(long)]
    pub linearize: bool,

    /// k1 (recommended: 0.7 (0.5-1.5)). Manual mode only.
    #[arg(long, default_value_t = 0.7)]
    pub k1: f64,

    /// k2 (recommended: 0.5 (0.1-0.7); 0.03 (0.01-0.05) when linearized).
    /// Manual mode only. Defaults to the recommendation for the chosen form.
    #[arg(long)]
    pub k2: Option<f64>,

    /// k3 (recommended: 0.3 (0.2-0.5)). Manual mode only.
    #[arg(long, default_value_t = 0.3)]
    pub k3: f64,

    /// Lower percentile (%) for outlier removal. Optimized mode only.
    #[arg(long, default_value_t = 5.0)]
    pub lower_percentile: f64,

    /// Upper percentile (%) for outlier removal. Optimized mode only.
    #[arg(long, default_value_t = 95.0)]
    pub upper_percentile: f64,

    /// Output CSV (input plus the two new columns).
    /// Defaults to `<input stem>_hardness.csv`.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Processing log path.
    /// Defaults to `<input stem>_hardness_processing.txt`.
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Disable the processing log entirely.
    #[arg(long)]
    pub no_log: bool,

    /// Export the coefficient report to JSON.
    #[arg(long = "export-coeffs")]
    pub export_coeffs: Option<PathBuf>,
}

/// Options for synthetic survey generation.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Where to write the generated CSV.
    #[arg(short = 'o', long)]
    pub out: PathBuf,

    /// Number of rows to generate.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Depth noise standard deviation.
    #[arg(long, default_value_t = 0.25)]
    pub noise: f64,
}
