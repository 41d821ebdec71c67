//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the input table and opens the processing log
//! - runs the calculation pipeline
//! - persists results and optional exports
//! - prints the run summary

use clap::Parser;

use crate::cli::{Command, FitArgs, SampleArgs};
use crate::data::sample::{SampleConfig, generate_survey, write_survey_csv};
use crate::domain::{Coefficients, FitConfig};
use crate::error::AppError;
use crate::io::coeffs::{CoefficientsFile, write_coefficients_json};
use crate::io::export::{CsvSink, ResultSink, default_output_path};
use crate::io::table::{CsvTable, FieldNames};
use crate::report::log::{ProcessingLog, default_log_path};

pub mod pipeline;

/// Entry point for the `hardness` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    // Reject bad configuration before touching the input at all.
    config.validate()?;

    let names = FieldNames {
        e1: args.e1_field.clone(),
        e2: args.e2_field.clone(),
        peak_sv: args.peak_field.clone(),
        depth: args.depth_field.clone(),
    };

    let table = CsvTable::load(&args.input)?;

    let mut log = if args.no_log {
        ProcessingLog::disabled()
    } else {
        let path = args
            .log
            .clone()
            .unwrap_or_else(|| default_log_path(&args.input));
        ProcessingLog::create(&path)?
    };
    log.line(&format!("Processing source: {}", args.input.display()));

    let output = pipeline::run_calculation(&table, &names, &config, &mut log)?;

    // Persist the complete mapping as one batch.
    let out_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    let mut sink = CsvSink::new(&table, &out_path);
    let (hardness_field, confidence_field) = sink.reserve_output_fields();
    log.line("Created fields:");
    log.line(&format!("  Hardness field: {hardness_field}"));
    log.line(&format!("  Confidence field: {confidence_field}"));

    log.line("Applying changes to output...");
    let outcome = sink.write_batch(&output.results)?;
    if outcome.all_applied() {
        log.line("All changes applied successfully");
    } else {
        // Processing already succeeded; persistence may not have. Warn, don't
        // fail the run.
        log.line("Warning: Some changes might not have been applied successfully");
        eprintln!(
            "Warning: {} result(s) could not be applied to '{}'.",
            outcome.unmatched,
            out_path.display()
        );
    }

    if let Some(path) = &args.export_coeffs {
        let report = CoefficientsFile::new(
            config.mode,
            config.linearize,
            output.coefficients,
            output.diagnostic,
            output.extraction.rows_read,
            output.records_fitted(),
        );
        write_coefficients_json(path, &report)?;
    }

    println!("{}", crate::report::format::format_run_summary(&output, &config));
    println!("Output written to '{}'.", out_path.display());

    log.line("Processing completed successfully.");
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let survey = generate_survey(&SampleConfig {
        count: args.count,
        seed: args.seed,
        noise: args.noise,
    })?;
    write_survey_csv(&args.out, &survey)?;
    println!(
        "Wrote {} synthetic records to '{}'.",
        survey.rows.len(),
        args.out.display()
    );
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    // The recommended k2 depends on the ratio form; mirror that in the default.
    let k2 = args
        .k2
        .unwrap_or(if args.linearize { 0.03 } else { 0.5 });

    FitConfig {
        mode: args.mode,
        linearize: args.linearize,
        manual: Coefficients::new(args.k1, k2, args.k3),
        lower_percentile: args.lower_percentile / 100.0,
        upper_percentile: args.upper_percentile / 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Mode;

    fn fit_args(extra: &[&str]) -> FitArgs {
        let mut argv = vec!["hardness", "fit", "--input", "survey.csv"];
        argv.extend_from_slice(extra);
        let cli = crate::cli::Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Command::Fit(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn percentiles_are_converted_to_fractions() {
        let config = fit_config_from_args(&fit_args(&["--mode", "optimized"]));
        assert_eq!(config.mode, Mode::Optimized);
        assert!((config.lower_percentile - 0.05).abs() < 1e-12);
        assert!((config.upper_percentile - 0.95).abs() < 1e-12);
    }

    #[test]
    fn k2_default_follows_linearization() {
        let plain = fit_config_from_args(&fit_args(&[]));
        assert!((plain.manual.k2 - 0.5).abs() < 1e-12);

        let linearized = fit_config_from_args(&fit_args(&["--linearize"]));
        assert!((linearized.manual.k2 - 0.03).abs() < 1e-12);

        let explicit = fit_config_from_args(&fit_args(&["--linearize", "--k2", "0.02"]));
        assert!((explicit.manual.k2 - 0.02).abs() < 1e-12);
    }

    #[test]
    fn manual_defaults_match_recommendations() {
        let config = fit_config_from_args(&fit_args(&[]));
        assert_eq!(config.mode, Mode::Manual);
        assert!((config.manual.k1 - 0.7).abs() < 1e-12);
        assert!((config.manual.k3 - 0.3).abs() < 1e-12);
    }
}
