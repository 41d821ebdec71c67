//! Synthetic survey generation.
//!
//! Produces a CSV-shaped table of E1/E2/PeakSV/Depth rows following a known
//! ground-truth coefficient triple plus Gaussian noise, with a configurable
//! share of deliberately broken rows (missing values, non-positive E1/E2,
//! outlier spikes). Handy for trying the `fit` subcommand without field data
//! and for exercising the Optimized path end to end.
//!
//! Generation is deterministic for a given seed.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;

/// Ground truth used by the generator. Kept inside the recommended manual
/// ranges so Optimized runs on generated data land near it.
const TRUE_K: (f64, f64, f64) = (0.7, 0.5, 0.3);

/// Fraction of rows that get a PeakSV outlier spike.
const OUTLIER_PROB: f64 = 0.03;

/// Fraction of rows that are degraded (zero E2, zero E1, or a blank field).
const DEGRADED_PROB: f64 = 0.08;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
    /// Noise standard deviation applied to the depth column.
    pub noise: f64,
}

/// A generated survey: header plus rows of string cells, ready for CSV.
#[derive(Debug, Clone)]
pub struct SampleSurvey {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn generate_survey(config: &SampleConfig) -> Result<SampleSurvey, AppError> {
    if config.count == 0 {
        return Err(AppError::config("Sample count must be > 0."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::config("Sample noise must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, config.noise.max(1e-12))
        .map_err(|e| AppError::numerical(format!("Noise distribution error: {e}")))?;

    let (k1, k2, k3) = TRUE_K;
    let mut rows = Vec::with_capacity(config.count);

    for _ in 0..config.count {
        let e1: f64 = rng.gen_range(5.0..25.0);
        let e2: f64 = rng.gen_range(1.0..10.0);
        let mut peak_sv: f64 = rng.gen_range(0.5..4.0);

        let roll: f64 = rng.r#gen();
        if roll < OUTLIER_PROB {
            peak_sv *= rng.gen_range(20.0..50.0);
        }

        let ratio = e1 / e2;
        let depth = k1 * e1 + k2 * ratio + k3 * peak_sv + noise.sample(&mut rng);

        let mut row = vec![
            format!("{e1:.3}"),
            format!("{e2:.3}"),
            format!("{peak_sv:.3}"),
            format!("{depth:.3}"),
        ];

        if roll >= OUTLIER_PROB && roll < OUTLIER_PROB + DEGRADED_PROB {
            // Spread degradations across the three interesting failure kinds.
            match (roll * 1000.0) as u64 % 3 {
                0 => row[1] = "0".to_string(),  // e2 = 0: two-term formula
                1 => row[0] = "0".to_string(),  // e1 = 0: null output
                _ => row[3] = String::new(),    // blank depth: skipped in fit
            }
        }

        rows.push(row);
    }

    Ok(SampleSurvey {
        headers: vec![
            "E1".to_string(),
            "E2".to_string(),
            "PeakSV".to_string(),
            "Depth".to_string(),
        ],
        rows,
    })
}

/// Write a generated survey as CSV.
pub fn write_survey_csv(path: &std::path::Path, survey: &SampleSurvey) -> Result<(), AppError> {
    let file = std::fs::File::create(path).map_err(|e| {
        AppError::config(format!(
            "Failed to create sample CSV '{}': {e}",
            path.display()
        ))
    })?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(&survey.headers)
        .map_err(|e| AppError::config(format!("Failed to write sample CSV header: {e}")))?;
    for row in &survey.rows {
        writer
            .write_record(row)
            .map_err(|e| AppError::config(format!("Failed to write sample CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to flush sample CSV: {e}")))?;
    Ok(())
}
