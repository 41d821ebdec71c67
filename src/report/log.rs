//! Append-only processing log.
//!
//! Every line is prefixed with a local timestamp:
//!
//! ```text
//! [2026-08-06 14:02:11] Optimized Mode Selected
//! ```
//!
//! The log is purely informational and is never read back by the pipeline, so
//! write failures are swallowed: observability must not be able to fail a run
//! that is otherwise succeeding.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::AppError;

pub struct ProcessingLog {
    file: Option<File>,
}

impl ProcessingLog {
    /// Create (truncate) the log file and write the banner.
    pub fn create(path: &Path) -> Result<Self, AppError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| {
                AppError::config(format!(
                    "Failed to create processing log '{}': {e}",
                    path.display()
                ))
            })?;

        let mut log = Self { file: Some(file) };
        log.raw("Hardness Calculator Processing Log\n");
        log.raw("===================================\n\n");
        Ok(log)
    }

    /// A log that discards everything (tests, `--no-log`).
    pub fn disabled() -> Self {
        Self { file: None }
    }

    /// Append one timestamped line.
    pub fn line(&mut self, content: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        self.raw(&format!("[{timestamp}] {content}\n"));
    }

    /// Append a multi-line block, timestamping each line.
    pub fn block(&mut self, content: &str) {
        for line in content.lines() {
            self.line(line);
        }
    }

    fn raw(&mut self, content: &str) {
        if let Some(file) = self.file.as_mut() {
            let _ = file.write_all(content.as_bytes());
        }
    }
}

/// Default log path: `<input stem>_hardness_processing.txt` next to the input.
pub fn default_log_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "hardness".to_string());
    input.with_file_name(format!("{stem}_hardness_processing.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_path_derives_from_input() {
        let path = default_log_path(Path::new("/data/survey.csv"));
        assert_eq!(
            path,
            PathBuf::from("/data/survey_hardness_processing.txt")
        );
    }

    #[test]
    fn disabled_log_accepts_lines_silently() {
        let mut log = ProcessingLog::disabled();
        log.line("nothing happens");
        log.block("a\nb\nc");
    }

    #[test]
    fn created_log_contains_banner_and_timestamped_lines() {
        let path = std::env::temp_dir().join("hardness_calc_log_test.txt");
        {
            let mut log = ProcessingLog::create(&path).unwrap();
            log.line("Processing layer: survey");
        }

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Hardness Calculator Processing Log\n"));
        assert!(written.contains("] Processing layer: survey\n"));
        let _ = std::fs::remove_file(&path);
    }
}
