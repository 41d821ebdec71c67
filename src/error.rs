#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Rejected configuration (bad percentile range, non-numeric manual
    /// coefficients, missing columns). Raised before any record is processed.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// No usable records remain after extraction.
    pub fn no_data(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    /// Numerical failure (non-convergent or under-determined solve, degenerate
    /// normalization). Aborts the run; there is no coefficient fallback.
    pub fn numerical(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
