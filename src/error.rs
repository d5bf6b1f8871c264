//! Error types for the backtester

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors surfaced to callers of the backtester
#[derive(Error, Debug)]
pub enum BacktestError {
    /// Uploaded signal table lacks required columns
    #[error("signal table must contain both 'tpi' and 'date' columns (missing: {})", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("failed to read signal table: {0}")]
    SignalTable(#[from] PolarsError),

    /// Remote returns source unreachable or returned a malformed payload
    #[error("error fetching return data: {0}")]
    Fetch(String),

    #[error("equity curve has {equity} points but benchmark has {benchmark}")]
    LengthMismatch { equity: usize, benchmark: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for BacktestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BacktestError::Fetch(format!("request timed out: {err}"))
        } else if err.is_decode() {
            BacktestError::Fetch(format!("malformed payload: {err}"))
        } else {
            BacktestError::Fetch(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, BacktestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message() {
        let err = BacktestError::MissingColumns {
            missing: vec!["tpi".to_string(), "date".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "signal table must contain both 'tpi' and 'date' columns (missing: tpi, date)"
        );
    }

    #[test]
    fn test_length_mismatch_message() {
        let err = BacktestError::LengthMismatch { equity: 4, benchmark: 3 };
        assert_eq!(err.to_string(), "equity curve has 4 points but benchmark has 3");
    }
}
