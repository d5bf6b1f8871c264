//! Uploaded TPI signal tables
//!
//! A signal table is a CSV with at least a numeric `tpi` column and a `date` label
//! column. Dates are kept verbatim for display and never parsed.

use std::io::Cursor;
use std::path::Path;

use polars::prelude::*;

use crate::error::{BacktestError, Result};

pub const SIGNAL_COLUMN: &str = "tpi";
pub const DATE_COLUMN: &str = "date";

/// Signal readings with their display labels, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalTable {
    pub dates: Vec<String>,
    pub signals: Vec<f64>,
}

impl SignalTable {
    pub fn new(dates: Vec<String>, signals: Vec<f64>) -> Self {
        Self { dates, signals }
    }

    /// Parse CSV text or bytes
    pub fn from_csv_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .into_reader_with_file_handle(Cursor::new(bytes.into()))
            .finish()?;
        Self::from_frame(&df)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_csv_bytes(bytes)
    }

    /// Extract `tpi` and `date` from a loaded frame.
    /// Unparseable signals become NaN; missing dates become empty labels.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let missing: Vec<String> = [SIGNAL_COLUMN, DATE_COLUMN]
            .iter()
            .filter(|name| df.get_column_index(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(BacktestError::MissingColumns { missing });
        }

        let tpi = df
            .column(SIGNAL_COLUMN)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let signals: Vec<f64> = tpi
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();

        let date = df
            .column(DATE_COLUMN)?
            .as_materialized_series()
            .cast(&DataType::String)?;
        let dates: Vec<String> = date
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect();

        Ok(Self { dates, signals })
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_signals_and_dates() {
        let csv = "date,tpi\n2024-01-01,0.5\n2024-01-02,-0.25\n2024-01-03,0\n";
        let table = SignalTable::from_csv_bytes(csv).unwrap();
        assert_eq!(table.dates, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(table.signals, vec![0.5, -0.25, 0.0]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let csv = "time,date,close,tpi\n1,a,100.0,1\n2,b,101.0,-1\n";
        let table = SignalTable::from_csv_bytes(csv).unwrap();
        assert_eq!(table.signals, vec![1.0, -1.0]);
        assert_eq!(table.dates, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_tpi_column() {
        let csv = "date,signal\n2024-01-01,1\n";
        let err = SignalTable::from_csv_bytes(csv).unwrap_err();
        match err {
            BacktestError::MissingColumns { missing } => assert_eq!(missing, vec!["tpi"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_both_columns() {
        let csv = "a,b\n1,2\n";
        let err = SignalTable::from_csv_bytes(csv).unwrap_err();
        assert!(matches!(
            err,
            BacktestError::MissingColumns { ref missing } if missing.len() == 2
        ));
    }

    #[test]
    fn test_blank_signal_is_nan() {
        let csv = "date,tpi\nd1,1.5\nd2,\n";
        let table = SignalTable::from_csv_bytes(csv).unwrap();
        assert_eq!(table.signals[0], 1.5);
        assert!(table.signals[1].is_nan());
    }
}
