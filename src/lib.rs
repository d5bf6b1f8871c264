//! # TPI Backtest
//!
//! Backtests a Trend Position Indicator (TPI) signal series against daily returns.
//!
//! ## Features
//! - Long / short / flat equity simulation with a configurable neutral band
//! - Buy-and-hold and long-only reference curves
//! - 19 performance metrics, benchmark-relative where a benchmark is given
//! - Remote returns provider with TTL caching, HTTP API and CLI
//! - Compiles the core to WASM behind the `wasm` feature
//!
//! ## Example
//! ```
//! use tpi_backtest::{simulate, compute_metrics, MetricsConfig, SimulationConfig};
//!
//! let returns = vec![0.10, -0.05, 0.02];
//! let signals = vec![1.0, -1.0, 0.0];
//!
//! let curves = simulate(&returns, &signals, &SimulationConfig::default());
//! let metrics = compute_metrics(
//!     &curves.strategy,
//!     Some(&curves.buy_and_hold),
//!     &MetricsConfig::default(),
//! ).unwrap();
//! assert!((curves.strategy[3] - 1.155).abs() < 1e-12);
//! assert!(metrics.beta.is_finite());
//! ```

pub mod common;
pub mod error;
pub mod config;
pub mod signals;
pub mod provider;
pub mod submission;
pub mod server;
pub mod backtest;

// Re-export commonly used items at crate root
pub use backtest::{
    compute_metrics, run_backtest, simulate, BacktestConfig, BacktestReport, EquityCurves,
    Metric, MetricsConfig, PerformanceMetrics, SimulationConfig,
};
pub use error::{BacktestError, Result};
pub use provider::{ReturnField, ReturnsSource};
pub use signals::SignalTable;

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

/// WASM bindings for browser/Node.js use
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct Backtest;

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl Backtest {
    /// Strategy equity curve for the given thresholds
    #[wasm_bindgen]
    pub fn strategy_equity(
        returns: &[f64],
        signals: &[f64],
        long_threshold: f64,
        short_threshold: f64,
    ) -> Vec<f64> {
        let config = SimulationConfig {
            long_threshold,
            short_threshold,
            track_long_only: false,
        };
        simulate(returns, signals, &config).strategy
    }

    #[wasm_bindgen]
    pub fn buy_and_hold_equity(returns: &[f64], signals: &[f64]) -> Vec<f64> {
        let config = SimulationConfig { track_long_only: false, ..Default::default() };
        simulate(returns, signals, &config).buy_and_hold
    }

    #[wasm_bindgen]
    pub fn long_only_equity(
        returns: &[f64],
        signals: &[f64],
        long_threshold: f64,
        short_threshold: f64,
    ) -> Vec<f64> {
        let config = SimulationConfig {
            long_threshold,
            short_threshold,
            track_long_only: true,
        };
        simulate(returns, signals, &config).long_only.unwrap_or_default()
    }

    /// Metric values in `Metric::ALL` order; an empty benchmark means none.
    /// Throws when a non-empty benchmark's length differs from the equity curve.
    #[wasm_bindgen]
    pub fn metrics(
        equity: &[f64],
        benchmark: &[f64],
        risk_free_rate: f64,
        periods_per_year: f64,
    ) -> std::result::Result<Vec<f64>, JsValue> {
        let config = MetricsConfig { risk_free_rate, periods_per_year };
        backtest::metrics::metric_values(equity, benchmark, &config)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen]
    pub fn metric_labels() -> Vec<String> {
        Metric::ALL.iter().map(|m| m.label().to_string()).collect()
    }
}
