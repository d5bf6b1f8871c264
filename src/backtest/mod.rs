// src/backtest/mod.rs
// TPI backtest engine: equity simulation, metrics and report assembly

pub mod types;
pub mod simulator;
pub mod metrics;
pub mod report;
pub mod runner;

// Re-export main types and functions
pub use types::*;
pub use simulator::{simulate, Position};
pub use metrics::{calculate_max_drawdown, compute_metrics, metric_values};
pub use report::{equity_chart, MetricsTable};
pub use runner::{run_backtest, run_backtest_with_source, BacktestReport};
