// src/backtest/runner.rs
// Backtest runner - pairs returns with an uploaded signal table and assembles the report

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::backtest::metrics::compute_metrics;
use crate::backtest::report::{equity_chart, MetricsTable};
use crate::backtest::simulator::simulate;
use crate::backtest::types::*;
use crate::error::{BacktestError, Result};
use crate::provider::{ReturnField, ReturnsSource};
use crate::signals::SignalTable;

/// Everything one backtest produces: curves, metrics records, table and charts
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestReport {
    pub dates: Vec<String>,
    pub curves: EquityCurves,
    pub buy_and_hold: PerformanceMetrics,
    pub long_only: Option<PerformanceMetrics>,
    pub strategy: PerformanceMetrics,
    pub table: MetricsTable,
    pub charts: Vec<EquityChart>,
}

impl BacktestReport {
    /// Pretty-printed JSON; encoding failures surface as `Io`
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BacktestError::Io(e.into()))
    }
}

/// Run a full backtest over already-fetched returns.
///
/// Buy-and-hold is measured on its own; long-only and strategy are measured
/// against buy-and-hold.
pub fn run_backtest(
    returns: &[f64],
    table: &SignalTable,
    config: &BacktestConfig,
) -> Result<BacktestReport> {
    let start = Instant::now();

    if returns.len() < table.len() {
        warn!(
            returns = returns.len(),
            signals = table.len(),
            "return series shorter than signal table; equity holds after the last return"
        );
    }

    let curves = simulate(returns, &table.signals, &config.simulation);
    debug!(points = curves.strategy.len(), "equity curves simulated");

    let buy_and_hold = compute_metrics(&curves.buy_and_hold, None, &config.metrics)?;
    let long_only = curves
        .long_only
        .as_deref()
        .map(|curve| compute_metrics(curve, Some(&curves.buy_and_hold), &config.metrics))
        .transpose()?;
    let strategy = compute_metrics(&curves.strategy, Some(&curves.buy_and_hold), &config.metrics)?;

    let metrics_table = MetricsTable::comparison(&buy_and_hold, long_only.as_ref(), &strategy);
    let charts = vec![
        equity_chart(&table.dates, &curves, AxisScale::Linear),
        equity_chart(&table.dates, &curves, AxisScale::Log),
    ];

    info!(
        signals = table.len(),
        strategy_final = curves.strategy.last().copied().unwrap_or(1.0),
        buy_and_hold_final = curves.buy_and_hold.last().copied().unwrap_or(1.0),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "backtest complete"
    );

    Ok(BacktestReport {
        dates: table.dates.clone(),
        curves,
        buy_and_hold,
        long_only,
        strategy,
        table: metrics_table,
        charts,
    })
}

/// Fetch the return series for `field` and run the backtest on it
pub async fn run_backtest_with_source<S>(
    source: &S,
    dataset: &str,
    field: ReturnField,
    table: &SignalTable,
    config: &BacktestConfig,
) -> Result<BacktestReport>
where
    S: ReturnsSource + ?Sized,
{
    let returns = source.fetch(dataset, field).await?;
    info!(dataset, field = field.as_str(), returns = returns.len(), "returns loaded");
    run_backtest(&returns, table, config)
}
