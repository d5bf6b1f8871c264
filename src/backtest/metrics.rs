// src/backtest/metrics.rs
// Performance metrics calculation

use crate::backtest::types::{MetricsConfig, PerformanceMetrics};
use crate::common::{
    central_moment, max, mean, pct_change, running_max, safe_div, sample_covariance,
    split_signs, std_dev, sum, variance,
};
use crate::error::{BacktestError, Result};

/// Benchmark-relative statistics
struct RelativeStats {
    alpha: f64,
    beta: f64,
    excess_return: f64,
    tracking_error: f64,
    information_ratio: f64,
}

impl RelativeStats {
    fn undefined() -> Self {
        Self {
            alpha: f64::NAN,
            beta: f64::NAN,
            excess_return: f64::NAN,
            tracking_error: f64::NAN,
            information_ratio: f64::NAN,
        }
    }
}

/// Calculate all performance metrics for an equity curve.
///
/// `benchmark`, when given, must have the same length as `equity`; a mismatch is
/// rejected rather than truncated. Undefined statistics come back as NaN.
pub fn compute_metrics(
    equity: &[f64],
    benchmark: Option<&[f64]>,
    config: &MetricsConfig,
) -> Result<PerformanceMetrics> {
    if let Some(bench) = benchmark {
        if bench.len() != equity.len() {
            return Err(BacktestError::LengthMismatch {
                equity: equity.len(),
                benchmark: bench.len(),
            });
        }
    }

    let periods = config.periods_per_year;
    let rf = config.risk_free_rate;
    let returns = pct_change(equity);

    // Subset statistics default to 0 when a side is empty
    let (positive, negative) = split_signs(&returns);
    let (mean_positive, std_positive) = subset_stats(&positive);
    let (mean_negative, std_negative) = subset_stats(&negative);

    let mean_return = mean(&returns);
    let std_dev_return = std_dev(&returns);

    let annualized_mean = mean_return * periods;
    let annualized_std = std_dev_return * periods.sqrt();

    // Sortino falls back to a unit denominator when nothing lost
    let sortino_denominator = if negative.is_empty() { 1.0 } else { std_dev(&negative) };
    let annualized_sortino_denominator = sortino_denominator * periods.sqrt();

    let sharpe_ratio = safe_div(annualized_mean - rf, annualized_std);
    let sortino_ratio = safe_div(annualized_mean - rf, annualized_sortino_denominator);

    let losses: f64 = -sum(&negative);
    let omega_ratio = safe_div(sum(&positive), losses);

    let relative = match benchmark {
        Some(bench) => relative_stats(&returns, &pct_change(bench), annualized_mean, config),
        None => RelativeStats::undefined(),
    };

    let max_drawdown = calculate_max_drawdown(equity);
    let calmar_ratio = safe_div(annualized_mean, max_drawdown);

    Ok(PerformanceMetrics {
        sharpe_ratio,
        sortino_ratio,
        omega_ratio,
        alpha: relative.alpha,
        beta: relative.beta,
        information_ratio: relative.information_ratio,
        calmar_ratio,
        excess_return: relative.excess_return,
        tracking_error: relative.tracking_error,
        mean_return,
        std_dev: std_dev_return,
        skewness: skewness(&returns),
        excess_kurtosis: excess_kurtosis(&returns),
        max_drawdown,
        cagr: calculate_cagr(equity, returns.len(), periods),
        mean_positive_return: mean_positive,
        std_dev_positive_returns: std_positive,
        mean_negative_return: mean_negative,
        std_dev_negative_returns: std_negative,
    })
}

/// Metric values in `Metric::ALL` order, for flat-array consumers.
/// An empty `benchmark` means none; a non-empty one of the wrong length is an error.
pub fn metric_values(
    equity: &[f64],
    benchmark: &[f64],
    config: &MetricsConfig,
) -> Result<Vec<f64>> {
    let benchmark = (!benchmark.is_empty()).then_some(benchmark);
    let metrics = compute_metrics(equity, benchmark, config)?;
    Ok(metrics.iter().map(|(_, value)| value).collect())
}

/// Mean and population standard deviation, both 0 for an empty subset
fn subset_stats(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        (0.0, 0.0)
    } else {
        (mean(values), std_dev(values))
    }
}

fn relative_stats(
    returns: &[f64],
    benchmark_returns: &[f64],
    annualized_mean: f64,
    config: &MetricsConfig,
) -> RelativeStats {
    let periods = config.periods_per_year;
    let rf = config.risk_free_rate;

    let beta = calculate_beta(returns, benchmark_returns);
    let annualized_benchmark_mean = mean(benchmark_returns) * periods;
    let alpha = (annualized_mean - rf) - beta * (annualized_benchmark_mean - rf);

    let excess_return = annualized_mean - annualized_benchmark_mean;
    let active: Vec<f64> = returns
        .iter()
        .zip(benchmark_returns)
        .map(|(r, b)| r - b)
        .collect();
    let tracking_error = std_dev(&active) * periods.sqrt();
    let information_ratio = safe_div(excess_return, tracking_error);

    RelativeStats {
        alpha,
        beta,
        excess_return,
        tracking_error,
        information_ratio,
    }
}

/// Beta relative to benchmark: sample covariance over population variance
fn calculate_beta(returns: &[f64], benchmark: &[f64]) -> f64 {
    safe_div(sample_covariance(returns, benchmark), variance(benchmark))
}

/// Largest decline below the running peak, normalized by the global peak
pub fn calculate_max_drawdown(equity: &[f64]) -> f64 {
    if equity.is_empty() {
        return f64::NAN;
    }
    let peaks = running_max(equity);
    let deepest = peaks
        .iter()
        .zip(equity)
        .map(|(peak, value)| peak - value)
        .fold(f64::NEG_INFINITY, f64::max);
    safe_div(deepest, max(&peaks))
}

/// Compound annual growth rate over `periods_observed` returns
fn calculate_cagr(equity: &[f64], periods_observed: usize, periods_per_year: f64) -> f64 {
    match (equity.first(), equity.last()) {
        (Some(&first), Some(&last)) if periods_observed > 0 => {
            (last / first).powf(periods_per_year / periods_observed as f64) - 1.0
        }
        _ => f64::NAN,
    }
}

/// Population skewness m3 / m2^1.5
fn skewness(returns: &[f64]) -> f64 {
    let m2 = central_moment(returns, 2);
    safe_div(central_moment(returns, 3), m2.powf(1.5))
}

/// Population excess kurtosis m4 / m2^2 - 3
fn excess_kurtosis(returns: &[f64]) -> f64 {
    let m2 = central_moment(returns, 2);
    safe_div(central_moment(returns, 4), m2 * m2) - 3.0
}
