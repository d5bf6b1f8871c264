// src/backtest/types.rs
// Core types for the TPI backtester, shared by the engine, the report and the HTTP API

use serde::{Deserialize, Serialize};

// ============================================================================
// Series
// ============================================================================

/// Fractional period-over-period price changes, paired with signals by position
pub type ReturnSeries = Vec<f64>;

/// Equity values starting at 1.0, one longer than the signal series
pub type EquityCurve = Vec<f64>;

/// Trading periods per year used for annualization
pub const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;

// ============================================================================
// Configuration
// ============================================================================

/// Simulator parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Signals strictly above this go long
    pub long_threshold: f64,
    /// Signals strictly below this go short
    pub short_threshold: f64,
    /// Also produce the long-only curve
    pub track_long_only: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            long_threshold: 0.0,
            short_threshold: 0.0,
            track_long_only: true,
        }
    }
}

/// Metrics engine parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsConfig {
    pub risk_free_rate: f64,
    pub periods_per_year: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
        }
    }
}

/// Everything a single backtest run needs besides the data
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BacktestConfig {
    pub simulation: SimulationConfig,
    pub metrics: MetricsConfig,
}

// ============================================================================
// Simulator output
// ============================================================================

/// The three capital trajectories of one run, index-aligned with each other
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityCurves {
    pub strategy: EquityCurve,
    pub buy_and_hold: EquityCurve,
    /// Present when long-only tracking is enabled
    pub long_only: Option<EquityCurve>,
}

// ============================================================================
// Metrics
// ============================================================================

/// Keys of the metrics record, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    SharpeRatio,
    SortinoRatio,
    OmegaRatio,
    Alpha,
    Beta,
    InformationRatio,
    CalmarRatio,
    ExcessReturn,
    TrackingError,
    MeanReturn,
    StdDev,
    Skewness,
    ExcessKurtosis,
    MaxDrawdown,
    Cagr,
    MeanPositiveReturn,
    StdDevPositiveReturns,
    MeanNegativeReturn,
    StdDevNegativeReturns,
}

impl Metric {
    pub const ALL: [Metric; 19] = [
        Metric::SharpeRatio,
        Metric::SortinoRatio,
        Metric::OmegaRatio,
        Metric::Alpha,
        Metric::Beta,
        Metric::InformationRatio,
        Metric::CalmarRatio,
        Metric::ExcessReturn,
        Metric::TrackingError,
        Metric::MeanReturn,
        Metric::StdDev,
        Metric::Skewness,
        Metric::ExcessKurtosis,
        Metric::MaxDrawdown,
        Metric::Cagr,
        Metric::MeanPositiveReturn,
        Metric::StdDevPositiveReturns,
        Metric::MeanNegativeReturn,
        Metric::StdDevNegativeReturns,
    ];

    /// Row label used in reports
    pub fn label(self) -> &'static str {
        match self {
            Metric::SharpeRatio => "Sharpe Ratio",
            Metric::SortinoRatio => "Sortino Ratio",
            Metric::OmegaRatio => "Omega Ratio",
            Metric::Alpha => "Alpha",
            Metric::Beta => "Beta",
            Metric::InformationRatio => "Information Ratio",
            Metric::CalmarRatio => "Calmar Ratio",
            Metric::ExcessReturn => "Excess Return (Alpha)",
            Metric::TrackingError => "Tracking Error",
            Metric::MeanReturn => "Mean Return (Daily)",
            Metric::StdDev => "Standard Deviation (Daily)",
            Metric::Skewness => "Skewness",
            Metric::ExcessKurtosis => "Excess Kurtosis",
            Metric::MaxDrawdown => "Max Drawdown",
            Metric::Cagr => "CAGR (Annualized Return)",
            Metric::MeanPositiveReturn => "Mean Positive Return (Daily)",
            Metric::StdDevPositiveReturns => "Standard Deviation Positive Returns (Daily)",
            Metric::MeanNegativeReturn => "Mean Negative Return (Daily)",
            Metric::StdDevNegativeReturns => "Standard Deviation Negative Returns (Daily)",
        }
    }

    /// Plain-language explanation shown next to the metrics table
    pub fn description(self) -> &'static str {
        match self {
            Metric::SharpeRatio => {
                "Annualized return above the risk-free rate divided by annualized volatility \
                 of all returns. Higher is better."
            }
            Metric::SortinoRatio => {
                "Like Sharpe, but divides by the volatility of losing periods only, so upside \
                 swings are not penalized. Higher is better."
            }
            Metric::OmegaRatio => {
                "Sum of gains divided by sum of losses around a zero threshold. Higher is better."
            }
            Metric::Alpha => {
                "Annualized return left over after removing the part explained by benchmark \
                 exposure (beta). Higher is better."
            }
            Metric::Beta => {
                "Sensitivity of returns to benchmark moves. 1 tracks the benchmark; above or \
                 below 1 means more or less sensitivity."
            }
            Metric::InformationRatio => {
                "Excess return over the benchmark per unit of tracking error. Higher is better."
            }
            Metric::CalmarRatio => {
                "Annualized return divided by maximum drawdown. Higher is better."
            }
            Metric::ExcessReturn => {
                "Annualized return minus the benchmark's annualized return. Higher is better."
            }
            Metric::TrackingError => {
                "Annualized volatility of the return difference against the benchmark. Lower \
                 means closer alignment with the benchmark."
            }
            Metric::MeanReturn => "Average per-period return. Higher is better.",
            Metric::StdDev => {
                "Per-period volatility of returns. Lower means steadier performance."
            }
            Metric::Skewness => {
                "Asymmetry of the return distribution. Positive values mean a longer right \
                 tail of gains."
            }
            Metric::ExcessKurtosis => {
                "Tail heaviness relative to a normal distribution. Lower means fewer extreme \
                 outcomes."
            }
            Metric::MaxDrawdown => {
                "Largest decline below the running peak, relative to the highest equity \
                 reached. Lower is better."
            }
            Metric::Cagr => {
                "Compounded annual growth rate over the whole period. Higher is better."
            }
            Metric::MeanPositiveReturn => {
                "Average return of periods that gained. Higher is better."
            }
            Metric::StdDevPositiveReturns => {
                "Volatility of gaining periods. Lower means more consistent gains."
            }
            Metric::MeanNegativeReturn => {
                "Average return of periods that lost. Closer to zero is better."
            }
            Metric::StdDevNegativeReturns => {
                "Volatility of losing periods. Lower means more consistent losses."
            }
        }
    }
}

/// Fixed-schema performance record. Undefined statistics are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub omega_ratio: f64,
    pub alpha: f64,
    pub beta: f64,
    pub information_ratio: f64,
    pub calmar_ratio: f64,
    pub excess_return: f64,
    pub tracking_error: f64,
    pub mean_return: f64,
    pub std_dev: f64,
    pub skewness: f64,
    pub excess_kurtosis: f64,
    pub max_drawdown: f64,
    pub cagr: f64,
    pub mean_positive_return: f64,
    pub std_dev_positive_returns: f64,
    pub mean_negative_return: f64,
    pub std_dev_negative_returns: f64,
}

impl PerformanceMetrics {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::SharpeRatio => self.sharpe_ratio,
            Metric::SortinoRatio => self.sortino_ratio,
            Metric::OmegaRatio => self.omega_ratio,
            Metric::Alpha => self.alpha,
            Metric::Beta => self.beta,
            Metric::InformationRatio => self.information_ratio,
            Metric::CalmarRatio => self.calmar_ratio,
            Metric::ExcessReturn => self.excess_return,
            Metric::TrackingError => self.tracking_error,
            Metric::MeanReturn => self.mean_return,
            Metric::StdDev => self.std_dev,
            Metric::Skewness => self.skewness,
            Metric::ExcessKurtosis => self.excess_kurtosis,
            Metric::MaxDrawdown => self.max_drawdown,
            Metric::Cagr => self.cagr,
            Metric::MeanPositiveReturn => self.mean_positive_return,
            Metric::StdDevPositiveReturns => self.std_dev_positive_returns,
            Metric::MeanNegativeReturn => self.mean_negative_return,
            Metric::StdDevNegativeReturns => self.std_dev_negative_returns,
        }
    }

    /// (metric, value) pairs in display order
    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        Metric::ALL.iter().map(move |&m| (m, self.get(m)))
    }

    /// Bitwise equality, treating identical NaNs as equal
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.iter()
            .zip(other.iter())
            .all(|((_, a), (_, b))| a.to_bits() == b.to_bits())
    }
}

// ============================================================================
// Chart payloads
// ============================================================================

/// A point on an equity curve, labelled by the signal's date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: String,
    pub equity: f64,
}

/// Y-axis scale requested by the chart consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisScale {
    Linear,
    Log,
}

impl AxisScale {
    pub fn title_suffix(self) -> &'static str {
        match self {
            AxisScale::Linear => "(Linear Scale)",
            AxisScale::Log => "(Log Scale)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<EquityPoint>,
}

/// One equity comparison chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityChart {
    pub title: String,
    pub y_axis: AxisScale,
    pub series: Vec<ChartSeries>,
}
