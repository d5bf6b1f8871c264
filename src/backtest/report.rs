// src/backtest/report.rs
// Side-by-side metrics table and equity chart payloads

use std::fmt;

use serde::Serialize;

use crate::backtest::types::{
    AxisScale, ChartSeries, EquityChart, EquityCurves, EquityPoint, Metric, PerformanceMetrics,
};

/// Decimal places used when rendering metric values
pub const DISPLAY_PRECISION: usize = 4;

pub const BUY_AND_HOLD_COLUMN: &str = "Buy & Hold Metrics";
pub const LONG_ONLY_COLUMN: &str = "Long-Only Metrics";
pub const STRATEGY_COLUMN: &str = "Strategy Metrics";

/// Render one metric value at display precision
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.*}", DISPLAY_PRECISION, value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRow {
    pub metric: Metric,
    pub label: &'static str,
    pub values: Vec<f64>,
    pub formatted: Vec<String>,
}

/// Metrics records laid out for side-by-side comparison
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsTable {
    pub columns: Vec<String>,
    pub rows: Vec<MetricsRow>,
}

impl MetricsTable {
    /// Build a table from named columns; rows follow `Metric::ALL`
    pub fn new(columns: &[(&str, &PerformanceMetrics)]) -> Self {
        let rows = Metric::ALL
            .iter()
            .map(|&metric| {
                let values: Vec<f64> = columns.iter().map(|(_, m)| m.get(metric)).collect();
                let formatted = values.iter().map(|&v| format_value(v)).collect();
                MetricsRow {
                    metric,
                    label: metric.label(),
                    values,
                    formatted,
                }
            })
            .collect();

        Self {
            columns: columns.iter().map(|(name, _)| name.to_string()).collect(),
            rows,
        }
    }

    /// Standard layout: buy-and-hold, long-only (when tracked), strategy
    pub fn comparison(
        buy_and_hold: &PerformanceMetrics,
        long_only: Option<&PerformanceMetrics>,
        strategy: &PerformanceMetrics,
    ) -> Self {
        let mut columns = vec![(BUY_AND_HOLD_COLUMN, buy_and_hold)];
        if let Some(long_only) = long_only {
            columns.push((LONG_ONLY_COLUMN, long_only));
        }
        columns.push((STRATEGY_COLUMN, strategy));
        Self::new(&columns)
    }
}

impl fmt::Display for MetricsTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self.rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
        let col_width = self
            .columns
            .iter()
            .map(|c| c.len())
            .chain(self.rows.iter().flat_map(|r| r.formatted.iter().map(|s| s.len())))
            .max()
            .unwrap_or(0);

        write!(f, "{:<label_width$}", "")?;
        for column in &self.columns {
            write!(f, "  {:>col_width$}", column)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "─".repeat(label_width + self.columns.len() * (col_width + 2)))?;

        for row in &self.rows {
            write!(f, "{:<label_width$}", row.label)?;
            for cell in &row.formatted {
                write!(f, "  {:>col_width$}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Chart of the three equity curves against the signal dates.
///
/// Points pair `dates[i]` with `curve[i + 1]`, dropping the initial 1.0 sentinel.
pub fn equity_chart(dates: &[String], curves: &EquityCurves, scale: AxisScale) -> EquityChart {
    let mut series = vec![chart_series("Strategy Equity", dates, &curves.strategy)];
    if let Some(long_only) = &curves.long_only {
        series.push(chart_series("Long-Only Equity", dates, long_only));
    }
    series.push(chart_series("Buy and Hold Equity", dates, &curves.buy_and_hold));

    EquityChart {
        title: format!(
            "Strategy Equity vs. Buy and Hold Over Time {}",
            scale.title_suffix()
        ),
        y_axis: scale,
        series,
    }
}

fn chart_series(name: &str, dates: &[String], curve: &[f64]) -> ChartSeries {
    let points = dates
        .iter()
        .zip(curve.iter().skip(1))
        .map(|(date, &equity)| EquityPoint {
            date: date.clone(),
            equity,
        })
        .collect();
    ChartSeries {
        name: name.to_string(),
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::metrics::compute_metrics;
    use crate::backtest::types::MetricsConfig;

    fn sample_metrics() -> PerformanceMetrics {
        compute_metrics(&[1.0, 1.1, 1.05, 1.2], None, &MetricsConfig::default()).unwrap()
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1.23456), "1.2346");
        assert_eq!(format_value(-0.5), "-0.5000");
        assert_eq!(format_value(f64::NAN), "NaN");
    }

    #[test]
    fn test_comparison_columns() {
        let m = sample_metrics();
        let with_long = MetricsTable::comparison(&m, Some(&m), &m);
        assert_eq!(
            with_long.columns,
            vec![BUY_AND_HOLD_COLUMN, LONG_ONLY_COLUMN, STRATEGY_COLUMN]
        );
        assert_eq!(with_long.rows.len(), 19);
        assert!(with_long.rows.iter().all(|r| r.values.len() == 3));

        let without_long = MetricsTable::comparison(&m, None, &m);
        assert_eq!(without_long.columns, vec![BUY_AND_HOLD_COLUMN, STRATEGY_COLUMN]);
    }

    #[test]
    fn test_display_renders_every_metric() {
        let m = sample_metrics();
        let text = MetricsTable::comparison(&m, None, &m).to_string();
        for metric in Metric::ALL {
            assert!(text.contains(metric.label()), "missing {}", metric.label());
        }
        assert!(text.contains("NaN"));
        assert!(text.contains(&format_value(m.sharpe_ratio)));
    }

    #[test]
    fn test_equity_chart_drops_sentinel() {
        let dates = vec!["d1".to_string(), "d2".to_string()];
        let curves = EquityCurves {
            strategy: vec![1.0, 1.1, 1.2],
            buy_and_hold: vec![1.0, 0.9, 1.0],
            long_only: None,
        };
        let chart = equity_chart(&dates, &curves, AxisScale::Log);
        assert_eq!(chart.title, "Strategy Equity vs. Buy and Hold Over Time (Log Scale)");
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name, "Strategy Equity");
        assert_eq!(chart.series[0].points[0], EquityPoint { date: "d1".into(), equity: 1.1 });
        assert_eq!(chart.series[1].points[1].equity, 1.0);
    }
}
