// src/backtest/simulator.rs
// Equity simulation: walks signals and returns to build capital trajectories

use crate::backtest::types::{EquityCurves, SimulationConfig};

/// Position implied by one signal reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Long,
    Short,
    Flat,
}

impl Position {
    /// Classify a signal against the threshold pair.
    /// The neutral band is inclusive on both ends; NaN signals are flat.
    pub fn from_signal(signal: f64, config: &SimulationConfig) -> Self {
        if signal > config.long_threshold {
            Position::Long
        } else if signal < config.short_threshold {
            Position::Short
        } else {
            Position::Flat
        }
    }
}

/// Simulate strategy, buy-and-hold and (optionally) long-only equity curves.
///
/// Signals and returns are paired by position. Every curve starts at 1.0 and has
/// `signals.len() + 1` points; once `returns` runs out, all curves hold their
/// last value. Never fails.
pub fn simulate(returns: &[f64], signals: &[f64], config: &SimulationConfig) -> EquityCurves {
    let n = signals.len();
    let mut strategy = Vec::with_capacity(n + 1);
    let mut buy_and_hold = Vec::with_capacity(n + 1);
    let mut long_only = config.track_long_only.then(|| Vec::with_capacity(n + 1));

    let mut strategy_equity = 1.0;
    let mut bah_equity = 1.0;
    let mut long_equity = 1.0;

    strategy.push(strategy_equity);
    buy_and_hold.push(bah_equity);
    if let Some(curve) = long_only.as_mut() {
        curve.push(long_equity);
    }

    for (i, &signal) in signals.iter().enumerate() {
        if let Some(&r) = returns.get(i) {
            match Position::from_signal(signal, config) {
                Position::Long => {
                    strategy_equity *= 1.0 + r;
                    long_equity *= 1.0 + r;
                }
                Position::Short => {
                    strategy_equity *= 1.0 - r;
                }
                Position::Flat => {}
            }
            bah_equity *= 1.0 + r;
        }

        strategy.push(strategy_equity);
        buy_and_hold.push(bah_equity);
        if let Some(curve) = long_only.as_mut() {
            curve.push(long_equity);
        }
    }

    EquityCurves {
        strategy,
        buy_and_hold,
        long_only,
    }
}
