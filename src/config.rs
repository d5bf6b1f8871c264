//! Runtime configuration read from the environment

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::backtest::types::{MetricsConfig, DEFAULT_PERIODS_PER_YEAR};
use crate::error::{BacktestError, Result};

pub const DEFAULT_DATA_URL: &str = "https://script.google.com/macros/s/AKfycbz5mJEV8UeCT4Jn8NAZnj_Poq5OCXQ--E8XNcMK306g8ZDdyFf73p0fMo9YximVmIGK/exec";
pub const DEFAULT_SUBMISSION_URL: &str = "https://script.google.com/macros/s/AKfycbxsxoCpYtdsQYRvPw6sIw8v5E1J0GWk8Uo56pk3946iHcjkiLdHCzCpdzN6BZotH5-b/exec";
pub const DEFAULT_DATASET: &str = "R1";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3030";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Returns document endpoint, queried with `?sheet={dataset}`
    pub data_url: String,
    pub dataset: String,
    pub submission_url: String,
    pub cache_ttl: Duration,
    pub http_timeout: Duration,
    pub bind_addr: SocketAddr,
    pub metrics: MetricsConfig,
}

impl AppConfig {
    /// Load `.env` if present, then read `TPI_*` variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            data_url: text("TPI_DATA_URL", DEFAULT_DATA_URL),
            dataset: text("TPI_DATASET", DEFAULT_DATASET),
            submission_url: text("TPI_SUBMISSION_URL", DEFAULT_SUBMISSION_URL),
            cache_ttl: Duration::from_secs(parse_var(
                &lookup,
                "TPI_CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL_SECS,
            )?),
            http_timeout: Duration::from_secs(parse_var(
                &lookup,
                "TPI_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            bind_addr: match lookup("TPI_BIND_ADDR") {
                Some(raw) => parse_value("TPI_BIND_ADDR", &raw)?,
                None => parse_value("TPI_BIND_ADDR", DEFAULT_BIND_ADDR)?,
            },
            metrics: MetricsConfig {
                risk_free_rate: parse_var(&lookup, "TPI_RISK_FREE_RATE", 0.0)?,
                periods_per_year: parse_var(
                    &lookup,
                    "TPI_PERIODS_PER_YEAR",
                    DEFAULT_PERIODS_PER_YEAR,
                )?,
            },
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| BacktestError::Config(format!("invalid {key}={raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.dataset, "R1");
        assert_eq!(config.cache_ttl, Duration::from_secs(600));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3030");
        assert_eq!(config.metrics, MetricsConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TPI_DATASET", "R2"),
            ("TPI_CACHE_TTL_SECS", "5"),
            ("TPI_BIND_ADDR", "0.0.0.0:8080"),
            ("TPI_RISK_FREE_RATE", "0.04"),
            ("TPI_PERIODS_PER_YEAR", "365"),
        ])
        .unwrap();
        assert_eq!(config.dataset, "R2");
        assert_eq!(config.cache_ttl, Duration::from_secs(5));
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.metrics.risk_free_rate, 0.04);
        assert_eq!(config.metrics.periods_per_year, 365.0);
    }

    #[test]
    fn test_unparseable_value() {
        let err = config_from(&[("TPI_HTTP_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, BacktestError::Config(ref msg) if msg.contains("TPI_HTTP_TIMEOUT_SECS")));
    }
}
