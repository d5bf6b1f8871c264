//! Daily return series providers
//!
//! Return series live in a remote JSON document keyed by field name. The HTTP
//! source fetches that document per dataset, the file source reads the same shape
//! from disk, and `CachedReturnsSource` memoizes either one for a fixed TTL.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{BacktestError, Result};

// ============================================================================
// Fields
// ============================================================================

/// Return series that can be backtested against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnField {
    #[serde(rename = "total")]
    Total,
    #[serde(rename = "btc")]
    Btc,
    #[serde(rename = "eth")]
    Eth,
    #[serde(rename = "sol")]
    Sol,
    #[serde(rename = "ethbtc")]
    EthBtc,
    #[serde(rename = "solbtc")]
    SolBtc,
    #[serde(rename = "soleth")]
    SolEth,
    #[serde(rename = "others.d")]
    OthersDominance,
}

impl ReturnField {
    pub const ALL: [ReturnField; 8] = [
        ReturnField::Total,
        ReturnField::Btc,
        ReturnField::Eth,
        ReturnField::Sol,
        ReturnField::EthBtc,
        ReturnField::SolBtc,
        ReturnField::SolEth,
        ReturnField::OthersDominance,
    ];

    /// Key of this series in the returns document
    pub fn as_str(self) -> &'static str {
        match self {
            ReturnField::Total => "total",
            ReturnField::Btc => "btc",
            ReturnField::Eth => "eth",
            ReturnField::Sol => "sol",
            ReturnField::EthBtc => "ethbtc",
            ReturnField::SolBtc => "solbtc",
            ReturnField::SolEth => "soleth",
            ReturnField::OthersDominance => "others.d",
        }
    }
}

impl fmt::Display for ReturnField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReturnField {
    type Err = BacktestError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| BacktestError::Config(format!("unknown return field '{s}'")))
    }
}

// ============================================================================
// Sources
// ============================================================================

#[async_trait]
pub trait ReturnsSource: Send + Sync {
    /// Fetch the return series for `field` from `dataset`
    async fn fetch(&self, dataset: &str, field: ReturnField) -> Result<Vec<f64>>;
}

/// Pull one series out of a returns document.
/// Numeric strings are accepted; anything else non-numeric becomes NaN.
pub fn extract_series(document: &Value, field: ReturnField) -> Result<Vec<f64>> {
    let series = document.get(field.as_str()).ok_or_else(|| {
        BacktestError::Fetch(format!("field '{field}' not present in returns payload"))
    })?;
    let values = series.as_array().ok_or_else(|| {
        BacktestError::Fetch(format!("field '{field}' is not an array"))
    })?;

    Ok(values
        .iter()
        .map(|v| match v {
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
            _ => f64::NAN,
        })
        .collect())
}

/// Fetches `GET {base_url}?sheet={dataset}` and reads the field from the JSON body
pub struct HttpReturnsSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReturnsSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ReturnsSource for HttpReturnsSource {
    async fn fetch(&self, dataset: &str, field: ReturnField) -> Result<Vec<f64>> {
        debug!(url = %self.base_url, dataset, %field, "fetching returns");
        let document: Value = self
            .client
            .get(&self.base_url)
            .query(&[("sheet", dataset)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        extract_series(&document, field)
    }
}

/// Reads a returns document from disk; the dataset name is ignored
pub struct JsonFileReturnsSource {
    path: PathBuf,
}

impl JsonFileReturnsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReturnsSource for JsonFileReturnsSource {
    async fn fetch(&self, _dataset: &str, field: ReturnField) -> Result<Vec<f64>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            BacktestError::Fetch(format!("cannot read {}: {e}", self.path.display()))
        })?;
        let document: Value = serde_json::from_slice(&bytes)
            .map_err(|e| BacktestError::Fetch(format!("malformed payload: {e}")))?;
        extract_series(&document, field)
    }
}

// ============================================================================
// Cache
// ============================================================================

struct CacheEntry {
    fetched_at: Instant,
    values: Vec<f64>,
}

/// TTL memoization over another source, keyed by (dataset, field).
/// Failed fetches are not cached.
pub struct CachedReturnsSource<S> {
    inner: S,
    ttl: Duration,
    entries: Mutex<HashMap<(String, ReturnField), CacheEntry>>,
}

impl<S: ReturnsSource> CachedReturnsSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lookup(&self, key: &(String, ReturnField)) -> Option<Vec<f64>> {
        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.values.clone())
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[async_trait]
impl<S: ReturnsSource> ReturnsSource for CachedReturnsSource<S> {
    async fn fetch(&self, dataset: &str, field: ReturnField) -> Result<Vec<f64>> {
        let key = (dataset.to_string(), field);
        if let Some(values) = self.lookup(&key) {
            debug!(dataset, %field, "returns cache hit");
            return Ok(values);
        }

        let values = match self.inner.fetch(dataset, field).await {
            Ok(values) => values,
            Err(err) => {
                warn!(dataset, %field, error = %err, "returns fetch failed");
                return Err(err);
            }
        };
        info!(dataset, %field, len = values.len(), "returns cached");

        self.entries.lock().insert(
            key,
            CacheEntry {
                fetched_at: Instant::now(),
                values: values.clone(),
            },
        );
        Ok(values)
    }
}
