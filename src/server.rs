//! HTTP API for the TPI backtester
//!
//! Routes:
//! - `GET  /api/fields`   - backtestable return series
//! - `GET  /api/metrics`  - metric labels and explanations
//! - `POST /api/backtest` - run a backtest on an uploaded signal CSV
//! - `POST /api/requests` - forward an indicator request link

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::backtest::runner::{run_backtest_with_source, BacktestReport};
use crate::backtest::types::{BacktestConfig, Metric, MetricsConfig, SimulationConfig};
use crate::config::AppConfig;
use crate::error::{BacktestError, Result};
use crate::provider::{CachedReturnsSource, HttpReturnsSource, ReturnField, ReturnsSource};
use crate::signals::SignalTable;
use crate::submission::{SubmissionClient, SubmissionOutcome};

/// Upload limit for signal CSVs
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

// ============================================================================
// State
// ============================================================================

pub struct AppState {
    pub returns: Arc<dyn ReturnsSource>,
    pub submission: SubmissionClient,
    pub dataset: String,
    pub metrics: MetricsConfig,
}

impl AppState {
    /// Wire the cached HTTP returns source and submission client from config
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = HttpReturnsSource::new(config.data_url.clone(), config.http_timeout)?;
        Ok(Self {
            returns: Arc::new(CachedReturnsSource::new(http, config.cache_ttl)),
            submission: SubmissionClient::new(config.submission_url.clone(), config.http_timeout)?,
            dataset: config.dataset.clone(),
            metrics: config.metrics,
        })
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Maps crate errors onto HTTP statuses with a JSON `{ "error": ... }` body
#[derive(Debug)]
pub struct ApiError(pub BacktestError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            BacktestError::MissingColumns { .. } | BacktestError::SignalTable(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            BacktestError::Fetch(_) => StatusCode::BAD_GATEWAY,
            BacktestError::LengthMismatch { .. } | BacktestError::Config(_) => {
                StatusCode::BAD_REQUEST
            }
            BacktestError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BacktestError> for ApiError {
    fn from(err: BacktestError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!(status = status.as_u16(), error = %self.0, "request failed");
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
struct FieldsResponse {
    dataset: String,
    fields: Vec<ReturnField>,
}

#[derive(Serialize)]
struct MetricInfo {
    metric: Metric,
    label: &'static str,
    description: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRequest {
    pub field: ReturnField,
    /// Raw CSV text with `date` and `tpi` columns
    pub csv: String,
    #[serde(default)]
    pub long_threshold: f64,
    #[serde(default)]
    pub short_threshold: f64,
    #[serde(default = "default_track_long_only")]
    pub track_long_only: bool,
}

fn default_track_long_only() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    pub link: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_fields(State(state): State<Arc<AppState>>) -> Json<FieldsResponse> {
    Json(FieldsResponse {
        dataset: state.dataset.clone(),
        fields: ReturnField::ALL.to_vec(),
    })
}

async fn list_metrics() -> Json<Vec<MetricInfo>> {
    Json(
        Metric::ALL
            .iter()
            .map(|&metric| MetricInfo {
                metric,
                label: metric.label(),
                description: metric.description(),
            })
            .collect(),
    )
}

async fn run_backtest_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BacktestRequest>,
) -> std::result::Result<Json<BacktestReport>, ApiError> {
    let start = Instant::now();

    let table = SignalTable::from_csv_bytes(req.csv)?;
    let config = BacktestConfig {
        simulation: SimulationConfig {
            long_threshold: req.long_threshold,
            short_threshold: req.short_threshold,
            track_long_only: req.track_long_only,
        },
        metrics: state.metrics,
    };

    let report = run_backtest_with_source(
        state.returns.as_ref(),
        &state.dataset,
        req.field,
        &table,
        &config,
    )
    .await?;

    info!(
        field = req.field.as_str(),
        signals = table.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "backtest request served"
    );
    Ok(Json(report))
}

async fn submit_request(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmissionRequest>,
) -> std::result::Result<Json<SubmissionOutcome>, ApiError> {
    let outcome = state.submission.submit(&req.link).await?;
    Ok(Json(outcome))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/fields", get(list_fields))
        .route("/api/metrics", get(list_metrics))
        .route("/api/backtest", post(run_backtest_handler))
        .route("/api/requests", post(submit_request))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;

    struct StaticSource(Vec<f64>);

    #[async_trait]
    impl ReturnsSource for StaticSource {
        async fn fetch(&self, _dataset: &str, _field: ReturnField) -> Result<Vec<f64>> {
            Ok(self.0.clone())
        }
    }

    fn app() -> Router {
        let state = AppState {
            returns: Arc::new(StaticSource(vec![0.10, -0.05, 0.02])),
            submission: SubmissionClient::new("http://127.0.0.1:9", Duration::from_secs(1))
                .unwrap(),
            dataset: "R1".to_string(),
            metrics: MetricsConfig::default(),
        };
        router(Arc::new(state))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_fields() {
        let request = Request::builder().uri("/api/fields").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dataset"], "R1");
        assert_eq!(body["fields"].as_array().unwrap().len(), 8);
        assert_eq!(body["fields"][7], "others.d");
    }

    #[tokio::test]
    async fn test_metrics_catalog() {
        let request = Request::builder().uri("/api/metrics").body(Body::empty()).unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 19);
        assert_eq!(body[0]["label"], "Sharpe Ratio");
    }

    #[tokio::test]
    async fn test_backtest() {
        let request = post_json(
            "/api/backtest",
            json!({ "field": "btc", "csv": "date,tpi\nd1,1\nd2,-1\nd3,0\n" }),
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["curves"]["strategy"].as_array().unwrap().len(), 4);
        let final_equity = body["curves"]["strategy"][3].as_f64().unwrap();
        assert!((final_equity - 1.155).abs() < 1e-12);
        assert_eq!(body["charts"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_backtest_missing_columns() {
        let request = post_json(
            "/api/backtest",
            json!({ "field": "btc", "csv": "day,signal\nd1,1\n" }),
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("'tpi' and 'date'"));
    }

    #[tokio::test]
    async fn test_rejected_request_link() {
        let request = post_json("/api/requests", json!({ "link": "https://example.com" }));
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "rejected");
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (BacktestError::MissingColumns { missing: vec![] }, StatusCode::UNPROCESSABLE_ENTITY),
            (BacktestError::Fetch("down".into()), StatusCode::BAD_GATEWAY),
            (BacktestError::LengthMismatch { equity: 1, benchmark: 2 }, StatusCode::BAD_REQUEST),
            (BacktestError::Config("bad".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }
}
