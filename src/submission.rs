//! Indicator request forwarding
//!
//! Users submit a link to a TradingView indicator they want ported. Links that do
//! not point at tradingview.com are rejected locally; the rest are posted as
//! `{"link": ...}` to the request-collection endpoint and its reply is returned.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::error::Result;

pub const REQUIRED_DOMAIN: &str = "tradingview.com";

/// Result of one submission attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SubmissionOutcome {
    /// Forwarded; `response` is the endpoint's raw body
    Accepted { response: String },
    Rejected { warning: String },
}

/// Case-insensitive check for the indicator host
pub fn is_indicator_link(link: &str) -> bool {
    link.to_ascii_lowercase().contains(REQUIRED_DOMAIN)
}

pub struct SubmissionClient {
    client: reqwest::Client,
    endpoint: String,
}

impl SubmissionClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub async fn submit(&self, link: &str) -> Result<SubmissionOutcome> {
        if !is_indicator_link(link) {
            warn!(link, "rejected indicator request");
            return Ok(SubmissionOutcome::Rejected {
                warning: format!(
                    "Please enter a valid TradingView Indicator link containing '{REQUIRED_DOMAIN}'."
                ),
            });
        }

        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "link": link }))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        info!(link, "indicator request forwarded");
        Ok(SubmissionOutcome::Accepted { response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BacktestError;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_link_check_is_case_insensitive() {
        assert!(is_indicator_link("https://www.TradingView.com/script/abc/"));
        assert!(!is_indicator_link("https://example.com/script"));
        assert!(!is_indicator_link(""));
    }

    #[tokio::test]
    async fn test_valid_link_is_forwarded() {
        let server = MockServer::start().await;
        let link = "https://www.tradingview.com/script/3KHj53H2-BacktestLibrary/";
        Mock::given(method("POST"))
            .and(body_json(json!({ "link": link })))
            .respond_with(ResponseTemplate::new(200).set_body_string("Success"))
            .expect(1)
            .mount(&server)
            .await;

        let client = SubmissionClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let outcome = client.submit(link).await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::Accepted { response: "Success".into() });
    }

    #[tokio::test]
    async fn test_invalid_link_never_leaves_the_process() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = SubmissionClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let outcome = client.submit("https://example.com/x").await.unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_endpoint_failure_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = SubmissionClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let err = client.submit("tradingview.com/script/x").await.unwrap_err();
        assert!(matches!(err, BacktestError::Fetch(_)));
    }

    #[test]
    fn test_outcome_json_shape() {
        let json = serde_json::to_value(SubmissionOutcome::Accepted { response: "ok".into() }).unwrap();
        assert_eq!(json, json!({ "status": "accepted", "response": "ok" }));
    }
}
