use super::{EmissionSubmitter, SubmissionResponse};
use crate::error::{CarbonImportError, Result};
use async_trait::async_trait;
use carbon_import_common::EmissionCandidate;
use serde::Deserialize;
use std::time::Duration;

const EMISSIONS_PATH: &str = "api/emissions";

/// Body of `POST /api/emissions` responses (201 and error alike)
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EmissionApiBody {
    message: Option<String>,
    record_id: Option<String>,
    co2_equivalent: Option<f64>,
}

/// Submits records to the emissions REST API
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl HttpSubmitter {
    pub fn new(base_url: &str, token: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds.max(1)))
            .build()
            .map_err(|e| CarbonImportError::ApiCall(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: emissions_endpoint(base_url),
            token: token.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn emissions_endpoint(base_url: &str) -> String {
    if base_url.ends_with('/') {
        format!("{}{}", base_url, EMISSIONS_PATH)
    } else {
        format!("{}/{}", base_url, EMISSIONS_PATH)
    }
}

#[async_trait]
impl EmissionSubmitter for HttpSubmitter {
    async fn submit(&self, candidate: &EmissionCandidate) -> Result<SubmissionResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(candidate)
            .send()
            .await
            .map_err(|e| CarbonImportError::ApiCall(format!("request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CarbonImportError::ApiCall(format!("failed to read response: {}", e)))?;

        if status.is_success() {
            let body: EmissionApiBody = serde_json::from_str(&text).map_err(|e| {
                CarbonImportError::ApiCall(format!("invalid response body (HTTP {}): {}", status.as_u16(), e))
            })?;
            if body.co2_equivalent.is_none() {
                tracing::warn!(category = candidate.category(), "response has no co2_equivalent");
            }
            tracing::debug!(
                category = candidate.category(),
                record_id = body.record_id.as_deref().unwrap_or("-"),
                "emission record created"
            );
            let message = body
                .message
                .unwrap_or_else(|| "Emission record added successfully".to_string());
            return Ok(SubmissionResponse::accepted(message, body.co2_equivalent));
        }

        tracing::warn!(status = status.as_u16(), category = candidate.category(), "emission rejected");
        // error bodies are not always JSON
        let message = serde_json::from_str::<EmissionApiBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| {
                let reason = status.canonical_reason().unwrap_or("error");
                format!("HTTP {} {}", status.as_u16(), reason)
            });
        Ok(SubmissionResponse::rejected(message))
    }
}
