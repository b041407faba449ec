//! Emission submission
//!
//! The pipeline only sees [`EmissionSubmitter`]; the HTTP client and the
//! offline dry run both sit behind it.

mod dry_run;
mod http;

pub use dry_run::DryRunSubmitter;
pub use http::HttpSubmitter;

use crate::error::Result;
use async_trait::async_trait;
use carbon_import_common::EmissionCandidate;
use serde::{Deserialize, Serialize};

/// What the server said about one submitted record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub co2_equivalent: Option<f64>,
}

impl SubmissionResponse {
    pub fn accepted(message: impl Into<String>, co2_equivalent: Option<f64>) -> Self {
        Self {
            success: true,
            message: message.into(),
            co2_equivalent,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            co2_equivalent: None,
        }
    }
}

/// Submits one validated record
///
/// `Ok` with `success: false` is a server-side rejection; `Err` is a
/// transport failure. Both end up as an API error on the row.
#[async_trait]
pub trait EmissionSubmitter: Send + Sync {
    async fn submit(&self, candidate: &EmissionCandidate) -> Result<SubmissionResponse>;
}
