use super::{EmissionSubmitter, SubmissionResponse};
use crate::error::Result;
use async_trait::async_trait;
use carbon_import_common::{CategoryRegistry, EmissionCandidate};

/// Offline submitter
///
/// Nothing leaves the machine; CO2e is estimated as amount times the
/// registry emission factor, the same product the server stores.
pub struct DryRunSubmitter {
    registry: CategoryRegistry,
}

impl DryRunSubmitter {
    pub fn new(registry: CategoryRegistry) -> Self {
        Self { registry }
    }

    pub fn estimate(&self, candidate: &EmissionCandidate) -> f64 {
        let factor = self.registry.factor_for(candidate.category()).unwrap_or(0.0);
        candidate.amount() * factor
    }
}

#[async_trait]
impl EmissionSubmitter for DryRunSubmitter {
    async fn submit(&self, candidate: &EmissionCandidate) -> Result<SubmissionResponse> {
        Ok(SubmissionResponse::accepted(
            "Dry run (not submitted)",
            Some(self.estimate(candidate)),
        ))
    }
}
