//! Import pipeline
//!
//! validate every row → submit the valid ones → one outcome per row.
//! Submissions go out in row order; with `concurrency > 1` several are in
//! flight at once but results are still collected in row order. A failing
//! row never stops the batch and nothing is retried.

use crate::submit::EmissionSubmitter;
use carbon_import_common::{
    validator::data_rows, EmissionCandidate, ImportOutcome, ImportReport, RecordImportValidator,
    RowValidation,
};
use futures::stream::{self, StreamExt};
use rayon::prelude::*;

/// Tables larger than this are validated on the rayon pool
const PARALLEL_VALIDATION_ROWS: usize = 2000;

/// Validate a table (header first); output in row order
pub fn validate_table(validator: &RecordImportValidator<'_>, rows: &[Vec<String>]) -> Vec<RowValidation> {
    if rows.len() <= PARALLEL_VALIDATION_ROWS {
        return validator.validate_rows(rows);
    }

    let import_rows: Vec<_> = data_rows(rows).collect();
    import_rows
        .par_iter()
        .map(|row| validator.validate(row))
        .collect()
}

pub struct ImportPipeline<'a> {
    validator: RecordImportValidator<'a>,
    submitter: &'a dyn EmissionSubmitter,
    concurrency: usize,
}

impl<'a> ImportPipeline<'a> {
    pub fn new(validator: RecordImportValidator<'a>, submitter: &'a dyn EmissionSubmitter) -> Self {
        Self {
            validator,
            submitter,
            concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Validate and submit a whole table
    pub async fn run(&self, source: &str, rows: &[Vec<String>]) -> ImportReport {
        self.run_with_progress(source, rows, |_| {}).await
    }

    /// Same as [`run`](Self::run), calling `on_outcome` as each row settles
    pub async fn run_with_progress<F>(&self, source: &str, rows: &[Vec<String>], mut on_outcome: F) -> ImportReport
    where
        F: FnMut(&ImportOutcome),
    {
        let validations = validate_table(&self.validator, rows);
        self.submit_validated(source, validations, &mut on_outcome).await
    }

    /// Submit already-validated rows
    pub async fn submit_validated<F>(
        &self,
        source: &str,
        validations: Vec<RowValidation>,
        on_outcome: &mut F,
    ) -> ImportReport
    where
        F: FnMut(&ImportOutcome),
    {
        let mut outcomes = Vec::with_capacity(validations.len());
        let mut candidates: Vec<(usize, EmissionCandidate)> = Vec::new();

        for validation in validations {
            match validation.result {
                Ok(candidate) => candidates.push((validation.row_index, candidate)),
                Err(error) => {
                    tracing::debug!(row = validation.row_index, %error, "row failed validation");
                    let outcome = ImportOutcome::validation_error(validation.row_index, &error);
                    on_outcome(&outcome);
                    outcomes.push(outcome);
                }
            }
        }

        tracing::info!(
            source,
            valid = candidates.len(),
            invalid = outcomes.len(),
            concurrency = self.concurrency,
            "submitting rows"
        );

        let mut submissions = stream::iter(candidates.iter())
            .map(|(row_index, candidate)| async move {
                (*row_index, candidate, self.submitter.submit(candidate).await)
            })
            .buffered(self.concurrency);

        while let Some((row_index, candidate, result)) = submissions.next().await {
            let outcome = match result {
                Ok(response) if response.success => ImportOutcome::success(
                    row_index,
                    candidate.category(),
                    response.message,
                    response.co2_equivalent,
                ),
                Ok(response) => ImportOutcome::api_error(row_index, candidate.category(), response.message),
                Err(error) => {
                    tracing::warn!(row = row_index, %error, "submission failed");
                    ImportOutcome::api_error(row_index, candidate.category(), error.to_string())
                }
            };
            on_outcome(&outcome);
            outcomes.push(outcome);
        }

        ImportReport::from_outcomes(source, outcomes)
    }
}
