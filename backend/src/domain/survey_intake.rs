//! Survey intake orchestration.
//!
//! [`SurveyIntakeService`] implements the [`SurveyIntake`] port by running
//! the pipeline in order:
//! 1. Normalise the raw payload and apply request defaults.
//! 2. Validate it into a [`SurveySubmission`].
//! 3. Pseudonymise identifying fields and resolve the submission identifier.
//! 4. Build the [`StoredSurveyRecord`] and append it to the [`SurveyLog`].
//!
//! Any failure ends the request before the append; nothing is retried.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, error, info};

use super::ports::{SurveyIntake, SurveyIntakeRequest, SurveyLog, SurveyLogError, SurveyReceipt};
use super::{
    Error, PseudonymizedIdentity, StoredSurveyRecord, SurveySubmission, normalize_payload,
};

/// Concrete implementation of [`SurveyIntake`].
pub struct SurveyIntakeService<L: ?Sized> {
    log: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<L> SurveyIntakeService<L>
where
    L: SurveyLog + ?Sized,
{
    /// Create a service appending to `log` and reading time from `clock`.
    pub fn new(log: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self { log, clock }
    }
}

fn map_log_error(err: SurveyLogError) -> Error {
    match err {
        SurveyLogError::MalformedLine => Error::integrity_fault(err.to_string()),
        SurveyLogError::Write { .. } | SurveyLogError::Unavailable { .. } => {
            Error::storage_fault(err.to_string())
        }
    }
}

#[async_trait]
impl<L> SurveyIntake for SurveyIntakeService<L>
where
    L: SurveyLog + ?Sized,
{
    async fn submit(&self, request: SurveyIntakeRequest) -> Result<SurveyReceipt, Error> {
        let SurveyIntakeRequest { payload, metadata } = request;

        let normalized = normalize_payload(payload, metadata.user_agent())?;
        let submission = SurveySubmission::try_from(normalized).map_err(|errors| {
            debug!(%errors, "survey submission rejected");
            Error::from(errors)
        })?;

        // One instant feeds both the dedup window and `received_at`.
        let now = self.clock.utc();
        let identity = PseudonymizedIdentity::from_submission(&submission, now).inspect_err(
            |err| error!(error = %err, "survey identity derivation failed"),
        )?;
        let record = StoredSurveyRecord::build(submission, identity, now, metadata.client_ip());
        let line = record.to_json_line()?;

        self.log.append(&line).await.map_err(|err| {
            error!(
                error = %err,
                submission_id = %record.submission_id(),
                "survey log append failed"
            );
            map_log_error(err)
        })?;

        info!(submission_id = %record.submission_id(), "survey record appended");
        Ok(SurveyReceipt {
            submission_id: record.submission_id().clone(),
        })
    }
}
