//! Driving port for survey intake.
//!
//! Inbound adapters hand the raw payload and request metadata to
//! [`SurveyIntake`] and map the outcome to their transport.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{Error, RequestMetadata, SubmissionId};

/// Raw submission as delivered by an inbound adapter.
#[derive(Debug, Clone)]
pub struct SurveyIntakeRequest {
    /// Parsed request body, before normalisation.
    pub payload: Value,
    /// Transport metadata used for defaults and the client address.
    pub metadata: RequestMetadata,
}

/// Outcome of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyReceipt {
    /// Identifier the record was stored under.
    pub submission_id: SubmissionId,
}

/// Driving port that validates, pseudonymises, and records a submission.
#[async_trait]
pub trait SurveyIntake: Send + Sync {
    /// Process one submission end to end.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] with code:
    /// - `InvalidJson` when the payload is not an object.
    /// - `ValidationError` listing every violated field.
    /// - `IntegrityFault` when identity derivation or serialisation fails.
    /// - `StorageFault` when the log append fails.
    async fn submit(&self, request: SurveyIntakeRequest) -> Result<SurveyReceipt, Error>;
}
