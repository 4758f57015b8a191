//! Domain primitives, ports, and the survey intake service.
//!
//! Purpose: keep survey rules transport agnostic. Inbound adapters deliver a
//! raw payload plus [`RequestMetadata`]; outbound adapters implement
//! [`ports::SurveyLog`].
//!
//! Public surface:
//! - Error / ErrorCode: failure taxonomy shared by every adapter.
//! - SurveySubmission: validated submission (see [`survey`]).
//! - Pseudonym / SubmissionId: digests and the deduplication identifier.
//! - StoredSurveyRecord: the persisted record shape.
//! - SurveyIntakeService: implementation of [`ports::SurveyIntake`].

pub mod error;
pub mod ports;
pub mod pseudonym;
pub mod record;
pub mod survey;
pub mod survey_intake;
pub mod trace_id;

pub use self::error::{Error, ErrorCode};
pub use self::pseudonym::{
    HOUR_STAMP_FORMAT, Pseudonym, PseudonymizedIdentity, SubmissionId, hour_stamp,
};
pub use self::record::{RequestMetadata, StoredSurveyRecord};
pub use self::survey::{
    AGE_RANGE, EmailAddress, FieldIssue, IssueCode, NormalizedPayload, RATING_RANGE,
    SurveySubmission, ValidationErrors, normalize_email, normalize_payload,
};
pub use self::survey_intake::SurveyIntakeService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
