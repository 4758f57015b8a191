//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the structure of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The body is missing, not JSON, or not a JSON object.
    #[schema(rename = "invalid_json")]
    InvalidJson,
    /// The body exceeds the accepted size.
    #[schema(rename = "payload_too_large")]
    PayloadTooLarge,
    /// One or more fields failed validation.
    #[schema(rename = "validation_error")]
    ValidationError,
    /// An internal invariant was broken.
    #[schema(rename = "integrity_fault")]
    IntegrityFault,
    /// The survey log could not be written.
    #[schema(rename = "storage_fault")]
    StorageFault,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::FieldIssue`].
#[derive(ToSchema)]
#[schema(as = crate::domain::FieldIssue)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FieldIssueSchema {
    /// Name of the offending field.
    #[schema(example = "consent")]
    field: String,
    /// Machine-readable issue code.
    #[schema(example = "consent_required")]
    code: String,
    /// Human-readable description of the violation.
    #[schema(example = "Consent must be true")]
    issue: String,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// `detail` is a string for every code except `validation_error`, where it is
/// a list of [`FieldIssueSchema`] entries.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_json")]
    error: ErrorCodeSchema,
    /// Message string or list of field issues.
    #[schema(value_type = Object, example = "Body must be application/json")]
    detail: serde_json::Value,
    /// Correlation identifier for tracing this error across systems.
    #[schema(rename = "traceId", example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
}

/// Raw survey submission body as accepted by `POST /v1/survey`.
#[derive(ToSchema)]
#[schema(as = crate::domain::SurveySubmission)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SurveySubmissionSchema {
    /// Respondent name; must not be blank.
    #[schema(example = "Alice")]
    name: String,
    /// Email address; trimmed and lowercased before validation.
    #[schema(example = "alice@example.com")]
    email: String,
    /// Age in years, 0 to 130 inclusive.
    #[schema(minimum = 0, maximum = 130, example = 30)]
    age: u8,
    /// Must be `true`.
    #[schema(example = true)]
    consent: bool,
    /// Satisfaction rating, 1 to 5 inclusive.
    #[schema(minimum = 1, maximum = 5, example = 5)]
    rating: u8,
    /// Free-form feedback.
    comments: Option<String>,
    /// Client identifier; defaults to the `User-Agent` header.
    user_agent: Option<String>,
    /// Client-chosen idempotency key used verbatim when present.
    submission_id: Option<String>,
}

/// Success acknowledgement returned by `POST /v1/survey`.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SurveyAcceptedSchema {
    #[schema(example = "ok")]
    status: String,
}
