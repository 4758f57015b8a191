//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses; the serialised shape (`error`, `detail`, `traceId`) is the
//! contract clients see.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TraceId;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request body is absent, not JSON, or not a JSON object.
    InvalidJson,
    /// The request body exceeds the accepted size.
    PayloadTooLarge,
    /// One or more submission fields violate their rules.
    ValidationError,
    /// An internal invariant was broken despite upstream validation.
    IntegrityFault,
    /// Appending to the survey log failed.
    StorageFault,
    /// An unexpected error occurred outside the survey pipeline.
    InternalError,
}

impl ErrorCode {
    /// Wire representation of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidJson => "invalid_json",
            Self::PayloadTooLarge => "payload_too_large",
            Self::ValidationError => "validation_error",
            Self::IntegrityFault => "integrity_fault",
            Self::StorageFault => "storage_fault",
            Self::InternalError => "internal_error",
        }
    }

    /// Whether the code denotes a server-side failure.
    #[must_use]
    pub const fn is_internal(self) -> bool {
        matches!(
            self,
            Self::IntegrityFault | Self::StorageFault | Self::InternalError
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain error payload.
///
/// `detail` is a human-readable string for every code except
/// [`ErrorCode::ValidationError`], where it holds the list of field issues.
///
/// # Examples
/// ```
/// use survey_backend::domain::{Error, ErrorCode};
///
/// let err = Error::invalid_json("Body must be application/json");
/// assert_eq!(err.code(), ErrorCode::InvalidJson);
/// assert_eq!(err.message(), "Body must be application/json");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    #[serde(rename = "error")]
    code: ErrorCode,
    detail: Value,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "trace_id")]
    trace_id: Option<String>,
}

impl Error {
    /// Create a new error, capturing the trace identifier in scope.
    pub fn new(code: ErrorCode, detail: Value) -> Self {
        Self {
            code,
            detail,
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code, Value::String(message.into()))
    }

    /// Convenience constructor for [`ErrorCode::InvalidJson`].
    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidJson, message)
    }

    /// Convenience constructor for [`ErrorCode::PayloadTooLarge`].
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PayloadTooLarge, message)
    }

    /// Convenience constructor for [`ErrorCode::ValidationError`].
    ///
    /// `issues` should be the JSON array of field issues.
    pub fn validation_error(issues: Value) -> Self {
        Self::new(ErrorCode::ValidationError, issues)
    }

    /// Convenience constructor for [`ErrorCode::IntegrityFault`].
    pub fn integrity_fault(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::IntegrityFault, message)
    }

    /// Convenience constructor for [`ErrorCode::StorageFault`].
    pub fn storage_fault(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::StorageFault, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, message)
    }

    /// Attach a trace identifier to the error.
    #[must_use]
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Replace the detail payload, keeping code and trace identifier.
    #[must_use]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Structured detail payload.
    pub fn detail(&self) -> &Value {
        &self.detail
    }

    /// Human-readable message; falls back to the code for structured details.
    pub fn message(&self) -> &str {
        self.detail.as_str().unwrap_or(self.code.as_str())
    }

    /// Trace identifier captured at construction, if any.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message())
    }
}

impl std::error::Error for Error {}
