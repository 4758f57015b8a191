//! Driven port for the append-only survey log.
//!
//! The [`SurveyLog`] trait is the single persistence contract of the intake
//! pipeline: each call appends one serialised record. Adapters decide the
//! medium (a JSON-lines file, memory) but must keep appends atomic with
//! respect to each other so concurrent requests never interleave records.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by survey log adapters.
    pub enum SurveyLogError {
        /// The underlying medium rejected the write.
        Write { message: String } => "survey log write failed: {message}",
        /// The log could not be reached (lock poisoned, writer task lost).
        Unavailable { message: String } => "survey log unavailable: {message}",
        /// The line would not occupy exactly one record slot.
        MalformedLine => "survey record must be a single line",
    }
}

/// Append-only sink for serialised survey records.
///
/// The port exposes no read, update, or delete operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SurveyLog: Send + Sync {
    /// Append `line` as one record. `line` excludes the record terminator.
    ///
    /// # Errors
    ///
    /// Returns [`SurveyLogError`] when nothing was persisted; callers must not
    /// retry automatically.
    async fn append(&self, line: &str) -> Result<(), SurveyLogError>;
}

/// Reject lines that would split into several records.
pub(crate) fn ensure_single_line(line: &str) -> Result<(), SurveyLogError> {
    if line.contains(['\n', '\r']) {
        return Err(SurveyLogError::malformed_line());
    }
    Ok(())
}
