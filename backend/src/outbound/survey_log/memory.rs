//! In-memory survey log used by tests and local smoke runs.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{SurveyLog, SurveyLogError, ensure_single_line};

/// Survey log that keeps appended lines in insertion order.
///
/// # Examples
/// ```
/// use survey_backend::outbound::survey_log::InMemorySurveyLog;
///
/// let log = InMemorySurveyLog::new();
/// assert!(log.is_empty());
/// assert_eq!(log.len(), 0);
/// ```
#[derive(Debug, Default)]
pub struct InMemorySurveyLog {
    lines: Mutex<Vec<String>>,
}

impl InMemorySurveyLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every appended line, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of lines appended so far.
    pub fn len(&self) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SurveyLog for InMemorySurveyLog {
    async fn append(&self, line: &str) -> Result<(), SurveyLogError> {
        ensure_single_line(line)?;
        self.lines
            .lock()
            .map_err(|_| SurveyLogError::unavailable("in-memory survey log mutex poisoned"))?
            .push(line.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keeps_lines_in_order() {
        let log = InMemorySurveyLog::new();
        assert!(log.is_empty());

        log.append("first").await.expect("append first");
        log.append("second").await.expect("append second");

        assert_eq!(log.len(), 2);
        assert_eq!(log.lines(), ["first", "second"]);
    }

    #[tokio::test]
    async fn rejects_multi_line_records() {
        let log = InMemorySurveyLog::new();
        let err = log.append("a\nb").await.expect_err("malformed line");
        assert_eq!(err, SurveyLogError::MalformedLine);
        assert!(log.is_empty());
    }
}
