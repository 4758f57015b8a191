//! Deterministic pseudonymisation and submission identity derivation.
//!
//! Identifying fields are replaced by SHA-256 digests rendered as lowercase
//! hex. Submissions without a caller-supplied key get an identifier derived
//! from the normalised email and the current UTC hour, so repeats within the
//! same hour collapse to one identifier.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{Error, SurveySubmission};

/// `strftime` pattern for the deduplication window.
pub const HOUR_STAMP_FORMAT: &str = "%Y%m%d%H";

/// One-way digest of an identifying value.
///
/// # Examples
/// ```
/// use survey_backend::domain::Pseudonym;
///
/// let digest = Pseudonym::of("30");
/// assert_eq!(digest.as_ref().len(), 64);
/// assert_eq!(digest, Pseudonym::of("30"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pseudonym(String);

impl Pseudonym {
    /// Hash the UTF-8 bytes of `input`.
    pub fn of(input: &str) -> Self {
        Self(hex::encode(Sha256::digest(input.as_bytes())))
    }
}

impl AsRef<str> for Pseudonym {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Pseudonym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Format `at` as the hour stamp used for identifier derivation.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use survey_backend::domain::hour_stamp;
///
/// let at = Utc.with_ymd_and_hms(2024, 1, 1, 10, 15, 0).single().expect("valid time");
/// assert_eq!(hour_stamp(at), "2024010110");
/// ```
pub fn hour_stamp(at: DateTime<Utc>) -> String {
    at.format(HOUR_STAMP_FORMAT).to_string()
}

/// Stable identifier recorded with each submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
    /// Derive an identifier from a normalised email and the hour of `at`.
    ///
    /// # Errors
    /// Returns [`Error::integrity_fault`] when `normalized_email` is empty.
    pub fn derive(normalized_email: &str, at: DateTime<Utc>) -> Result<Self, Error> {
        if normalized_email.is_empty() {
            return Err(Error::integrity_fault(
                "normalised email is empty at identity derivation",
            ));
        }
        let seed = format!("{normalized_email}{}", hour_stamp(at));
        Ok(Self(Pseudonym::of(&seed).0))
    }

    /// Use a caller-supplied key when present, otherwise derive one.
    ///
    /// # Errors
    /// Propagates [`SubmissionId::derive`] failures.
    pub fn resolve(
        client_key: Option<&str>,
        normalized_email: &str,
        at: DateTime<Utc>,
    ) -> Result<Self, Error> {
        match client_key.filter(|key| !key.is_empty()) {
            Some(key) => Ok(Self(key.to_owned())),
            None => Self::derive(normalized_email, at),
        }
    }
}

impl AsRef<str> for SubmissionId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pseudonymised identity of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudonymizedIdentity {
    email: Pseudonym,
    age: Pseudonym,
    submission_id: SubmissionId,
}

impl PseudonymizedIdentity {
    /// Hash the identifying fields of `submission` and resolve its identifier
    /// against the instant `at`.
    ///
    /// # Errors
    /// Returns [`Error::integrity_fault`] when identity derivation fails.
    pub fn from_submission(submission: &SurveySubmission, at: DateTime<Utc>) -> Result<Self, Error> {
        let email = submission.email().as_ref();
        Ok(Self {
            email: Pseudonym::of(email),
            age: Pseudonym::of(&submission.age().to_string()),
            submission_id: SubmissionId::resolve(submission.submission_id(), email, at)?,
        })
    }

    /// Digest of the normalised email.
    pub fn email(&self) -> &Pseudonym {
        &self.email
    }

    /// Digest of the decimal age.
    pub fn age(&self) -> &Pseudonym {
        &self.age
    }

    /// Resolved submission identifier.
    pub fn submission_id(&self) -> &SubmissionId {
        &self.submission_id
    }

    pub(crate) fn into_parts(self) -> (Pseudonym, Pseudonym, SubmissionId) {
        (self.email, self.age, self.submission_id)
    }
}
