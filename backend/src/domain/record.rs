//! Persisted survey record and request-time metadata.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Error, Pseudonym, PseudonymizedIdentity, SubmissionId, SurveySubmission};

/// Transport metadata captured alongside a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    forwarded_for: Option<String>,
    peer_ip: Option<IpAddr>,
    user_agent: Option<String>,
}

impl RequestMetadata {
    /// Empty metadata: no forwarding header, peer, or user agent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the raw `X-Forwarded-For` header value.
    #[must_use]
    pub fn with_forwarded_for(mut self, value: impl Into<String>) -> Self {
        self.forwarded_for = Some(value.into());
        self
    }

    /// Record the connection's peer address.
    #[must_use]
    pub fn with_peer_ip(mut self, ip: IpAddr) -> Self {
        self.peer_ip = Some(ip);
        self
    }

    /// Record the `User-Agent` header value.
    #[must_use]
    pub fn with_user_agent(mut self, value: impl Into<String>) -> Self {
        self.user_agent = Some(value.into());
        self
    }

    /// `User-Agent` header value, if sent.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Client address: a non-empty forwarding header, else the peer IP, else
    /// empty text.
    ///
    /// # Examples
    /// ```
    /// use std::net::{IpAddr, Ipv4Addr};
    /// use survey_backend::domain::RequestMetadata;
    ///
    /// let peer = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 7));
    /// let metadata = RequestMetadata::new()
    ///     .with_forwarded_for("203.0.113.9")
    ///     .with_peer_ip(peer);
    /// assert_eq!(metadata.client_ip(), "203.0.113.9");
    /// assert_eq!(RequestMetadata::new().with_peer_ip(peer).client_ip(), "10.0.0.7");
    /// assert_eq!(RequestMetadata::new().client_ip(), "");
    /// ```
    pub fn client_ip(&self) -> String {
        match (self.forwarded_for.as_deref(), self.peer_ip) {
            (Some(forwarded), _) if !forwarded.is_empty() => forwarded.to_owned(),
            (_, Some(peer)) => peer.to_string(),
            _ => String::new(),
        }
    }
}

/// Survey record as written to the append-only log.
///
/// ## Invariants
/// - `email` and `age` hold digests, never raw values.
/// - Instances are immutable once built.
///
/// Field order is the serialised column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSurveyRecord {
    name: String,
    email: Pseudonym,
    age: Pseudonym,
    consent: bool,
    rating: u8,
    comments: Option<String>,
    user_agent: Option<String>,
    submission_id: SubmissionId,
    received_at: DateTime<Utc>,
    ip: String,
}

impl StoredSurveyRecord {
    /// Assemble a record from a validated submission and its identity.
    pub fn build(
        submission: SurveySubmission,
        identity: PseudonymizedIdentity,
        received_at: DateTime<Utc>,
        ip: String,
    ) -> Self {
        let consent = submission.consent();
        let parts = submission.into_parts();
        let (email, age, submission_id) = identity.into_parts();
        Self {
            name: parts.name,
            email,
            age,
            consent,
            rating: parts.rating,
            comments: parts.comments,
            user_agent: parts.user_agent,
            submission_id,
            received_at,
            ip,
        }
    }

    /// Serialise the record as one JSON line without the trailing newline.
    ///
    /// # Errors
    /// Returns [`Error::integrity_fault`] when serialisation fails.
    pub fn to_json_line(&self) -> Result<String, Error> {
        serde_json::to_string(self)
            .map_err(|err| Error::integrity_fault(format!("failed to serialise record: {err}")))
    }

    /// Respondent name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Digest of the normalised email.
    pub fn email(&self) -> &Pseudonym {
        &self.email
    }

    /// Digest of the age.
    pub fn age(&self) -> &Pseudonym {
        &self.age
    }

    /// Consent flag.
    pub fn consent(&self) -> bool {
        self.consent
    }

    /// Rating on the survey scale.
    pub fn rating(&self) -> u8 {
        self.rating
    }

    /// Free-text comments.
    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    /// Client user agent.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Submission identifier.
    pub fn submission_id(&self) -> &SubmissionId {
        &self.submission_id
    }

    /// Processing timestamp.
    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Client address.
    pub fn ip(&self) -> &str {
        &self.ip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::normalize_payload;
    use crate::test_support::at;
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};
    use std::net::Ipv4Addr;

    #[fixture]
    fn received_at() -> DateTime<Utc> {
        at(10, 15)
    }

    #[fixture]
    fn record(received_at: DateTime<Utc>) -> StoredSurveyRecord {
        let normalized = normalize_payload(
            json!({
                "name": "Alice",
                "email": "Alice@Example.com",
                "age": 30,
                "consent": true,
                "rating": 5,
                "comments": "Lovely",
            }),
            Some("curl/8.0"),
        )
        .expect("object payload");
        let submission = SurveySubmission::try_from(normalized).expect("valid submission");
        let identity =
            PseudonymizedIdentity::from_submission(&submission, received_at).expect("identity");
        StoredSurveyRecord::build(submission, identity, received_at, "198.51.100.4".to_owned())
    }

    #[rstest]
    #[case(RequestMetadata::new().with_forwarded_for("203.0.113.9, 10.0.0.1"), "203.0.113.9, 10.0.0.1")]
    #[case(
        RequestMetadata::new()
            .with_forwarded_for("")
            .with_peer_ip(IpAddr::V4(Ipv4Addr::LOCALHOST)),
        "127.0.0.1"
    )]
    #[case(RequestMetadata::new().with_forwarded_for(""), "")]
    fn client_ip_prefers_forwarding_header(#[case] metadata: RequestMetadata, #[case] expected: &str) {
        assert_eq!(metadata.client_ip(), expected);
    }

    #[rstest]
    fn record_carries_fields_through(record: StoredSurveyRecord, received_at: DateTime<Utc>) {
        assert_eq!(record.name(), "Alice");
        assert!(record.consent());
        assert_eq!(record.rating(), 5);
        assert_eq!(record.comments(), Some("Lovely"));
        assert_eq!(record.user_agent(), Some("curl/8.0"));
        assert_eq!(record.received_at(), received_at);
        assert_eq!(record.ip(), "198.51.100.4");
    }

    #[rstest]
    fn json_line_never_contains_raw_identifiers(record: StoredSurveyRecord) {
        let line = record.to_json_line().expect("serialise record");
        assert!(!line.contains('\n'));
        assert!(!line.to_lowercase().contains("alice@example.com"));
        let value: Value = serde_json::from_str(&line).expect("valid json");
        assert_eq!(
            value.get("email").and_then(Value::as_str),
            Some(Pseudonym::of("alice@example.com").as_ref())
        );
        assert_eq!(
            value.get("age").and_then(Value::as_str),
            Some(Pseudonym::of("30").as_ref())
        );
    }

    #[rstest]
    fn json_line_uses_record_schema(record: StoredSurveyRecord) {
        let line = record.to_json_line().expect("serialise record");
        let fields = [
            "name",
            "email",
            "age",
            "consent",
            "rating",
            "comments",
            "user_agent",
            "submission_id",
            "received_at",
            "ip",
        ];
        let offsets: Vec<usize> = fields
            .iter()
            .map(|field| {
                line.find(&format!("\"{field}\":"))
                    .unwrap_or_else(|| panic!("{field} missing from {line}"))
            })
            .collect();
        assert!(line.starts_with(r#"{"name":"#));
        assert!(
            offsets.windows(2).all(|pair| pair[0] < pair[1]),
            "fields out of order in {line}"
        );

        let value: Value = serde_json::from_str(&line).expect("valid json");
        assert_eq!(value.as_object().map(serde_json::Map::len), Some(fields.len()));
        assert_eq!(
            value.get("received_at").and_then(Value::as_str),
            Some("2024-01-01T10:15:00Z")
        );
    }

    #[rstest]
    fn json_line_round_trips_to_the_same_record(record: StoredSurveyRecord) {
        let line = record.to_json_line().expect("serialise record");
        let parsed: StoredSurveyRecord = serde_json::from_str(&line).expect("parse record");
        assert_eq!(parsed, record);
    }
}
