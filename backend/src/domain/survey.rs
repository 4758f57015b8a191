//! Survey submission parsing, normalisation, and validation.
//!
//! Raw payloads pass through two pure stages:
//!
//! 1. [`normalize_payload`] fills `user_agent` from request metadata and
//!    trims/lowercases `email`, yielding a [`NormalizedPayload`].
//! 2. [`SurveySubmission::try_from`] checks every field and collects all
//!    violations into [`ValidationErrors`].
//!
//! Neither stage mutates shared state; each consumes its input and returns a
//! new value.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use super::Error;

/// Inclusive bounds for a plausible respondent age.
pub const AGE_RANGE: RangeInclusive<u8> = 0..=130;
/// Inclusive bounds of the rating scale.
pub const RATING_RANGE: RangeInclusive<u8> = 1..=5;

const NAME: &str = "name";
const EMAIL: &str = "email";
const AGE: &str = "age";
const CONSENT: &str = "consent";
const RATING: &str = "rating";
const COMMENTS: &str = "comments";
const USER_AGENT: &str = "user_agent";
const SUBMISSION_ID: &str = "submission_id";

/// Machine-readable reason attached to a [`FieldIssue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// A required field is absent or null.
    Missing,
    /// The field has the wrong JSON type.
    InvalidType,
    /// A text field is blank.
    Empty,
    /// The email address is not syntactically valid.
    InvalidEmail,
    /// A number falls outside its permitted range.
    OutOfRange,
    /// Consent was given as `false`.
    ConsentRequired,
}

/// One violated field rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    field: &'static str,
    code: IssueCode,
    issue: String,
}

impl FieldIssue {
    fn new(field: &'static str, code: IssueCode, issue: impl Into<String>) -> Self {
        Self {
            field,
            code,
            issue: issue.into(),
        }
    }

    fn missing(field: &'static str) -> Self {
        Self::new(field, IssueCode::Missing, format!("{field} is required"))
    }

    fn invalid_type(field: &'static str, expected: &str) -> Self {
        Self::new(
            field,
            IssueCode::InvalidType,
            format!("{field} must be {expected}"),
        )
    }

    fn out_of_range(field: &'static str, range: &RangeInclusive<u8>) -> Self {
        Self::new(
            field,
            IssueCode::OutOfRange,
            format!(
                "{field} must be between {} and {}",
                range.start(),
                range.end()
            ),
        )
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Machine-readable reason.
    pub fn code(&self) -> IssueCode {
        self.code
    }

    /// Human-readable reason.
    pub fn issue(&self) -> &str {
        &self.issue
    }
}

/// Every rule violation found in one payload, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldIssue>);

impl ValidationErrors {
    /// Issues collected during validation.
    pub fn issues(&self) -> &[FieldIssue] {
        &self.0
    }

    /// Whether any issue names `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.0.iter().any(|issue| issue.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.iter().map(FieldIssue::field).collect();
        write!(f, "invalid survey fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        let issues = serde_json::to_value(errors.issues())
            .unwrap_or_else(|_| Value::String(errors.to_string()));
        Error::validation_error(issues)
    }
}

/// Trim and lowercase an email address.
///
/// # Examples
/// ```
/// use survey_backend::domain::normalize_email;
///
/// assert_eq!(normalize_email(" Foo@BAR.com "), "foo@bar.com");
/// ```
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = concat!(
            r"^[a-z0-9!#$%&'*+/=?^_`{|}~.-]+",
            r"@[a-z0-9](?:[a-z0-9-]*[a-z0-9])?",
            r"(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)*",
            r"\.[a-z]{2,}$",
        );
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised, syntactically valid email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalise and validate `raw`.
    pub fn parse(raw: &str) -> Result<Self, IssueCode> {
        let email = normalize_email(raw);
        if email.is_empty() {
            return Err(IssueCode::Empty);
        }
        let local_part_ok = email
            .split_once('@')
            .is_some_and(|(local, _)| !local.starts_with('.') && !local.ends_with('.'));
        if !local_part_ok || email.contains("..") || !email_regex().is_match(&email) {
            return Err(IssueCode::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Payload after request defaults are applied and `email` is normalised.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPayload(Map<String, Value>);

impl NormalizedPayload {
    /// Field value by name, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

/// Apply request defaults and normalise identifying fields.
///
/// A missing or null `user_agent` is replaced by `header_user_agent` when
/// one is supplied. A string `email` is trimmed and lowercased; other types
/// pass through untouched so validation can report them.
///
/// # Errors
/// Returns [`Error::invalid_json`] when `raw` is not a JSON object.
pub fn normalize_payload(
    raw: Value,
    header_user_agent: Option<&str>,
) -> Result<NormalizedPayload, Error> {
    let Value::Object(mut fields) = raw else {
        return Err(Error::invalid_json("Body must be a JSON object"));
    };

    let has_user_agent = fields.get(USER_AGENT).is_some_and(|value| !value.is_null());
    if let (false, Some(header)) = (has_user_agent, header_user_agent) {
        fields.insert(USER_AGENT.to_owned(), Value::String(header.to_owned()));
    }

    if let Some(Value::String(email)) = fields.get_mut(EMAIL) {
        *email = normalize_email(email);
    }

    Ok(NormalizedPayload(fields))
}

/// Field reader that records an issue every time it yields `None` for a
/// required field.
struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
    issues: Vec<FieldIssue>,
}

impl<'a> FieldReader<'a> {
    fn new(payload: &'a NormalizedPayload) -> Self {
        Self {
            fields: &payload.0,
            issues: Vec::new(),
        }
    }

    fn present(&mut self, field: &'static str) -> Option<&'a Value> {
        match self.fields.get(field) {
            None | Some(Value::Null) => {
                self.issues.push(FieldIssue::missing(field));
                None
            }
            Some(value) => Some(value),
        }
    }

    fn required_text(&mut self, field: &'static str) -> Option<&'a str> {
        let value = self.present(field)?;
        let Some(text) = value.as_str() else {
            self.issues.push(FieldIssue::invalid_type(field, "a string"));
            return None;
        };
        if text.trim().is_empty() {
            self.issues.push(FieldIssue::new(
                field,
                IssueCode::Empty,
                format!("{field} must not be empty"),
            ));
            return None;
        }
        Some(text)
    }

    fn optional_text(&mut self, field: &'static str) -> Option<String> {
        match self.fields.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(_) => {
                self.issues.push(FieldIssue::invalid_type(field, "a string"));
                None
            }
        }
    }

    fn required_bounded(&mut self, field: &'static str, range: RangeInclusive<u8>) -> Option<u8> {
        let value = self.present(field)?;
        let Some(number) = value.as_number() else {
            self.issues.push(FieldIssue::invalid_type(field, "an integer"));
            return None;
        };
        if !(number.is_i64() || number.is_u64()) {
            self.issues.push(FieldIssue::invalid_type(field, "an integer"));
            return None;
        }
        let bounded = number
            .as_u64()
            .and_then(|raw| u8::try_from(raw).ok())
            .filter(|candidate| range.contains(candidate));
        if bounded.is_none() {
            self.issues.push(FieldIssue::out_of_range(field, &range));
        }
        bounded
    }

    fn email(&mut self) -> Option<EmailAddress> {
        let raw = self.required_text(EMAIL)?;
        match EmailAddress::parse(raw) {
            Ok(email) => Some(email),
            Err(code) => {
                self.issues.push(FieldIssue::new(
                    EMAIL,
                    code,
                    "email must be a valid email address",
                ));
                None
            }
        }
    }

    fn consent(&mut self) -> Option<bool> {
        let value = self.present(CONSENT)?;
        match value.as_bool() {
            Some(true) => Some(true),
            Some(false) => {
                self.issues.push(FieldIssue::new(
                    CONSENT,
                    IssueCode::ConsentRequired,
                    "consent must be true",
                ));
                None
            }
            None => {
                self.issues
                    .push(FieldIssue::invalid_type(CONSENT, "a boolean"));
                None
            }
        }
    }

    /// Yield `assembled` when no issue was recorded.
    ///
    /// Every entry of `required` whose value was not resolved gets a
    /// `missing` issue unless the reader already reported that field, so a
    /// rejection always names at least one field.
    fn finish<T>(
        mut self,
        assembled: Option<T>,
        required: &[(&'static str, bool)],
    ) -> Result<T, ValidationErrors> {
        for &(field, resolved) in required {
            if !resolved && !self.issues.iter().any(|issue| issue.field == field) {
                self.issues.push(FieldIssue::missing(field));
            }
        }
        match assembled {
            Some(value) if self.issues.is_empty() => Ok(value),
            _ => Err(ValidationErrors(self.issues)),
        }
    }
}

/// Validated survey submission.
///
/// ## Invariants
/// - `name` is non-blank.
/// - `email` is normalised and syntactically valid.
/// - `age` lies within [`AGE_RANGE`]; `rating` within [`RATING_RANGE`].
/// - `consent` is `true`.
/// - `submission_id`, when present, is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveySubmission {
    name: String,
    email: EmailAddress,
    age: u8,
    rating: u8,
    comments: Option<String>,
    user_agent: Option<String>,
    submission_id: Option<String>,
}

impl SurveySubmission {
    /// Respondent name as submitted.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalised email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Respondent age.
    pub fn age(&self) -> u8 {
        self.age
    }

    /// Consent flag; always `true` for a validated submission.
    pub fn consent(&self) -> bool {
        true
    }

    /// Rating on the survey scale.
    pub fn rating(&self) -> u8 {
        self.rating
    }

    /// Free-text comments.
    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    /// Client user agent, possibly defaulted from the request header.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Caller-supplied idempotency key.
    pub fn submission_id(&self) -> Option<&str> {
        self.submission_id.as_deref()
    }

    pub(crate) fn into_parts(self) -> SubmissionParts {
        SubmissionParts {
            name: self.name,
            rating: self.rating,
            comments: self.comments,
            user_agent: self.user_agent,
        }
    }
}

/// Carried-through fields consumed when building the stored record.
pub(crate) struct SubmissionParts {
    pub(crate) name: String,
    pub(crate) rating: u8,
    pub(crate) comments: Option<String>,
    pub(crate) user_agent: Option<String>,
}

impl TryFrom<NormalizedPayload> for SurveySubmission {
    type Error = ValidationErrors;

    fn try_from(payload: NormalizedPayload) -> Result<Self, Self::Error> {
        let mut reader = FieldReader::new(&payload);
        let name = reader.required_text(NAME).map(str::to_owned);
        let email = reader.email();
        let age = reader.required_bounded(AGE, AGE_RANGE);
        let consent = reader.consent();
        let rating = reader.required_bounded(RATING, RATING_RANGE);
        let comments = reader.optional_text(COMMENTS);
        let user_agent = reader.optional_text(USER_AGENT);
        let submission_id = reader
            .optional_text(SUBMISSION_ID)
            .filter(|id| !id.is_empty());
        let required = [
            (NAME, name.is_some()),
            (EMAIL, email.is_some()),
            (AGE, age.is_some()),
            (CONSENT, consent == Some(true)),
            (RATING, rating.is_some()),
        ];

        let assembled = match (name, email, age, consent, rating) {
            (Some(name), Some(email), Some(age), Some(true), Some(rating)) => Some(Self {
                name,
                email,
                age,
                rating,
                comments,
                user_agent,
                submission_id,
            }),
            _ => None,
        };
        reader.finish(assembled, &required)
    }
}
