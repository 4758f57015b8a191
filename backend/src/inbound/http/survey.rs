//! Survey submission handler.
//!
//! ```text
//! POST /v1/survey {"name":"Alice","email":"alice@example.com","age":30,"consent":true,"rating":5}
//! ```
//!
//! The handler only checks that the body is a JSON document and collects the
//! request metadata; every survey rule lives in the domain service.

use actix_web::http::header::{self, HeaderMap};
use actix_web::{HttpRequest, HttpResponse, post, web};
use futures_util::StreamExt;
use serde_json::{Value, json};

use crate::domain::ports::SurveyIntakeRequest;
use crate::domain::{Error, RequestMetadata};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, SurveyAcceptedSchema, SurveySubmissionSchema};
use crate::inbound::http::state::HttpState;

const FORWARDED_FOR: &str = "x-forwarded-for";
const NOT_JSON: &str = "Body must be application/json";

/// Largest request body, in bytes, that [`submit_survey`] reads.
pub const SURVEY_BODY_LIMIT: usize = 1024 * 1024;

fn is_json_media_type(headers: &HeaderMap) -> bool {
    let Some(raw) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };
    let essence = raw
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

async fn read_limited(mut payload: web::Payload, limit: usize) -> Result<web::BytesMut, Error> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|_| Error::invalid_json(NOT_JSON))?;
        if body.len() + chunk.len() > limit {
            return Err(Error::payload_too_large(format!(
                "Body must not exceed {limit} bytes"
            )));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

async fn parse_body(req: &HttpRequest, payload: web::Payload) -> Result<Value, Error> {
    if !is_json_media_type(req.headers()) {
        return Err(Error::invalid_json(NOT_JSON));
    }
    let body = read_limited(payload, SURVEY_BODY_LIMIT).await?;
    if body.is_empty() {
        return Err(Error::invalid_json(NOT_JSON));
    }
    serde_json::from_slice(&body).map_err(|_| Error::invalid_json(NOT_JSON))
}

fn header_text<'a>(headers: &'a HeaderMap, name: impl header::AsHeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn request_metadata(req: &HttpRequest) -> RequestMetadata {
    let headers = req.headers();
    let mut metadata = RequestMetadata::new();
    if let Some(forwarded) = header_text(headers, FORWARDED_FOR) {
        metadata = metadata.with_forwarded_for(forwarded);
    }
    if let Some(agent) = header_text(headers, header::USER_AGENT) {
        metadata = metadata.with_user_agent(agent);
    }
    if let Some(peer) = req.peer_addr() {
        metadata = metadata.with_peer_ip(peer.ip());
    }
    metadata
}

/// Accept one survey submission and append it to the survey log.
///
/// Identifying fields are pseudonymised before storage. Resubmissions within
/// the same UTC hour share a `submission_id` unless the client supplies one.
#[utoipa::path(
    post,
    path = "/v1/survey",
    request_body(content = SurveySubmissionSchema, content_type = "application/json"),
    params(
        ("X-Forwarded-For" = Option<String>, Header, description = "Client address recorded in place of the peer address"),
        ("User-Agent" = Option<String>, Header, description = "Fallback when the body omits user_agent")
    ),
    responses(
        (status = 201, description = "Record appended", body = SurveyAcceptedSchema),
        (status = 400, description = "Body missing, not JSON, or not an object", body = ErrorSchema),
        (status = 413, description = "Body larger than the accepted size", body = ErrorSchema),
        (status = 422, description = "One or more fields failed validation", body = ErrorSchema),
        (status = 500, description = "Integrity or storage fault", body = ErrorSchema)
    ),
    tags = ["survey"],
    operation_id = "submitSurvey"
)]
#[post("/v1/survey")]
pub async fn submit_survey(
    state: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Payload,
) -> ApiResult<HttpResponse> {
    let payload = parse_body(&req, body).await?;
    let request = SurveyIntakeRequest {
        payload,
        metadata: request_metadata(&req),
    };
    state.survey_intake.submit(request).await?;
    Ok(HttpResponse::Created().json(json!({ "status": "ok" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::{fixture, rstest};

    use crate::domain::{Pseudonym, StoredSurveyRecord, SurveyIntakeService};
    use crate::outbound::survey_log::InMemorySurveyLog;
    use crate::test_support::{FixtureClock, at};

    #[fixture]
    fn log() -> Arc<InMemorySurveyLog> {
        Arc::new(InMemorySurveyLog::new())
    }

    fn state_for(log: &Arc<InMemorySurveyLog>) -> web::Data<HttpState> {
        let clock = FixtureClock::new(at(10, 15));
        let service = SurveyIntakeService::new(log.clone(), Arc::new(clock));
        web::Data::new(HttpState::new(Arc::new(service)))
    }

    fn alice() -> Value {
        json!({
            "name": "Alice",
            "email": "Alice@Example.com",
            "age": 30,
            "consent": true,
            "rating": 5,
        })
    }

    async fn post(
        log: &Arc<InMemorySurveyLog>,
        request: actix_test::TestRequest,
    ) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(state_for(log))
                .service(submit_survey),
        )
        .await;
        let response =
            actix_test::call_service(&app, request.uri("/v1/survey").to_request()).await;
        let status = response.status();
        let body = actix_test::read_body(response).await;
        let value = serde_json::from_slice(&body).expect("json response body");
        (status, value)
    }

    #[rstest]
    #[actix_web::test]
    async fn accepted_submission_returns_created(log: Arc<InMemorySurveyLog>) {
        let request = actix_test::TestRequest::post()
            .insert_header((FORWARDED_FOR, "203.0.113.9"))
            .insert_header((header::USER_AGENT, "curl/8.0"))
            .set_json(alice());

        let (status, body) = post(&log, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"status": "ok"}));

        let lines = log.lines();
        assert_eq!(lines.len(), 1);
        let record: StoredSurveyRecord =
            serde_json::from_str(&lines[0]).expect("stored record parses");
        assert_eq!(
            record.submission_id().as_ref(),
            Pseudonym::of("alice@example.com2024010110").as_ref()
        );
        assert_eq!(record.ip(), "203.0.113.9");
        assert_eq!(record.user_agent(), Some("curl/8.0"));
    }

    #[rstest]
    #[actix_web::test]
    async fn peer_address_is_used_without_forwarded_header(log: Arc<InMemorySurveyLog>) {
        let peer = "198.51.100.4:40000".parse().expect("socket address");
        let request = actix_test::TestRequest::post()
            .peer_addr(peer)
            .set_json(alice());

        let (status, _) = post(&log, request).await;
        assert_eq!(status, StatusCode::CREATED);
        let record: StoredSurveyRecord =
            serde_json::from_str(&log.lines()[0]).expect("stored record parses");
        assert_eq!(record.ip(), "198.51.100.4");
    }

    #[rstest]
    #[case::no_body(actix_test::TestRequest::post().insert_header((header::CONTENT_TYPE, "application/json")))]
    #[case::no_content_type(actix_test::TestRequest::post().set_payload(r#"{"name":"Alice"}"#))]
    #[case::plain_text(
        actix_test::TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload(r#"{"name":"Alice"}"#)
    )]
    #[case::malformed(
        actix_test::TestRequest::post()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
    )]
    #[case::not_an_object(actix_test::TestRequest::post().set_json(json!([1, 2, 3])))]
    #[actix_web::test]
    async fn unusable_bodies_are_invalid_json(
        log: Arc<InMemorySurveyLog>,
        #[case] request: actix_test::TestRequest,
    ) {
        let (status, body) = post(&log, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.get("error"), Some(&json!("invalid_json")));
        assert!(log.is_empty());
    }

    #[rstest]
    #[actix_web::test]
    async fn long_comments_under_the_body_limit_are_accepted(log: Arc<InMemorySurveyLog>) {
        let mut payload = alice();
        payload["comments"] = json!("x".repeat(300 * 1024));
        let request = actix_test::TestRequest::post().set_json(payload);

        let (status, body) = post(&log, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"status": "ok"}));
        let record: StoredSurveyRecord =
            serde_json::from_str(&log.lines()[0]).expect("stored record parses");
        assert_eq!(record.comments().map(str::len), Some(300 * 1024));
    }

    #[rstest]
    #[actix_web::test]
    async fn bodies_over_the_limit_are_payload_too_large(log: Arc<InMemorySurveyLog>) {
        let mut payload = alice();
        payload["comments"] = json!("x".repeat(SURVEY_BODY_LIMIT));
        let request = actix_test::TestRequest::post().set_json(payload);

        let (status, body) = post(&log, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body.get("error"), Some(&json!("payload_too_large")));
        assert_eq!(
            body.get("detail"),
            Some(&json!(format!("Body must not exceed {SURVEY_BODY_LIMIT} bytes")))
        );
        assert!(log.is_empty());
    }

    #[rstest]
    #[case::consent_false("consent", json!(false))]
    #[case::age_negative("age", json!(-5))]
    #[case::rating_high("rating", json!(6))]
    #[case::email_malformed("email", json!("not-an-email"))]
    #[actix_web::test]
    async fn rule_violations_are_unprocessable(
        log: Arc<InMemorySurveyLog>,
        #[case] field: &str,
        #[case] value: Value,
    ) {
        let mut payload = alice();
        payload[field] = value;
        let request = actix_test::TestRequest::post().set_json(payload);

        let (status, body) = post(&log, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.get("error"), Some(&json!("validation_error")));
        let fields: Vec<&str> = body
            .get("detail")
            .and_then(Value::as_array)
            .expect("issue list")
            .iter()
            .filter_map(|issue| issue.get("field").and_then(Value::as_str))
            .collect();
        assert_eq!(fields, [field]);
        assert!(log.is_empty());
    }

    #[rstest]
    #[case("application/json", true)]
    #[case("application/json; charset=utf-8", true)]
    #[case("Application/JSON", true)]
    #[case("application/vnd.survey+json", true)]
    #[case("text/json", false)]
    #[case("text/plain", false)]
    fn json_media_types(#[case] content_type: &str, #[case] expected: bool) {
        let req = actix_test::TestRequest::default()
            .insert_header((header::CONTENT_TYPE, content_type))
            .to_http_request();
        assert_eq!(is_json_media_type(req.headers()), expected);
    }
}
