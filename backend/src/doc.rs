//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: the survey submission endpoint plus the ping and health checks
//! - **Schemas**: domain type wrappers ([`ErrorSchema`], [`ErrorCodeSchema`],
//!   [`FieldIssueSchema`], [`SurveySubmissionSchema`]) that provide OpenAPI
//!   definitions without coupling domain types to the utoipa framework
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, FieldIssueSchema, SurveyAcceptedSchema, SurveySubmissionSchema,
};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Survey intake API",
        description = "Accepts pseudonymised survey submissions and exposes health checks."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::survey::submit_survey,
        crate::inbound::http::health::ping,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        FieldIssueSchema,
        SurveySubmissionSchema,
        SurveyAcceptedSchema,
        crate::inbound::http::health::PingResponse
    )),
    tags(
        (name = "survey", description = "Survey submission"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
