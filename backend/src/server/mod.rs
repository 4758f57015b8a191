//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
use tracing::info;

use survey_backend::Trace;
#[cfg(debug_assertions)]
use survey_backend::doc::ApiDoc;
use survey_backend::domain::SurveyIntakeService;
use survey_backend::domain::ports::SurveyLog;
use survey_backend::inbound::http::health::{HealthState, live, ping, ready};
use survey_backend::inbound::http::state::HttpState;
use survey_backend::inbound::http::survey::submit_survey;
use survey_backend::outbound::survey_log::JsonLinesSurveyLog;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(ping)
        .service(submit_survey)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Build the intake service over the JSON-lines log at `config.log_path`.
///
/// # Errors
/// Returns [`std::io::Error`] when the log cannot be opened for appending.
fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let log = JsonLinesSurveyLog::open(config.log_path()).map_err(std::io::Error::other)?;
    info!(path = %log.path().display(), "survey log ready");
    let log: Arc<dyn SurveyLog> = Arc::new(log);
    let service = SurveyIntakeService::new(log, Arc::new(DefaultClock));
    Ok(web::Data::new(HttpState::new(Arc::new(service))))
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: resolved [`ServerConfig`] with the bind address and log path.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when opening the survey log, binding the
/// socket, or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let bind_addr = config.bind_addr();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "survey service listening");
    health_state.mark_ready();
    Ok(server)
}
