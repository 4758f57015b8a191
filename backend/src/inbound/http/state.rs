//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::SurveyIntake;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Driving port for survey submissions.
    pub survey_intake: Arc<dyn SurveyIntake>,
}

impl HttpState {
    /// Construct state around the survey intake use-case.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use survey_backend::domain::SurveyIntakeService;
    /// use survey_backend::inbound::http::state::HttpState;
    /// use survey_backend::outbound::survey_log::InMemorySurveyLog;
    ///
    /// let service = SurveyIntakeService::new(
    ///     Arc::new(InMemorySurveyLog::new()),
    ///     Arc::new(DefaultClock),
    /// );
    /// let state = HttpState::new(Arc::new(service));
    /// let _intake = state.survey_intake.clone();
    /// ```
    pub fn new(survey_intake: Arc<dyn SurveyIntake>) -> Self {
        Self { survey_intake }
    }
}
