//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod survey_intake;
mod survey_log;

pub use survey_intake::{SurveyIntake, SurveyIntakeRequest, SurveyReceipt};
#[cfg(test)]
pub use survey_log::MockSurveyLog;
pub use survey_log::{SurveyLog, SurveyLogError};
pub(crate) use survey_log::ensure_single_line;
