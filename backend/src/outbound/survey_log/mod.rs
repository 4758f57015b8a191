//! Adapters implementing the [`SurveyLog`](crate::domain::ports::SurveyLog)
//! port.
//!
//! - [`JsonLinesSurveyLog`]: appends newline-terminated records to a file.
//! - [`InMemorySurveyLog`]: keeps lines in memory for tests and local runs.

mod json_lines;
mod memory;

pub use json_lines::JsonLinesSurveyLog;
pub use memory::InMemorySurveyLog;
