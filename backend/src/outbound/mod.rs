//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **survey_log**: append-only record sinks (JSON-lines file, memory)
//!
//! Adapters are thin translators between domain types and the medium. They
//! contain no business logic.

pub mod survey_log;
