//! Survey intake service library.
//!
//! Accepts survey submissions over HTTP, pseudonymises identifying fields,
//! and appends one JSON record per submission to an append-only log.
//!
//! - [`domain`]: validation, pseudonymisation, records, and ports.
//! - [`inbound`]: actix-web handlers and HTTP error mapping.
//! - [`outbound`]: survey log adapters.
//! - [`settings`]: OrthoConfig-backed service configuration.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use domain::TraceId;
pub use middleware::Trace;
/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
