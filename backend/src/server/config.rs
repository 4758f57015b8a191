//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use survey_backend::settings::{ConfigError, SurveySettings};

/// Resolved configuration for creating the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) log_path: PathBuf,
}

impl ServerConfig {
    /// Construct a server configuration from explicit values.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, log_path: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr,
            log_path: log_path.into(),
        }
    }

    /// Resolve defaults and validate loaded settings.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the bind address is malformed.
    pub fn from_settings(settings: &SurveySettings) -> Result<Self, ConfigError> {
        Ok(Self::new(settings.bind_addr()?, settings.log_path()))
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Return the survey log location.
    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
