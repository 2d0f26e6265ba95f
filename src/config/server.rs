//! HTTP listener and request limits

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use super::error::ValidationError;

/// Longest request timeout accepted, in seconds. Extraction of a large image
/// can take most of a minute, so the ceiling stays generous.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Where the server listens and how much it accepts per request.
///
/// Missing fields fall back to [`ServerConfig::default`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,

    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set
    pub log_level: String,

    pub request_timeout_secs: u64,

    /// Body cap for every route, receipt images and audio clips included
    pub max_upload_bytes: usize,

    /// Comma-separated allowed origins; any origin when unset
    pub cors_origins: Option<String>,
}

/// Deployment environment. Only production changes behaviour (JSON logs).
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: Environment::Development,
            log_level: "info,boleta_chat=debug,tower_http=debug".to_string(),
            request_timeout_secs: 120,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    /// Listener address built from host and port.
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|_| ValidationError::InvalidAddress(addr))
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configured origins with blanks dropped; empty means "allow any".
    pub fn cors_origins_list(&self) -> Vec<String> {
        let Some(raw) = self.cors_origins.as_deref() else {
            return Vec::new();
        };
        raw.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_upload_bytes == 0 {
            return Err(ValidationError::InvalidUploadLimit);
        }
        self.socket_addr().map(|_| ())
    }
}
