//! Configuration read from the environment.
//!
//! Every variable is `BOLETA_CHAT__<SECTION>__<FIELD>`, e.g.
//! `BOLETA_CHAT__STORAGE__SNAPSHOT_PATH=/var/lib/boleta/last.json`. A `.env`
//! file in the working directory is read first. Only the OpenAI key is
//! mandatory, and the bare `OPENAI_API_KEY` works too.
//!
//! ```no_run
//! let config = boleta_chat::config::AppConfig::load()?;
//! config.validate()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod ai;
mod error;
mod extraction;
mod server;
mod storage;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use extraction::ExtractionConfig;
pub use server::{Environment, ServerConfig};
pub use storage::StorageConfig;

use secrecy::Secret;
use serde::Deserialize;

/// Plain variable accepted for the API key when the prefixed one is absent.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Root application configuration
///
/// Every section has defaults; only the API key must be supplied.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, limits)
    #[serde(default)]
    pub server: ServerConfig,

    /// AI provider configuration (OpenAI key, models)
    #[serde(default)]
    pub ai: AiConfig,

    /// Receipt extraction tunables
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Snapshot, uploads and static file locations
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Reads `.env` and the `BOLETA_CHAT__*` variables.
    ///
    /// Values are only parsed here; call [`AppConfig::validate`] for range checks.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config: AppConfig = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("BOLETA_CHAT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        if config.ai.openai_api_key.is_none() {
            config.ai.openai_api_key = std::env::var(OPENAI_API_KEY_VAR).ok().map(Secret::new);
        }

        Ok(config)
    }

    /// Range and presence checks across every section, first failure wins.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.extraction.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
