//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenAI API key
    pub openai_api_key: Option<Secret<String>>,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model reading receipt images
    #[serde(default = "default_extraction_model")]
    pub extraction_model: String,

    /// Model answering questions
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Speech-to-text models, tried in order (comma-separated)
    #[serde(default = "default_transcription_models")]
    pub transcription_models: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failure
    #[serde(default)]
    pub max_retries: u32,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an OpenAI key is configured
    pub fn has_openai(&self) -> bool {
        self.openai_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Transcription models in fallback order
    pub fn transcription_models_list(&self) -> Vec<String> {
        self.transcription_models
            .split(',')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect()
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_openai() {
            return Err(ValidationError::MissingRequired("OPENAI_API_KEY"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ValidationError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ValidationError::InvalidAiTimeout);
        }
        if self.transcription_models_list().is_empty() {
            return Err(ValidationError::NoTranscriptionModels);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            base_url: default_base_url(),
            extraction_model: default_extraction_model(),
            chat_model: default_chat_model(),
            transcription_models: default_transcription_models(),
            timeout_secs: default_timeout(),
            max_retries: 0,
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_extraction_model() -> String {
    "gpt-4o".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_transcription_models() -> String {
    "gpt-4o-transcribe,gpt-4o-mini-transcribe,whisper-1".to_string()
}

fn default_timeout() -> u64 {
    120
}
