//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid bind address {0}")]
    InvalidAddress(String),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Upload limit must be greater than zero")]
    InvalidUploadLimit,

    #[error("Invalid AI provider timeout")]
    InvalidAiTimeout,

    #[error("Invalid AI base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Extraction max_output_tokens must be greater than zero")]
    InvalidMaxTokens,

    #[error("At least one transcription model is required")]
    NoTranscriptionModels,
}
