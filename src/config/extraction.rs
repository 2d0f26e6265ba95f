//! Receipt extraction configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::ports::ImageDetail;

/// Receipt extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Output token cap for the extraction call
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Image analysis detail (low, high, auto)
    #[serde(default)]
    pub image_detail: ImageDetail,

    /// Reject receipts that violate the schema instead of reporting issues
    #[serde(default)]
    pub enforce_schema: bool,
}

impl ExtractionConfig {
    /// Validate extraction configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_output_tokens == 0 {
            return Err(ValidationError::InvalidMaxTokens);
        }
        Ok(())
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: default_max_output_tokens(),
            image_detail: ImageDetail::default(),
            enforce_schema: false,
        }
    }
}

fn default_max_output_tokens() -> u32 {
    1200
}
