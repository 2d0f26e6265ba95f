//! OpenAI Transcriber - Implementation of the Transcriber port for a single
//! OpenAI speech-to-text model.
//!
//! Uploads the clip as multipart form data to `/audio/transcriptions` and
//! reads the `text` field of the JSON answer. A blank answer is returned as
//! is; `FailoverTranscriber` decides what blank means for the chain.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use super::openai_provider::{handle_response_status, map_transport_error, OpenAIConfig};
use crate::ports::{AIError, AudioClip, Transcriber, Transcript, TranscriptionError};

/// Speech-to-text through one OpenAI model.
pub struct OpenAITranscriber {
    config: OpenAIConfig,
    model: String,
    client: Client,
}

impl OpenAITranscriber {
    /// Creates a transcriber for `model`, sharing the key, base URL and timeout of `config`.
    pub fn new(config: OpenAIConfig, model: impl Into<String>) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            model: model.into(),
            client,
        })
    }

    /// Model this transcriber calls.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn transcriptions_url(&self) -> String {
        format!("{}/audio/transcriptions", self.config.base_url)
    }

    async fn request(&self, audio: &AudioClip) -> Result<String, AIError> {
        let file = Part::bytes(audio.bytes.clone()).file_name(audio.filename.clone());
        let form = Form::new()
            .text("model", self.model.clone())
            .part("file", file);

        let response = self
            .client
            .post(self.transcriptions_url())
            .bearer_auth(self.config.api_key())
            .multipart(form)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout))?;

        let response = handle_response_status(response).await?;
        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse transcription: {}", e)))?;

        Ok(body.text)
    }
}

#[async_trait]
impl Transcriber for OpenAITranscriber {
    async fn transcribe(&self, audio: &AudioClip) -> Result<Transcript, TranscriptionError> {
        let text = self
            .request(audio)
            .await
            .map_err(|e| TranscriptionError::provider(&self.model, e))?;

        let text = text.trim();
        tracing::debug!(model = %self.model, chars = text.len(), "Transcription finished");

        Ok(Transcript {
            text: text.to_string(),
            model: self.model.clone(),
        })
    }

    fn describe(&self) -> String {
        self.model.clone()
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}
