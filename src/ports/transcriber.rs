//! Transcriber Port - Speech-to-text for spoken questions.

use async_trait::async_trait;
use thiserror::Error;

use super::AIError;

/// Filename used when the client uploads audio without one.
pub const DEFAULT_AUDIO_FILENAME: &str = "pregunta.webm";

/// Port for speech-to-text providers.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio clip to text.
    async fn transcribe(&self, audio: &AudioClip) -> Result<Transcript, TranscriptionError>;

    /// Model or chain description, for logs.
    fn describe(&self) -> String;
}

/// Uploaded audio.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl AudioClip {
    /// Creates a clip, falling back to the default filename when none is given.
    pub fn new(filename: Option<String>, bytes: Vec<u8>) -> Self {
        let filename = filename
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUDIO_FILENAME.to_string());
        Self { filename, bytes }
    }
}

/// Result of a transcription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    /// Model that produced the text.
    pub model: String,
}

/// Transcription errors.
#[derive(Debug, Clone, Error)]
pub enum TranscriptionError {
    /// A single provider call failed.
    #[error("la transcripción con {model} falló: {source}")]
    Provider {
        model: String,
        #[source]
        source: AIError,
    },

    /// Every model in the chain failed.
    #[error("Fallaron los {attempts} modelos de transcripción; último error: {last}")]
    Exhausted { attempts: usize, last: String },

    /// The provider answered with no text.
    #[error("No se obtuvo texto de la transcripción.")]
    Empty,
}

impl TranscriptionError {
    pub fn provider(model: impl Into<String>, source: AIError) -> Self {
        Self::Provider {
            model: model.into(),
            source,
        }
    }
}
