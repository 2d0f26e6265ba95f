//! Failover Transcriber - Tries an ordered chain of transcribers.
//!
//! Any error from one link moves on to the next. A link that answers ends the
//! chain, even when its text is blank; blank text is then reported as
//! `TranscriptionError::Empty` rather than retried.
//!
//! # Example
//!
//! ```ignore
//! let transcriber = FailoverTranscriber::new(OpenAITranscriber::new(config.clone(), "gpt-4o-transcribe")?)
//!     .with_fallback(OpenAITranscriber::new(config.clone(), "gpt-4o-mini-transcribe")?)
//!     .with_fallback(OpenAITranscriber::new(config, "whisper-1")?);
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::ports::{AudioClip, Transcriber, Transcript, TranscriptionError};

/// Ordered chain of transcribers with fallback on error.
#[derive(Clone)]
pub struct FailoverTranscriber {
    chain: Vec<Arc<dyn Transcriber>>,
}

impl FailoverTranscriber {
    /// Creates a chain with a single primary transcriber.
    pub fn new(primary: impl Transcriber + 'static) -> Self {
        Self {
            chain: vec![Arc::new(primary)],
        }
    }

    /// Creates a chain from already shared transcribers, in order.
    pub fn from_chain(chain: Vec<Arc<dyn Transcriber>>) -> Self {
        Self { chain }
    }

    /// Appends a fallback tried after every earlier link failed.
    pub fn with_fallback(mut self, fallback: impl Transcriber + 'static) -> Self {
        self.chain.push(Arc::new(fallback));
        self
    }

    /// Number of links in the chain.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

#[async_trait]
impl Transcriber for FailoverTranscriber {
    async fn transcribe(&self, audio: &AudioClip) -> Result<Transcript, TranscriptionError> {
        let mut last_error = None;

        for (index, link) in self.chain.iter().enumerate() {
            match link.transcribe(audio).await {
                Ok(transcript) if transcript.text.trim().is_empty() => {
                    tracing::warn!(model = %transcript.model, "Transcription returned no text");
                    return Err(TranscriptionError::Empty);
                }
                Ok(transcript) => {
                    if index > 0 {
                        tracing::info!(model = %transcript.model, attempt = index + 1, "Transcribed with fallback model");
                    }
                    return Ok(transcript);
                }
                Err(err) => {
                    tracing::warn!(
                        link = %link.describe(),
                        attempt = index + 1,
                        "Transcription failed, trying next model: {}",
                        err
                    );
                    last_error = Some(err);
                }
            }
        }

        Err(TranscriptionError::Exhausted {
            attempts: self.chain.len(),
            last: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no hay modelos de transcripción configurados".to_string()),
        })
    }

    fn describe(&self) -> String {
        self.chain
            .iter()
            .map(|link| link.describe())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
