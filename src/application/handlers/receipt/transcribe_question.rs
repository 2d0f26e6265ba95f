//! TranscribeQuestionHandler - Spoken questions about the last receipt.
//!
//! Transcribes the clip first, then answers the transcript the same way a
//! typed question is answered, labelled as coming from audio.

use std::sync::Arc;

use thiserror::Error;

use super::ask_question::{AskQuestionError, AskQuestionHandler};
use crate::domain::receipt::QuestionSource;
use crate::ports::{AudioClip, Transcriber, TranscriptionError};

/// Command carrying an uploaded audio question.
#[derive(Debug, Clone)]
pub struct TranscribeQuestionCommand {
    pub audio: AudioClip,
}

impl TranscribeQuestionCommand {
    pub fn new(filename: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            audio: AudioClip::new(filename, bytes),
        }
    }
}

/// Result of a spoken question.
#[derive(Debug, Clone)]
pub struct TranscribeQuestionResult {
    pub transcript: String,
    pub answer: String,
    /// Model that produced the transcript.
    pub transcription_model: String,
}

#[derive(Debug, Clone, Error)]
pub enum TranscribeQuestionError {
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    #[error(transparent)]
    Question(#[from] AskQuestionError),
}

/// Handler for spoken questions.
pub struct TranscribeQuestionHandler {
    transcriber: Arc<dyn Transcriber>,
    questions: Arc<AskQuestionHandler>,
}

impl TranscribeQuestionHandler {
    pub fn new(transcriber: Arc<dyn Transcriber>, questions: Arc<AskQuestionHandler>) -> Self {
        Self {
            transcriber,
            questions,
        }
    }

    pub async fn handle(
        &self,
        cmd: TranscribeQuestionCommand,
    ) -> Result<TranscribeQuestionResult, TranscribeQuestionError> {
        tracing::info!(
            filename = %cmd.audio.filename,
            bytes = cmd.audio.bytes.len(),
            chain = %self.transcriber.describe(),
            "Transcribing question"
        );

        let transcript = self.transcriber.transcribe(&cmd.audio).await?;
        let text = transcript.text.trim();
        if text.is_empty() {
            return Err(TranscriptionError::Empty.into());
        }

        let answered = self.questions.answer(text, QuestionSource::Audio).await?;

        Ok(TranscribeQuestionResult {
            transcript: text.to_string(),
            answer: answered.answer,
            transcription_model: transcript.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{FailoverTranscriber, MockAIProvider, MockTranscriber};
    use crate::adapters::storage::InMemoryDocumentCache;
    use crate::domain::receipt::ExtractedDocument;
    use crate::ports::AIError;
    use serde_json::json;

    fn cache_with_receipt() -> InMemoryDocumentCache {
        InMemoryDocumentCache::with_document(
            ExtractedDocument::from_value(json!({"series": "B001", "totals": {"total": 50.0}}))
                .unwrap(),
        )
    }

    fn handler(
        transcriber: impl Transcriber + 'static,
        provider: &MockAIProvider,
        cache: InMemoryDocumentCache,
    ) -> TranscribeQuestionHandler {
        let questions = AskQuestionHandler::new(Arc::new(provider.clone()), Arc::new(cache), "gpt-4o-mini");
        TranscribeQuestionHandler::new(Arc::new(transcriber), Arc::new(questions))
    }

    #[tokio::test]
    async fn transcribes_then_answers() {
        let provider = MockAIProvider::new().with_response("El total es 50.00.");
        let handler = handler(
            MockTranscriber::new("gpt-4o-transcribe").with_text(" ¿Cuánto es el total? "),
            &provider,
            cache_with_receipt(),
        );

        let result = handler
            .handle(TranscribeQuestionCommand::new(None, b"webm".to_vec()))
            .await
            .unwrap();

        assert_eq!(result.transcript, "¿Cuánto es el total?");
        assert_eq!(result.answer, "El total es 50.00.");
        assert_eq!(result.transcription_model, "gpt-4o-transcribe");

        let prompt = provider.get_calls()[0].messages[0].text();
        assert!(prompt.ends_with("Pregunta (audio): ¿Cuánto es el total?"));
    }

    #[tokio::test]
    async fn falls_back_through_model_chain() {
        let provider = MockAIProvider::new().with_response("B001");
        let chain = FailoverTranscriber::new(
            MockTranscriber::new("gpt-4o-transcribe").with_error(AIError::unavailable("down")),
        )
        .with_fallback(
            MockTranscriber::new("gpt-4o-mini-transcribe").with_error(AIError::network("reset")),
        )
        .with_fallback(MockTranscriber::new("whisper-1").with_text("¿Serie?"));
        let handler = handler(chain, &provider, cache_with_receipt());

        let result = handler
            .handle(TranscribeQuestionCommand::new(Some("q.webm".into()), b"a".to_vec()))
            .await
            .unwrap();

        assert_eq!(result.transcription_model, "whisper-1");
    }

    #[tokio::test]
    async fn blank_transcript_is_an_error() {
        let provider = MockAIProvider::new();
        let handler = handler(
            MockTranscriber::new("whisper-1").with_text(""),
            &provider,
            cache_with_receipt(),
        );

        let err = handler
            .handle(TranscribeQuestionCommand::new(None, b"a".to_vec()))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "No se obtuvo texto de la transcripción.");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_document_after_transcription() {
        let provider = MockAIProvider::new();
        let transcriber = MockTranscriber::new("whisper-1").with_text("¿Total?");
        let handler = handler(transcriber.clone(), &provider, InMemoryDocumentCache::new());

        let err = handler
            .handle(TranscribeQuestionCommand::new(None, b"a".to_vec()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TranscribeQuestionError::Question(AskQuestionError::NoDocument)
        ));
        assert_eq!(transcriber.received_filenames(), vec!["pregunta.webm"]);
    }
}
