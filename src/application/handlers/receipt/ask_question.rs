//! AskQuestionHandler - Answers questions about the last extracted receipt.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::receipt::prompts::{question_prompt, ANSWER_SYSTEM_PROMPT};
use crate::domain::receipt::QuestionSource;
use crate::ports::{
    AIError, AIProvider, CacheSource, CompletionRequest, DocumentCache, Message, RequestMetadata,
};

/// Command to ask a typed question.
#[derive(Debug, Clone)]
pub struct AskQuestionCommand {
    pub question: String,
}

impl AskQuestionCommand {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
        }
    }
}

/// Result of answering a question.
#[derive(Debug, Clone)]
pub struct AskQuestionResult {
    pub answer: String,
    /// Model that wrote the answer.
    pub model: String,
    /// Where the receipt used as context came from.
    pub source: CacheSource,
}

/// Errors that can occur when answering a question.
#[derive(Debug, Clone, Error)]
pub enum AskQuestionError {
    #[error("La pregunta no puede estar vacía.")]
    EmptyQuestion,

    /// Nothing has been extracted yet.
    #[error("Primero sube una boleta para extraer datos.")]
    NoDocument,

    #[error("No se pudo responder la pregunta: {0}")]
    Provider(#[from] AIError),
}

/// Handler for questions over the cached receipt.
pub struct AskQuestionHandler {
    provider: Arc<dyn AIProvider>,
    cache: Arc<dyn DocumentCache>,
    model: String,
}

impl AskQuestionHandler {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        cache: Arc<dyn DocumentCache>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            cache,
            model: model.into(),
        }
    }

    pub async fn handle(&self, cmd: AskQuestionCommand) -> Result<AskQuestionResult, AskQuestionError> {
        let question = cmd.question.trim();
        if question.is_empty() {
            return Err(AskQuestionError::EmptyQuestion);
        }

        self.answer(question, QuestionSource::Text).await
    }

    /// Answers `question` from the cached receipt.
    pub(crate) async fn answer(
        &self,
        question: &str,
        source: QuestionSource,
    ) -> Result<AskQuestionResult, AskQuestionError> {
        let (document, cache_source) = self
            .cache
            .load()
            .await
            .ok_or(AskQuestionError::NoDocument)?;

        tracing::debug!(source = ?cache_source, question_source = ?source, "Answering from cached receipt");

        let prompt = question_prompt(&document.to_pretty_json(), question, source);
        let request = CompletionRequest::new(RequestMetadata::new("answer_question"))
            .with_model(&self.model)
            .with_system_prompt(ANSWER_SYSTEM_PROMPT)
            .with_message(Message::user(prompt));

        let completion = self.provider.complete(request).await?;

        Ok(AskQuestionResult {
            answer: completion.content,
            model: completion.model,
            source: cache_source,
        })
    }
}
