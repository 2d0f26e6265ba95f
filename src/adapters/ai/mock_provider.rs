//! Mock AI adapters for testing.
//!
//! `MockAIProvider` and `MockTranscriber` replay queued answers and record
//! what they were asked, so handlers can be tested without network access.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response(r#"{"series": "B001"}"#)
//!     .with_error(AIError::rate_limited(5));
//!
//! let response = provider.complete(request).await?;
//! assert_eq!(provider.call_count(), 1);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{
    AIError, AIProvider, AudioClip, CompletionRequest, CompletionResponse, FinishReason,
    TokenUsage, Transcriber, Transcript, TranscriptionError,
};

/// Model reported when a request does not name one.
const MOCK_MODEL: &str = "mock-model-1";

/// Mock AI provider for testing.
///
/// Configurable to return specific responses or inject errors.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a successful completion.
    Success {
        content: String,
        usage: TokenUsage,
        finish_reason: FinishReason,
    },
    /// Return an error.
    Error(AIError),
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.with_response_full(content, TokenUsage::new(10, 20, 1), FinishReason::Stop)
    }

    /// Adds a successful response with full configuration.
    pub fn with_response_full(
        self,
        content: impl Into<String>,
        usage: TokenUsage,
        finish_reason: FinishReason,
    ) -> Self {
        self.responses.lock().unwrap().push_back(MockResponse::Success {
            content: content.into(),
            usage,
            finish_reason,
        });
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: AIError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockResponse::Error(error));
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Gets the next response or a default.
    fn next_response(&self) -> MockResponse {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: "Mock response".to_string(),
                usage: TokenUsage::new(5, 10, 1),
                finish_reason: FinishReason::Stop,
            })
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| MOCK_MODEL.to_string());
        self.calls.lock().unwrap().push(request);

        match self.next_response() {
            MockResponse::Success {
                content,
                usage,
                finish_reason,
            } => Ok(CompletionResponse {
                content,
                usage,
                model,
                finish_reason,
            }),
            MockResponse::Error(err) => Err(err),
        }
    }
}

/// Mock transcriber for testing.
///
/// Replays queued results; once the queue is empty it answers "Mock transcript".
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    model: String,
    results: Arc<Mutex<VecDeque<Result<String, AIError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockTranscriber {
    /// Creates a mock that reports itself as `model`.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            results: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a transcript text.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.results.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Queues a provider failure.
    pub fn with_error(self, error: AIError) -> Self {
        self.results.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Filenames of the clips received, in order.
    pub fn received_filenames(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, audio: &AudioClip) -> Result<Transcript, TranscriptionError> {
        self.calls.lock().unwrap().push(audio.filename.clone());

        let next = self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Mock transcript".to_string()));

        match next {
            Ok(text) => Ok(Transcript {
                text,
                model: self.model.clone(),
            }),
            Err(err) => Err(TranscriptionError::provider(&self.model, err)),
        }
    }

    fn describe(&self) -> String {
        self.model.clone()
    }
}
