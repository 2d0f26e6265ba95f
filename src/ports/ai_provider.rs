//! AI Provider Port - Interface for multimodal LLM integrations.
//!
//! This port abstracts every call to the inference provider, so the receipt
//! handlers can extract documents and answer questions without coupling to a
//! specific vendor API.
//!
//! # Design
//!
//! - Messages carry ordered content parts (text and images)
//! - Callers choose the model per request (extraction and Q&A use different ones)
//! - JSON output mode is requested through `ResponseFormat`
//! - Error types for common failure modes (rate limits, auth, unavailability)
//!
//! # Example
//!
//! ```ignore
//! let request = CompletionRequest::new(RequestMetadata::new("extract"))
//!     .with_model("gpt-4o")
//!     .with_message(Message::user_parts(vec![
//!         ContentPart::text("Extrae los datos"),
//!         ContentPart::image(data_url, ImageDetail::Low),
//!     ]))
//!     .with_response_format(ResponseFormat::JsonObject)
//!     .with_max_tokens(1200);
//!
//! let response = provider.complete(request).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Port for AI/LLM provider interactions.
///
/// Implementations connect to external AI services and translate between the
/// provider-specific API and these types.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Generate a single completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;
}

/// Request for AI completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model override; the provider default is used when absent.
    pub model: Option<String>,
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// System prompt to guide model behavior.
    pub system_prompt: Option<String>,
    /// Maximum output tokens to generate.
    pub max_tokens: Option<u32>,
    /// Output format constraint.
    pub response_format: ResponseFormat,
    /// Request metadata for tracing.
    pub metadata: RequestMetadata,
}

impl CompletionRequest {
    /// Creates a new completion request with required metadata.
    pub fn new(metadata: RequestMetadata) -> Self {
        Self {
            model: None,
            messages: Vec::new(),
            system_prompt: None,
            max_tokens: None,
            response_format: ResponseFormat::Text,
            metadata,
        }
    }

    /// Sets the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Adds a message to the conversation.
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Sets the response format.
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message.
    pub role: MessageRole,
    /// Ordered content parts.
    pub content: Vec<ContentPart>,
}

impl Message {
    /// Creates a text-only message.
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentPart::text(text)],
        }
    }

    /// Creates a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text)
    }

    /// Creates a user message from several parts.
    pub fn user_parts(content: Vec<ContentPart>) -> Self {
        Self {
            role: MessageRole::User,
            content,
        }
    }

    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::Image { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of image parts.
    pub fn image_count(&self) -> usize {
        self.content
            .iter()
            .filter(|part| matches!(part, ContentPart::Image { .. }))
            .count()
    }
}

/// Role of the message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions (guides model behavior).
    System,
    /// User input.
    User,
    /// Assistant (model) response.
    Assistant,
}

/// One piece of message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text { text: String },
    /// An image given as a URL (usually a `data:` URL).
    Image { url: String, detail: ImageDetail },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(url: impl Into<String>, detail: ImageDetail) -> Self {
        Self::Image {
            url: url.into(),
            detail,
        }
    }
}

/// How closely the provider should look at an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    #[default]
    Low,
    High,
    Auto,
}

impl ImageDetail {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageDetail::Low => "low",
            ImageDetail::High => "high",
            ImageDetail::Auto => "auto",
        }
    }
}

/// Output format requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Free text.
    #[default]
    Text,
    /// A single JSON object.
    JsonObject,
}

/// Request metadata for tracing.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// Logical operation (e.g. "extract", "answer").
    pub operation: String,
    /// Trace ID for correlating logs.
    pub trace_id: String,
}

impl RequestMetadata {
    /// Creates metadata with a fresh trace id.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            trace_id: Uuid::new_v4().to_string(),
        }
    }
}

/// Response from AI completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text.
    pub content: String,
    /// Token usage and cost.
    pub usage: TokenUsage,
    /// Model that generated the response.
    pub model: String,
    /// Why the model stopped generating.
    pub finish_reason: FinishReason,
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the completion.
    pub completion_tokens: u32,
    /// Total tokens (prompt + completion).
    pub total_tokens: u32,
    /// Estimated cost in cents.
    pub estimated_cost_cents: u32,
}

impl TokenUsage {
    /// Creates new token usage.
    pub fn new(prompt_tokens: u32, completion_tokens: u32, cost_cents: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
            estimated_cost_cents: cost_cents,
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop (end of response).
    Stop,
    /// Hit the output token limit.
    Length,
    /// Content was filtered for safety.
    ContentFilter,
}

/// AI provider errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AIError {
    /// Rate limited by provider.
    #[error("límite de solicitudes alcanzado: reintenta en {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Content was filtered for safety.
    #[error("contenido bloqueado por el proveedor: {reason}")]
    ContentFiltered {
        /// Reason for filtering.
        reason: String,
    },

    /// Provider is unavailable.
    #[error("proveedor no disponible: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("autenticación rechazada por el proveedor")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("error de red: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("respuesta ilegible del proveedor: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("solicitud inválida: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("el proveedor no respondió en {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl AIError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates a content filtered error.
    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AIError::RateLimited { .. }
                | AIError::Unavailable { .. }
                | AIError::Network(_)
                | AIError::Timeout { .. }
        )
    }
}
