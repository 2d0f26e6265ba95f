//! OpenAI Provider - Implementation of AIProvider for OpenAI's Responses API.
//!
//! Supports multimodal input (text plus inline images) and JSON output mode.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("gpt-4o")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let provider = OpenAIProvider::new(config)?;
//! ```
//!
//! # Response normalisation
//!
//! The generated text is the concatenation of every `output_text` part of
//! every `message` item in `output`. A response with no such part is an
//! `AIError::Parse`; there is no fallback to other fields.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, ContentPart, FinishReason,
    MessageRole, ResponseFormat, TokenUsage,
};

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for the OpenAI provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model used when a request does not name one.
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl OpenAIConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 0,
        }
    }

    /// Sets the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Exposes the API key (for making requests).
    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI API provider implementation.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Creates a new OpenAI provider with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the responses endpoint URL.
    fn responses_url(&self) -> String {
        format!("{}/responses", self.config.base_url)
    }

    /// Converts our request to OpenAI's format.
    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        let mut input = Vec::new();

        if let Some(ref prompt) = request.system_prompt {
            input.push(InputMessage {
                role: "system",
                content: vec![InputContent::InputText {
                    text: prompt.clone(),
                }],
            });
        }

        for msg in &request.messages {
            let role = match msg.role {
                MessageRole::System => "system",
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            };
            let content = msg
                .content
                .iter()
                .map(|part| match (part, msg.role) {
                    (ContentPart::Text { text }, MessageRole::Assistant) => {
                        InputContent::OutputText { text: text.clone() }
                    }
                    (ContentPart::Text { text }, _) => InputContent::InputText { text: text.clone() },
                    (ContentPart::Image { url, detail }, _) => InputContent::InputImage {
                        image_url: url.clone(),
                        detail: detail.as_str(),
                    },
                })
                .collect();
            input.push(InputMessage { role, content });
        }

        OpenAIRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.config.model.clone()),
            input,
            max_output_tokens: request.max_tokens,
            text: match request.response_format {
                ResponseFormat::Text => None,
                ResponseFormat::JsonObject => Some(TextOptions {
                    format: TextFormat {
                        kind: "json_object",
                    },
                }),
            },
        }
    }

    /// Sends a request.
    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let openai_request = self.to_openai_request(request);

        self.client
            .post(self.responses_url())
            .bearer_auth(self.config.api_key())
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout))
    }

    /// Parses a response into our format.
    async fn parse_response(&self, response: Response) -> Result<CompletionResponse, AIError> {
        let response = handle_response_status(response).await?;

        let body: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        let prices = price_per_million(&body.model);
        normalize_response(body, prices)
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let mut retry_count = 0;

        loop {
            let result = match self.send_request(&request).await {
                Ok(response) => self.parse_response(response).await,
                Err(err) => Err(err),
            };

            match result {
                Ok(completion) => {
                    tracing::info!(
                        operation = %request.metadata.operation,
                        trace_id = %request.metadata.trace_id,
                        model = %completion.model,
                        prompt_tokens = completion.usage.prompt_tokens,
                        completion_tokens = completion.usage.completion_tokens,
                        cost_cents = completion.usage.estimated_cost_cents,
                        "Completion finished"
                    );
                    return Ok(completion);
                }
                Err(err) if err.is_retryable() && retry_count < self.config.max_retries => {
                    tracing::warn!(
                        trace_id = %request.metadata.trace_id,
                        attempt = retry_count + 1,
                        "Retrying completion after error: {}",
                        err
                    );
                }
                Err(err) => return Err(err),
            }

            // Exponential backoff: 1s, 2s, 4s, ...
            sleep(Duration::from_secs(1 << retry_count.min(5))).await;
            retry_count += 1;
        }
    }
}

/// Maps reqwest transport failures to provider errors.
pub(crate) fn map_transport_error(e: reqwest::Error, timeout: Duration) -> AIError {
    if e.is_timeout() {
        AIError::Timeout {
            timeout_secs: timeout.as_secs() as u32,
        }
    } else if e.is_connect() {
        AIError::network(format!("Connection failed: {}", e))
    } else {
        AIError::network(e.to_string())
    }
}

/// Checks the HTTP status and turns failures into provider errors.
pub(crate) async fn handle_response_status(response: Response) -> Result<Response, AIError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    Err(status_error(status.as_u16(), &error_body))
}

/// Provider error for a non-success status code.
fn status_error(status: u16, error_body: &str) -> AIError {
    match status {
        401 | 403 => AIError::AuthenticationFailed,
        429 => AIError::rate_limited(parse_retry_after(error_body)),
        400 | 404 | 413 | 415 | 422 => AIError::InvalidRequest(error_message(error_body)),
        500..=599 => AIError::unavailable(format!(
            "Server error {}: {}",
            status,
            error_message(error_body)
        )),
        _ => AIError::network(format!(
            "Unexpected status {}: {}",
            status,
            error_message(error_body)
        )),
    }
}

/// Extracts `error.message` from an OpenAI error body, or returns the body as is.
fn error_message(error_body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| error_body.to_string())
}

/// Parses retry-after from error response.
fn parse_retry_after(error_body: &str) -> u32 {
    // OpenAI sometimes says "try again in Xs"; default to 30 seconds.
    let message = error_message(error_body);
    if let Some(idx) = message.find("try again in ") {
        let rest = &message[idx + 13..];
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(secs) = digits.parse::<u32>() {
            return secs;
        }
    }
    30
}

/// (prompt, completion) price in cents per 1M tokens.
fn price_per_million(model: &str) -> (u64, u64) {
    match model {
        m if m.starts_with("gpt-4o-mini") => (15, 60),
        m if m.starts_with("gpt-4o") => (250, 1000),
        m if m.starts_with("gpt-4.1-mini") => (40, 160),
        m if m.starts_with("gpt-4.1") => (200, 800),
        _ => (250, 1000),
    }
}

/// Estimated cost in cents.
fn calculate_cost(prices: (u64, u64), prompt_tokens: u32, completion_tokens: u32) -> u32 {
    let prompt_cost = (prompt_tokens as u64 * prices.0) / 1_000_000;
    let completion_cost = (completion_tokens as u64 * prices.1) / 1_000_000;
    (prompt_cost + completion_cost) as u32
}

/// Turns a Responses API body into a completion, failing when it carries no text.
fn normalize_response(
    body: OpenAIResponse,
    prices: (u64, u64),
) -> Result<CompletionResponse, AIError> {
    let mut text = String::new();
    let mut refusal = None;

    for item in &body.output {
        if let OutputItem::Message { content } = item {
            for part in content {
                match part {
                    OutputContent::OutputText { text: t } => text.push_str(t),
                    OutputContent::Refusal { refusal: r } => refusal = Some(r.clone()),
                    OutputContent::Other => {}
                }
            }
        }
    }

    if text.is_empty() {
        return Err(match refusal {
            Some(reason) => AIError::content_filtered(reason),
            None => AIError::parse("Response contains no output text"),
        });
    }

    let finish_reason = match body
        .incomplete_details
        .as_ref()
        .and_then(|d| d.reason.as_deref())
    {
        Some("max_output_tokens") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        _ => FinishReason::Stop,
    };

    let usage = body
        .usage
        .map(|u| {
            TokenUsage::new(
                u.input_tokens,
                u.output_tokens,
                calculate_cost(prices, u.input_tokens, u.output_tokens),
            )
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        content: text,
        usage,
        model: body.model,
        finish_reason,
    })
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    input: Vec<InputMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<TextOptions>,
}

#[derive(Debug, Serialize)]
struct InputMessage {
    role: &'static str,
    content: Vec<InputContent>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InputContent {
    InputText { text: String },
    OutputText { text: String },
    InputImage { image_url: String, detail: &'static str },
}

#[derive(Debug, Serialize)]
struct TextOptions {
    format: TextFormat,
}

#[derive(Debug, Serialize)]
struct TextFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: String,
    #[serde(default)]
    output: Vec<OutputItem>,
    usage: Option<OpenAIUsage>,
    incomplete_details: Option<IncompleteDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<OutputContent>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputContent {
    OutputText { text: String },
    Refusal { refusal: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct IncompleteDetails {
    reason: Option<String>,
}
