//! AI Provider Adapters.
//!
//! Implementations of the AIProvider and Transcriber ports.
//!
//! ## Available Adapters
//!
//! - `OpenAIProvider` - OpenAI Responses API (multimodal, JSON mode)
//! - `OpenAITranscriber` - OpenAI speech-to-text, one model per instance
//! - `FailoverTranscriber` - Ordered transcriber chain with fallback on error
//! - `MockAIProvider` / `MockTranscriber` - Configurable mocks for testing

mod failover_transcriber;
mod mock_provider;
mod openai_provider;
mod openai_transcriber;

pub use failover_transcriber::FailoverTranscriber;
pub use mock_provider::{MockAIProvider, MockResponse, MockTranscriber};
pub use openai_provider::{OpenAIConfig, OpenAIProvider, DEFAULT_BASE_URL};
pub use openai_transcriber::OpenAITranscriber;
