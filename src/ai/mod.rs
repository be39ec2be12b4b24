//! Generative AI provider integration
//!
//! Capability traits for chat sessions, multimodal content generation, and
//! speech synthesis, with Gemini implementations and in-memory mocks.

pub mod gemini;
pub mod mock;

pub use gemini::{GeminiChatClient, GeminiContentClient, GeminiSpeechClient};
pub use mock::{MockChatClient, MockContentClient, MockSpeechClient};

use crate::models::{AudioPayload, ImageInput};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// One piece of a multimodal prompt, sent in order.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    Text(String),
    Image(ImageInput),
}

/// A provider-held conversation. Each turn is appended to its history.
#[async_trait]
pub trait ChatSession: Send + Sync {
    fn id(&self) -> Uuid;
    async fn send_message(&self, message: &str) -> Result<String>;
}

#[async_trait]
pub trait ChatService: Send + Sync {
    async fn start_chat(&self, system_instruction: &str) -> Result<Arc<dyn ChatSession>>;
}

#[async_trait]
pub trait ContentService: Send + Sync {
    async fn generate_text(&self, parts: Vec<PromptPart>) -> Result<String>;

    /// Generate JSON conforming to `schema`, returned as raw text.
    async fn generate_structured(
        &self,
        parts: Vec<PromptPart>,
        schema: serde_json::Value,
    ) -> Result<String>;
}

#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Returns `Ok(None)` when the response carries no audio.
    async fn synthesize(&self, prompt: &str, voice: &str) -> Result<Option<AudioPayload>>;
}
