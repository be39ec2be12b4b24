use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::{ChatService, ChatSession};
use crate::models::ChatRole;
use crate::{parser, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    system_instruction: &'a Content,
    contents: &'a [Content],
}

pub struct GeminiChatClient {
    http: Arc<GeminiHttpClient>,
}

impl GeminiChatClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: Arc::new(GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(30),
                client,
            )),
        }
    }

    #[cfg(test)]
    fn with_base_url(self, base_url: String) -> Self {
        let http = Arc::try_unwrap(self.http)
            .unwrap_or_else(|_| panic!("with_base_url called after a session was started"));
        Self {
            http: Arc::new(http.with_base_url(base_url)),
        }
    }
}

#[async_trait]
impl ChatService for GeminiChatClient {
    async fn start_chat(&self, system_instruction: &str) -> Result<Arc<dyn ChatSession>> {
        let session = GeminiChatSession {
            id: Uuid::new_v4(),
            http: Arc::clone(&self.http),
            system_instruction: Content::text(None, system_instruction),
            history: Mutex::new(Vec::new()),
        };
        tracing::info!(
            "Started Gemini chat session {} (model: {})",
            session.id,
            self.http.model()
        );
        Ok(Arc::new(session))
    }
}

/// Multi-turn Gemini conversation.
///
/// `generateContent` is stateless, so the session keeps the turn history and
/// replays it with every message. A turn is recorded only once the model has
/// answered it.
pub struct GeminiChatSession {
    id: Uuid,
    http: Arc<GeminiHttpClient>,
    system_instruction: Content,
    history: Mutex<Vec<Content>>,
}

impl GeminiChatSession {
    pub async fn turn_count(&self) -> usize {
        self.history.lock().await.len() / 2
    }
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    fn id(&self) -> Uuid {
        self.id
    }

    async fn send_message(&self, message: &str) -> Result<String> {
        // Held across the request so concurrent turns cannot interleave.
        let mut history = self.history.lock().await;

        let mut contents = history.clone();
        contents.push(Content::text(Some(ChatRole::User.as_str()), message));

        let request = ChatRequest {
            system_instruction: &self.system_instruction,
            contents: &contents,
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;
        let reply = parser::extract_text(&response)?;

        contents.push(Content::text(Some(ChatRole::Model.as_str()), reply.clone()));
        *history = contents;

        Ok(reply)
    }
}
