use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::{ContentService, PromptPart};
use crate::{parser, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<ContentGenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentGenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

/// One-shot multimodal `generateContent` calls.
pub struct GeminiContentClient {
    http: GeminiHttpClient,
}

impl GeminiContentClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(60),
                client,
            ),
        }
    }

    async fn send(&self, request: ContentRequest) -> Result<String> {
        let response: GenerateContentResponse = self.http.generate_content(&request).await?;
        parser::extract_text(&response)
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiContentClient);

#[async_trait]
impl ContentService for GeminiContentClient {
    async fn generate_text(&self, parts: Vec<PromptPart>) -> Result<String> {
        tracing::debug!("Generating content from {} prompt parts", parts.len());

        self.send(ContentRequest {
            contents: vec![Content::from_prompt_parts(None, parts)],
            generation_config: None,
        })
        .await
    }

    async fn generate_structured(
        &self,
        parts: Vec<PromptPart>,
        schema: serde_json::Value,
    ) -> Result<String> {
        tracing::debug!(
            "Generating structured content from {} prompt parts",
            parts.len()
        );

        self.send(ContentRequest {
            contents: vec![Content::from_prompt_parts(None, parts)],
            generation_config: Some(ContentGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: schema,
            }),
        })
        .await
    }
}
