use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::SpeechService;
use crate::models::AudioPayload;
use crate::{parser, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SpeechRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: SpeechGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechGenerationConfig {
    response_modalities: Vec<String>,
    speech_config: SpeechConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

pub struct GeminiSpeechClient {
    http: GeminiHttpClient,
}

impl GeminiSpeechClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(120),
                client,
            ),
        }
    }
}

#[cfg(test)]
super::impl_with_gemini_base_url!(GeminiSpeechClient);

#[async_trait]
impl SpeechService for GeminiSpeechClient {
    async fn synthesize(&self, prompt: &str, voice: &str) -> Result<Option<AudioPayload>> {
        let request = SpeechRequest {
            contents: vec![Content::text(None, prompt)],
            generation_config: SpeechGenerationConfig {
                response_modalities: vec!["AUDIO".to_string()],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.to_string(),
                        },
                    },
                },
            },
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;
        let audio = parser::extract_audio(&response);

        match &audio {
            Some(payload) => tracing::debug!(
                "Gemini returned audio with mime_type: {}",
                payload.mime_type
            ),
            None => tracing::warn!("Gemini speech response contained no audio"),
        }

        Ok(audio)
    }
}
