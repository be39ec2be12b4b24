//! Request orchestration between the front end and the provider.
//!
//! [`Studio`] owns the single chat session and issues the one-shot image,
//! story, and speech calls. Each operation has a fixed failure mode: most
//! degrade to a placeholder, story generation propagates.

use crate::ai::{
    ChatService, ChatSession, ContentService, GeminiChatClient, GeminiContentClient,
    GeminiSpeechClient, PromptPart, SpeechService,
};
use crate::models::{AudioPayload, Config, ImageInput, StoryGenerationResult};
use crate::{parser, prompts, story, Error, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const CHAT_FALLBACK: &str = "Sorry, I encountered an error. Please try again.";
pub const ANALYZE_FALLBACK: &str = "Sorry, I couldn't analyze the image. Please try again.";
pub const CONTINUE_FALLBACK: &str = "Sorry, I couldn't continue the story. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ChatTurn,
    AnalyzeImage,
    GenerateStory,
    ContinueStory,
    SynthesizeSpeech,
}

/// How an operation reports failure to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Return this placeholder text instead of an error.
    Fallback(&'static str),
    /// Return `None` instead of an error.
    Absent,
    /// Propagate the error.
    Propagate,
}

impl Operation {
    pub fn failure_mode(self) -> FailureMode {
        match self {
            Operation::ChatTurn => FailureMode::Fallback(CHAT_FALLBACK),
            Operation::AnalyzeImage => FailureMode::Fallback(ANALYZE_FALLBACK),
            Operation::GenerateStory => FailureMode::Propagate,
            Operation::ContinueStory => FailureMode::Fallback(CONTINUE_FALLBACK),
            Operation::SynthesizeSpeech => FailureMode::Absent,
        }
    }

    /// Placeholder shown in place of an error, for fallback operations only.
    pub fn fallback_text(self) -> Option<&'static str> {
        match self.failure_mode() {
            FailureMode::Fallback(text) => Some(text),
            FailureMode::Absent | FailureMode::Propagate => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ChatTurn => "chat turn",
            Operation::AnalyzeImage => "image analysis",
            Operation::GenerateStory => "story generation",
            Operation::ContinueStory => "story continuation",
            Operation::SynthesizeSpeech => "speech synthesis",
        };
        f.write_str(name)
    }
}

fn text_or_fallback(operation: Operation, result: Result<String>) -> String {
    result.unwrap_or_else(|e| {
        error!("{} failed: {}", operation, e);
        operation
            .fallback_text()
            .map_or_else(|| e.to_string(), str::to_string)
    })
}

/// Injectable provider bundle used to construct [`Studio`].
pub struct StudioServices {
    pub chat: Box<dyn ChatService>,
    pub content: Box<dyn ContentService>,
    pub speech: Box<dyn SpeechService>,
}

pub struct Studio {
    chat: Box<dyn ChatService>,
    content: Box<dyn ContentService>,
    speech: Box<dyn SpeechService>,
    chat_session: OnceCell<Arc<dyn ChatSession>>,
}

impl Studio {
    pub fn with_services(services: StudioServices) -> Self {
        Self {
            chat: services.chat,
            content: services.content,
            speech: services.speech,
            chat_session: OnceCell::new(),
        }
    }

    /// Build Gemini-backed services from configuration.
    pub fn from_config(config: &Config) -> Self {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::new();

        info!(
            "Models: chat={}, vision={}, speech={}",
            config.chat_model, config.vision_model, config.speech_model
        );

        Self::with_services(StudioServices {
            chat: Box::new(GeminiChatClient::new_with_client(
                config.api_key.clone(),
                config.chat_model.clone(),
                http_client.clone(),
            )),
            content: Box::new(GeminiContentClient::new_with_client(
                config.api_key.clone(),
                config.vision_model.clone(),
                http_client.clone(),
            )),
            speech: Box::new(GeminiSpeechClient::new_with_client(
                config.api_key.clone(),
                config.speech_model.clone(),
                http_client,
            )),
        })
    }

    /// Id of the chat session, once the first turn has created it.
    pub fn chat_session_id(&self) -> Option<Uuid> {
        self.chat_session.get().map(|session| session.id())
    }

    /// Get-or-create the chat session as one atomic step.
    async fn chat_session(&self) -> Result<&Arc<dyn ChatSession>> {
        self.chat_session
            .get_or_try_init(|| async {
                let session = self.chat.start_chat(prompts::CHAT_SYSTEM).await?;
                info!("Created chat session {}", session.id());
                Ok::<_, Error>(session)
            })
            .await
    }

    pub async fn send_chat_turn(&self, message: &str) -> String {
        text_or_fallback(Operation::ChatTurn, self.try_chat_turn(message).await)
    }

    async fn try_chat_turn(&self, message: &str) -> Result<String> {
        let session = self.chat_session().await?;
        session.send_message(message).await
    }

    pub async fn analyze_image(&self, prompt: &str, image: &ImageInput) -> String {
        let parts = vec![
            PromptPart::Text(prompt.to_string()),
            PromptPart::Image(image.clone()),
        ];

        text_or_fallback(
            Operation::AnalyzeImage,
            self.content.generate_text(parts).await,
        )
    }

    /// Generate an opening paragraph plus 3-5 inspiration prompts.
    ///
    /// Provider failures and undecodable output both become
    /// [`Error::StoryGeneration`].
    pub async fn generate_story(
        &self,
        image: &ImageInput,
        genre: &str,
        style: &str,
    ) -> Result<StoryGenerationResult> {
        let parts = vec![
            PromptPart::Image(image.clone()),
            PromptPart::Text(prompts::story_generation(genre, style)),
        ];

        let result = match self
            .content
            .generate_structured(parts, parser::story_response_schema())
            .await
        {
            Ok(raw) => parser::parse_story_generation(&raw),
            Err(e) => Err(e),
        };

        result.map_err(|e| {
            error!("{} failed: {}", Operation::GenerateStory, e);
            Error::StoryGeneration(e.to_string())
        })
    }

    pub async fn continue_story(
        &self,
        story_so_far: &str,
        image: &ImageInput,
        genre: &str,
        style: &str,
    ) -> String {
        text_or_fallback(
            Operation::ContinueStory,
            self.try_continue_story(story_so_far, image, genre, style).await,
        )
    }

    /// Continuation with failures still visible, for callers that must not
    /// append a placeholder to the story.
    pub(crate) async fn try_continue_story(
        &self,
        story_so_far: &str,
        image: &ImageInput,
        genre: &str,
        style: &str,
    ) -> Result<String> {
        let parts = vec![
            PromptPart::Image(image.clone()),
            PromptPart::Text(prompts::story_continuation(story_so_far, genre, style)),
        ];

        let raw = self.content.generate_text(parts).await?;
        let paragraph = story::remove_repeated_text(story_so_far, &raw);
        if paragraph.is_empty() {
            return Err(Error::AiProvider(
                "Continuation only repeated earlier text".to_string(),
            ));
        }
        Ok(paragraph)
    }

    pub async fn synthesize_speech(&self, text: &str) -> Option<AudioPayload> {
        match self
            .speech
            .synthesize(&prompts::speech(text), prompts::SPEECH_VOICE)
            .await
        {
            Ok(Some(audio)) => Some(audio),
            Ok(None) => {
                warn!("{} returned no audio", Operation::SynthesizeSpeech);
                None
            }
            Err(e) => {
                error!("{} failed: {}", Operation::SynthesizeSpeech, e);
                None
            }
        }
    }
}
