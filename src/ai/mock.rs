use super::{ChatService, ChatSession, ContentService, PromptPart, SpeechService};
use crate::models::AudioPayload;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn next_response(responses: &[String], index: usize) -> Option<String> {
    if responses.is_empty() {
        None
    } else {
        Some(responses[index % responses.len()].clone())
    }
}

#[derive(Default)]
struct ChatCounters {
    sessions_created: usize,
    system_instructions: Vec<String>,
    messages: Vec<String>,
}

#[derive(Clone)]
pub struct MockChatClient {
    counters: Arc<Mutex<ChatCounters>>,
    replies: Arc<Mutex<Vec<String>>>,
    fail_start: bool,
    fail_send: Arc<Mutex<bool>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Mutex::new(ChatCounters::default())),
            replies: Arc::new(Mutex::new(Vec::new())),
            fail_start: false,
            fail_send: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_reply(self, reply: String) -> Self {
        self.replies.lock().unwrap().push(reply);
        self
    }

    pub fn with_start_failure(mut self, should_fail: bool) -> Self {
        self.fail_start = should_fail;
        self
    }

    pub fn with_send_failure(self, should_fail: bool) -> Self {
        self.set_send_failure(should_fail);
        self
    }

    /// Toggle send failures on sessions already handed out.
    pub fn set_send_failure(&self, should_fail: bool) {
        *self.fail_send.lock().unwrap() = should_fail;
    }

    pub fn sessions_created(&self) -> usize {
        self.counters.lock().unwrap().sessions_created
    }

    pub fn send_count(&self) -> usize {
        self.counters.lock().unwrap().messages.len()
    }

    pub fn sent_messages(&self) -> Vec<String> {
        self.counters.lock().unwrap().messages.clone()
    }

    pub fn system_instructions(&self) -> Vec<String> {
        self.counters.lock().unwrap().system_instructions.clone()
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    async fn start_chat(&self, system_instruction: &str) -> Result<Arc<dyn ChatSession>> {
        if self.fail_start {
            return Err(Error::AiProvider("Mock chat start failure".to_string()));
        }

        let mut counters = self.counters.lock().unwrap();
        counters.sessions_created += 1;
        counters
            .system_instructions
            .push(system_instruction.to_string());

        Ok(Arc::new(MockChatSession {
            id: Uuid::new_v4(),
            counters: Arc::clone(&self.counters),
            replies: Arc::clone(&self.replies),
            fail_send: Arc::clone(&self.fail_send),
        }))
    }
}

struct MockChatSession {
    id: Uuid,
    counters: Arc<Mutex<ChatCounters>>,
    replies: Arc<Mutex<Vec<String>>>,
    fail_send: Arc<Mutex<bool>>,
}

#[async_trait]
impl ChatSession for MockChatSession {
    fn id(&self) -> Uuid {
        self.id
    }

    async fn send_message(&self, message: &str) -> Result<String> {
        if *self.fail_send.lock().unwrap() {
            return Err(Error::AiProvider("Mock chat send failure".to_string()));
        }

        let mut counters = self.counters.lock().unwrap();
        counters.messages.push(message.to_string());
        let index = counters.messages.len() - 1;

        let replies = self.replies.lock().unwrap();
        Ok(next_response(&replies, index).unwrap_or_else(|| format!("You said: {}", message)))
    }
}

#[derive(Clone)]
pub struct MockContentClient {
    text_responses: Arc<Mutex<Vec<String>>>,
    structured_responses: Arc<Mutex<Vec<String>>>,
    requests: Arc<Mutex<Vec<Vec<PromptPart>>>>,
    schemas: Arc<Mutex<Vec<serde_json::Value>>>,
    text_calls: Arc<Mutex<usize>>,
    structured_calls: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockContentClient {
    pub fn new() -> Self {
        Self {
            text_responses: Arc::new(Mutex::new(Vec::new())),
            structured_responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            schemas: Arc::new(Mutex::new(Vec::new())),
            text_calls: Arc::new(Mutex::new(0)),
            structured_calls: Arc::new(Mutex::new(0)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_text_response(self, response: String) -> Self {
        self.text_responses.lock().unwrap().push(response);
        self
    }

    pub fn with_structured_response(self, response: String) -> Self {
        self.structured_responses.lock().unwrap().push(response);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Prompt parts of every call, in call order.
    pub fn requests(&self) -> Vec<Vec<PromptPart>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn schemas(&self) -> Vec<serde_json::Value> {
        self.schemas.lock().unwrap().clone()
    }

    /// Record a call and return its index among calls of the same kind.
    fn record(&self, parts: Vec<PromptPart>, calls: &Mutex<usize>) -> Result<usize> {
        self.requests.lock().unwrap().push(parts);

        let mut count = calls.lock().unwrap();
        *count += 1;

        if *self.should_fail.lock().unwrap() {
            return Err(Error::AiProvider("Mock content failure".to_string()));
        }
        Ok(*count - 1)
    }
}

impl Default for MockContentClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentService for MockContentClient {
    async fn generate_text(&self, parts: Vec<PromptPart>) -> Result<String> {
        let index = self.record(parts, &self.text_calls)?;
        let responses = self.text_responses.lock().unwrap();
        Ok(next_response(&responses, index)
            .unwrap_or_else(|| "A mock description of the image.".to_string()))
    }

    async fn generate_structured(
        &self,
        parts: Vec<PromptPart>,
        schema: serde_json::Value,
    ) -> Result<String> {
        self.schemas.lock().unwrap().push(schema);
        let index = self.record(parts, &self.structured_calls)?;
        let responses = self.structured_responses.lock().unwrap();
        Ok(next_response(&responses, index).unwrap_or_else(|| {
            serde_json::json!({
                "story": "The mock lighthouse blinked once, then went dark.",
                "prompts": [
                    "Who turned off the light?",
                    "What waits beyond the rocks?",
                    "Why has the keeper vanished?"
                ]
            })
            .to_string()
        }))
    }
}

#[derive(Clone)]
pub struct MockSpeechClient {
    audio: Option<AudioPayload>,
    should_fail: bool,
    prompts: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockSpeechClient {
    pub fn new() -> Self {
        Self {
            // Two silent 16-bit PCM samples.
            audio: Some(AudioPayload {
                data: "AAAAAA==".to_string(),
                mime_type: "audio/L16;codec=pcm;rate=24000".to_string(),
            }),
            should_fail: false,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_audio(mut self, audio: Option<AudioPayload>) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_failure(mut self, should_fail: bool) -> Self {
        self.should_fail = should_fail;
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// `(prompt, voice)` pairs of every call.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockSpeechClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechService for MockSpeechClient {
    async fn synthesize(&self, prompt: &str, voice: &str) -> Result<Option<AudioPayload>> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), voice.to_string()));

        if self.should_fail {
            return Err(Error::AiProvider("Mock speech failure".to_string()));
        }
        Ok(self.audio.clone())
    }
}
