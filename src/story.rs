//! Story state and sequenced continuation.

use crate::models::{ImageInput, StoryGenerationResult};
use crate::playback::AudioPlayer;
use crate::studio::{Operation, Studio, CONTINUE_FALLBACK};
use crate::{Error, Result};
use tokio::sync::Mutex;
use tracing::{error, info};

/// Blank line placed between paragraphs.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, PartialEq)]
pub struct StoryState {
    pub story: String,
    pub genre: String,
    pub style: String,
    pub inspiration_prompts: Vec<String>,
}

impl StoryState {
    pub fn new(result: StoryGenerationResult, genre: &str, style: &str) -> Self {
        Self {
            story: result.story.trim().to_string(),
            genre: genre.to_string(),
            style: style.to_string(),
            inspiration_prompts: result.prompts,
        }
    }

    pub fn append_paragraph(&mut self, paragraph: &str) {
        self.story.push_str(PARAGRAPH_SEPARATOR);
        self.story.push_str(paragraph.trim());
    }

    pub fn last_paragraph(&self) -> &str {
        paragraphs(&self.story).last().unwrap_or("")
    }
}

/// Non-empty, trimmed paragraphs of `text`.
pub fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split(PARAGRAPH_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

const SENTENCE_END: &[char] = &['.', '!', '?', '"', '\'', '\u{2026}'];

/// Strip an echoed `prefix` from `text`.
///
/// The echo must end the paragraph or a sentence. A prefix that merely shares
/// leading words with the new text is kept.
fn strip_echo<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(prefix)?;
    let ends_sentence = prefix.ends_with(SENTENCE_END) && rest.starts_with(char::is_whitespace);
    if rest.is_empty() || rest.starts_with('\n') || ends_sentence {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// Drop any text of `continuation` that repeats paragraphs of `story_so_far`.
///
/// Handles both a separate echoed paragraph and an echo prefixed to the new
/// paragraph. Returns the remaining paragraphs joined by blank lines.
pub fn remove_repeated_text(story_so_far: &str, continuation: &str) -> String {
    let prior: Vec<&str> = paragraphs(story_so_far).collect();
    let mut text = continuation.trim();

    let whole = story_so_far.trim();
    if !whole.is_empty() {
        if let Some(rest) = strip_echo(text, whole) {
            text = rest;
        }
    }
    if let Some(last) = prior.last() {
        if let Some(rest) = strip_echo(text, last) {
            text = rest;
        }
    }

    paragraphs(text)
        .filter(|p| !prior.contains(p))
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContinueOutcome {
    /// The new paragraph, already appended to the story.
    Appended(String),
    /// The continuation failed; carries the text to show instead.
    Failed(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadAloudOutcome {
    Played,
    /// The provider returned no audio.
    NoAudio,
}

struct ActiveStory {
    image: ImageInput,
    state: StoryState,
}

/// One story's lifecycle: generate, then continue any number of times.
///
/// Generation and continuation hold the same lock for the whole provider call,
/// so continuations are applied strictly in order.
pub struct StorySession {
    active: Mutex<Option<ActiveStory>>,
}

impl StorySession {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }

    pub async fn state(&self) -> Option<StoryState> {
        self.active.lock().await.as_ref().map(|a| a.state.clone())
    }

    /// Start a new story, discarding the previous one.
    pub async fn generate(
        &self,
        studio: &Studio,
        image: ImageInput,
        genre: &str,
        style: &str,
    ) -> Result<StoryState> {
        let mut active = self.active.lock().await;
        *active = None;

        let result = studio.generate_story(&image, genre, style).await?;
        let state = StoryState::new(result, genre, style);
        info!(
            "Generated {} story with {} inspiration prompts",
            genre,
            state.inspiration_prompts.len()
        );

        *active = Some(ActiveStory {
            image,
            state: state.clone(),
        });
        Ok(state)
    }

    pub async fn continue_story(&self, studio: &Studio) -> Result<ContinueOutcome> {
        let mut guard = self.active.lock().await;
        let active = guard
            .as_mut()
            .ok_or_else(|| Error::Invariant("No story to continue".to_string()))?;

        let state = &mut active.state;
        match studio
            .try_continue_story(&state.story, &active.image, &state.genre, &state.style)
            .await
        {
            Ok(paragraph) => {
                state.append_paragraph(&paragraph);
                Ok(ContinueOutcome::Appended(paragraph))
            }
            Err(e) => {
                error!("{} failed: {}", Operation::ContinueStory, e);
                Ok(ContinueOutcome::Failed(CONTINUE_FALLBACK))
            }
        }
    }

    /// Narrate the current story through `player`.
    ///
    /// Missing audio is reported as [`ReadAloudOutcome::NoAudio`]; playback
    /// failures are errors.
    pub async fn read_aloud(
        &self,
        studio: &Studio,
        player: &dyn AudioPlayer,
    ) -> Result<ReadAloudOutcome> {
        let story = self
            .state()
            .await
            .map(|s| s.story)
            .ok_or_else(|| Error::Invariant("No story to read".to_string()))?;

        let Some(audio) = studio.synthesize_speech(&story).await else {
            return Ok(ReadAloudOutcome::NoAudio);
        };

        player.play(&audio).await?;
        Ok(ReadAloudOutcome::Played)
    }
}

impl Default for StorySession {
    fn default() -> Self {
        Self::new()
    }
}
