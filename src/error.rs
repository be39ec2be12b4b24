//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Image is {size} bytes; the limit is {limit} bytes")]
    ImageTooLarge { size: u64, limit: u64 },

    #[error("Image encoding error: {0}")]
    Encoding(String),

    #[error("Structured output error: {0}")]
    StructuredOutput(String),

    #[error("Story generation failed: {0}")]
    StoryGeneration(String),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;
