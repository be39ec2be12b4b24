//! Gemini chat, image description, and illustrated story client
//!
//! Keeps a multi-turn chat session, encodes images for inline upload,
//! generates structured story openings with continuation, and plays back
//! synthesized narration.

pub mod ai;
pub mod error;
pub mod media;
pub mod models;
pub mod parser;
pub mod playback;
pub mod prompts;
pub mod story;
pub mod studio;

pub use error::{Error, Result};
