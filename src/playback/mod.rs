//! Audio playback for synthesized speech
//!
//! Gemini returns raw 16-bit little-endian mono PCM as base64. Players decode
//! that payload and resolve once playback has finished.

pub mod mock;
pub mod wav;

pub use mock::MockAudioPlayer;
pub use wav::WavPlayer;

use crate::models::AudioPayload;
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;

pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Resolves when playback ends; errors when it cannot start or fails.
    async fn play(&self, audio: &AudioPayload) -> Result<()>;
}

/// Decoded mono PCM audio.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmAudio {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

impl PcmAudio {
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

pub fn decode_pcm(audio: &AudioPayload) -> Result<PcmAudio> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&audio.data)
        .map_err(|e| Error::Playback(format!("Failed to decode base64 audio: {}", e)))?;

    if bytes.len() % 2 != 0 {
        return Err(Error::Playback(format!(
            "PCM payload has odd length {}",
            bytes.len()
        )));
    }

    let samples = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    Ok(PcmAudio {
        sample_rate: sample_rate_from_mime(&audio.mime_type),
        samples,
    })
}

/// Reads `rate=` from a MIME type such as `audio/L16;codec=pcm;rate=24000`.
pub fn sample_rate_from_mime(mime_type: &str) -> u32 {
    mime_type
        .split(';')
        .filter_map(|param| param.trim().strip_prefix("rate="))
        .find_map(|rate| rate.parse().ok())
        .unwrap_or(DEFAULT_SAMPLE_RATE)
}
