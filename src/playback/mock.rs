use super::{decode_pcm, AudioPlayer};
use crate::models::AudioPayload;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub struct MockAudioPlayer {
    played: Arc<Mutex<Vec<AudioPayload>>>,
    should_fail: bool,
}

impl MockAudioPlayer {
    pub fn new() -> Self {
        Self {
            played: Arc::new(Mutex::new(Vec::new())),
            should_fail: false,
        }
    }

    pub fn with_failure(mut self, should_fail: bool) -> Self {
        self.should_fail = should_fail;
        self
    }

    pub fn get_play_count(&self) -> usize {
        self.played.lock().unwrap().len()
    }

    pub fn played(&self) -> Vec<AudioPayload> {
        self.played.lock().unwrap().clone()
    }
}

impl Default for MockAudioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioPlayer for MockAudioPlayer {
    async fn play(&self, audio: &AudioPayload) -> Result<()> {
        if self.should_fail {
            return Err(Error::Playback("Mock playback failure".to_string()));
        }
        decode_pcm(audio)?;
        self.played.lock().unwrap().push(audio.clone());
        Ok(())
    }
}
