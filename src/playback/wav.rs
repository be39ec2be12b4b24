use super::{decode_pcm, AudioPlayer, PcmAudio};
use crate::models::AudioPayload;
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::Local;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Writes speech to a WAV file and optionally hands it to an external player.
///
/// Without a player command the written file is the playback result.
pub struct WavPlayer {
    output_dir: PathBuf,
    command: Option<Vec<String>>,
}

impl WavPlayer {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            command: None,
        }
    }

    /// Player invoked as `<command> [args...] <wav path>`, e.g. `aplay -q`.
    pub fn with_command(mut self, command: Option<&str>) -> Self {
        self.command = command
            .map(|c| c.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|parts| !parts.is_empty());
        self
    }

    fn write_wav_sync(pcm: PcmAudio, path: PathBuf) -> Result<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: pcm.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(&path, spec)?;
        for sample in pcm.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Decode `audio` and write it as a WAV file, returning its path.
    pub async fn write_wav(&self, audio: &AudioPayload) -> Result<PathBuf> {
        let pcm = decode_pcm(audio)?;
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let filename = format!(
            "speech_{}_{}.wav",
            Local::now().format("%Y%m%d_%H%M%S"),
            Uuid::new_v4()
        );
        let path = self.output_dir.join(filename);

        tracing::debug!(
            "Writing {:.1}s of audio to {}",
            pcm.duration_secs(),
            path.display()
        );

        tokio::task::spawn_blocking({
            let path = path.clone();
            move || Self::write_wav_sync(pcm, path)
        })
        .await
        .map_err(|e| Error::Invariant(format!("WAV writer task join error: {}", e)))??;

        Ok(path)
    }
}

#[async_trait]
impl AudioPlayer for WavPlayer {
    async fn play(&self, audio: &AudioPayload) -> Result<()> {
        let path = self.write_wav(audio).await?;

        let Some((program, args)) = self.command.as_ref().and_then(|c| c.split_first()) else {
            tracing::info!("Saved narration to {}", path.display());
            return Ok(());
        };

        tracing::info!("Playing {} with {}", path.display(), program);
        let status = tokio::process::Command::new(program)
            .args(args)
            .arg(&path)
            .status()
            .await
            .map_err(|e| Error::Playback(format!("Failed to start {}: {}", program, e)))?;

        if !status.success() {
            return Err(Error::Playback(format!(
                "{} exited with {}",
                program, status
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silent_audio() -> AudioPayload {
        AudioPayload {
            data: "AAAAAA==".to_string(),
            mime_type: "audio/L16;codec=pcm;rate=16000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_write_wav_produces_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let player = WavPlayer::new(dir.path());

        let path = player.write_wav(&silent_audio()).await.unwrap();
        assert_eq!(path.extension().unwrap(), "wav");

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 16000);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len(), 2);
    }

    #[tokio::test]
    async fn test_play_without_command_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let player = WavPlayer::new(dir.path()).with_command(None);

        player.play(&silent_audio()).await.unwrap();

        let written = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(written, 1);
    }

    #[tokio::test]
    async fn test_play_rejects_undecodable_audio() {
        let dir = tempfile::tempdir().unwrap();
        let player = WavPlayer::new(dir.path());

        let err = player
            .play(&AudioPayload {
                data: "%%%".to_string(),
                mime_type: "audio/L16".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Playback(_)));
    }

    #[tokio::test]
    async fn test_missing_player_command_is_playback_error() {
        let dir = tempfile::tempdir().unwrap();
        let player =
            WavPlayer::new(dir.path()).with_command(Some("definitely-not-a-real-player-binary"));

        let err = player.play(&silent_audio()).await.unwrap_err();
        assert!(matches!(err, Error::Playback(_)));
    }

    #[test]
    fn test_blank_command_is_ignored() {
        let player = WavPlayer::new(Path::new("/tmp")).with_command(Some("   "));
        assert!(player.command.is_none());
    }
}
