//! Piper local synthesis: the text goes to stdin, raw 16-bit mono PCM
//! comes back on stdout and is wrapped into WAV for playback.

use std::io::Cursor;
use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use astral_app::ports::{AudioHandle, TextToSpeech};
use astral_domain::error::ServiceError;

use crate::config::PiperConfig;
use crate::error::SpeechError;

pub struct PiperTts {
    config: PiperConfig,
}

/// Wrap little-endian 16-bit mono samples into a WAV file.
fn wav_from_pcm(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::with_capacity(pcm.len() + 44));
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for sample in pcm.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([sample[0], sample[1]]))?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}

impl PiperTts {
    #[must_use]
    pub fn new(config: PiperConfig) -> Self {
        Self { config }
    }

    fn program(&self) -> String {
        self.config.executable.display().to_string()
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.config.executable);
        command
            .arg("--model")
            .arg(&self.config.model_path)
            .arg("--output_raw")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.config.model_path
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let mut child = self.command().spawn().map_err(|source| SpeechError::Spawn {
            program: self.program(),
            source,
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(SpeechError::ProcessFailed {
                program: self.program(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        wav_from_pcm(&output.stdout, self.config.sample_rate).map_err(SpeechError::Wav)
    }
}

impl TextToSpeech for PiperTts {
    #[tracing::instrument(skip_all, fields(chars = text.len()))]
    async fn speak(&self, text: &str) -> Result<AudioHandle, ServiceError> {
        if text.trim().is_empty() {
            return Ok(AudioHandle::Bytes(Vec::new()));
        }
        let audio = self.synthesize(text).await.map_err(|err| {
            tracing::warn!(error = %err, "piper synthesis failed");
            err.into_service()
        })?;
        tracing::debug!(bytes = audio.len(), "piper synthesis done");
        Ok(AudioHandle::Bytes(audio))
    }
}
