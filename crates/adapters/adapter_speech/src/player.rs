//! Speaker output through an external player program.
//!
//! In-memory audio is written to the player's stdin; files are passed by
//! path. The default `ffplay` flags detect WAV and MP3 alike, so every
//! synthesis backend plays through the same command.

use std::ffi::OsString;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use astral_app::ports::{AudioHandle, AudioSink};
use astral_domain::error::ServiceError;

use crate::config::PlayerConfig;
use crate::error::SpeechError;

pub struct CommandPlayer {
    config: PlayerConfig,
}

impl CommandPlayer {
    #[must_use]
    pub fn new(config: PlayerConfig) -> Self {
        Self { config }
    }

    fn command(&self, input: impl Into<OsString>) -> Command {
        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .arg(input.into())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    async fn output(&self, audio: &AudioHandle) -> Result<(), SpeechError> {
        let spawn_error = |source| SpeechError::Spawn {
            program: self.config.program.clone(),
            source,
        };
        let output = match audio {
            AudioHandle::File(path) => {
                let mut command = self.command(path.as_os_str());
                command.stdin(Stdio::null());
                command.output().await.map_err(spawn_error)?
            }
            AudioHandle::Bytes(bytes) => {
                let mut command = self.command(self.config.stdin_input.as_str());
                command.stdin(Stdio::piped());
                let mut child = command.spawn().map_err(spawn_error)?;
                if let Some(mut stdin) = child.stdin.take() {
                    stdin.write_all(bytes).await?;
                    stdin.shutdown().await?;
                }
                child.wait_with_output().await?
            }
        };
        if !output.status.success() {
            return Err(SpeechError::ProcessFailed {
                program: self.config.program.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl AudioSink for CommandPlayer {
    #[tracing::instrument(skip_all, fields(program = %self.config.program))]
    async fn play(&self, audio: &AudioHandle) -> Result<(), ServiceError> {
        if matches!(audio, AudioHandle::Bytes(bytes) if bytes.is_empty()) {
            return Ok(());
        }
        self.output(audio).await.map_err(|err| {
            tracing::warn!(error = %err, "playback failed");
            err.into_service()
        })
    }
}
