//! Microphone capture through an external recorder program.
//!
//! Each window spawns the recorder with a fixed duration and reads the
//! WAV file it writes to stdout. `arecord` flags are used; any program
//! accepting the same flags works.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::process::Command;

use astral_app::ports::AudioSource;
use astral_domain::error::ServiceError;

use crate::config::RecorderConfig;
use crate::error::SpeechError;

pub struct CommandRecorder {
    config: RecorderConfig,
    closed: AtomicBool,
}

/// Whole seconds to record, rounded up and at least one.
fn window_secs(window: Duration) -> u64 {
    let secs = window.as_secs() + u64::from(window.subsec_nanos() > 0);
    secs.max(1)
}

impl CommandRecorder {
    #[must_use]
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            closed: AtomicBool::new(false),
        }
    }

    fn args(&self, window: Duration) -> Vec<String> {
        vec![
            "-q".to_string(),
            "-f".to_string(),
            "S16_LE".to_string(),
            "-c".to_string(),
            "1".to_string(),
            "-r".to_string(),
            self.config.sample_rate.to_string(),
            "-t".to_string(),
            "wav".to_string(),
            "-d".to_string(),
            window_secs(window).to_string(),
        ]
    }

    async fn capture(&self, window: Duration) -> Result<Vec<u8>, SpeechError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SpeechError::Closed);
        }
        let output = Command::new(&self.config.program)
            .args(self.args(window))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| SpeechError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(SpeechError::ProcessFailed {
                program: self.config.program.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

impl AudioSource for CommandRecorder {
    async fn record(&self, window: Duration) -> Result<Vec<u8>, ServiceError> {
        self.capture(window).await.map_err(SpeechError::into_service)
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!(program = %self.config.program, "recorder closed");
        }
    }
}
