//! Wake-word listener — polls short microphone windows for the wake phrase.
//!
//! Each cycle records a window, transcribes it and publishes
//! [`AssistantEvent::WakeWordDetected`] when the phrase is heard. A failed
//! cycle is logged and the next one runs on schedule. On cancellation the
//! audio source is closed exactly once.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use astral_domain::error::ServiceError;
use astral_domain::event::AssistantEvent;

use crate::ports::{AudioSource, EventPublisher, SpeechToText};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeWordConfig {
    pub phrase: String,
    /// Length of each recording.
    pub window: Duration,
    /// Time between the starts of two recordings.
    pub interval: Duration,
}

impl Default for WakeWordConfig {
    fn default() -> Self {
        Self {
            phrase: "hey astral".to_string(),
            window: Duration::from_secs(2),
            interval: Duration::from_secs(2),
        }
    }
}

/// Whether `transcript` contains `phrase`, ignoring case. Transcribers often
/// merge short words, so a match with spaces removed also counts.
#[must_use]
pub fn contains_wake_word(transcript: &str, phrase: &str) -> bool {
    let transcript = transcript.to_lowercase();
    let phrase = phrase.trim().to_lowercase();
    if phrase.is_empty() {
        return false;
    }
    if transcript.contains(&phrase) {
        return true;
    }
    let squash = |s: &str| s.chars().filter(|c| c.is_alphanumeric()).collect::<String>();
    squash(&transcript).contains(&squash(&phrase))
}

pub struct WakeWordListener<A, S, P> {
    audio: A,
    stt: S,
    publisher: P,
    config: WakeWordConfig,
}

impl<A, S, P> WakeWordListener<A, S, P>
where
    A: AudioSource + Sync,
    S: SpeechToText + Sync,
    P: EventPublisher + Sync,
{
    pub fn new(audio: A, stt: S, publisher: P, config: WakeWordConfig) -> Self {
        Self {
            audio,
            stt,
            publisher,
            config,
        }
    }

    /// Run a single record/transcribe cycle. Returns whether the wake
    /// phrase was heard.
    ///
    /// # Errors
    ///
    /// Returns the recording or transcription failure.
    pub async fn poll_once(&self) -> Result<bool, ServiceError> {
        let audio = self.audio.record(self.config.window).await?;
        let transcript = self.stt.transcribe(audio).await?;
        if !contains_wake_word(&transcript, &self.config.phrase) {
            return Ok(false);
        }
        tracing::info!(transcript = %transcript, "wake word detected");
        let _ = self
            .publisher
            .publish(AssistantEvent::WakeWordDetected { transcript })
            .await;
        Ok(true)
    }

    /// Poll until `cancel` fires, then release the audio source.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(phrase = %self.config.phrase, "wake word listener started");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(err) = self.poll_once().await {
                        tracing::warn!(error = %err, "wake word cycle failed");
                    }
                }
            }
        }

        self.audio.close().await;
        tracing::info!("wake word listener stopped");
    }
}
