//! Configured text-to-speech backend.

use astral_app::ports::{AudioHandle, TextToSpeech};
use astral_domain::error::ServiceError;

use crate::config::{SpeechConfig, TtsBackend};
use crate::elevenlabs::ElevenLabsTts;
use crate::error::SpeechError;
use crate::gptsovits::GptSovitsTts;
use crate::piper::PiperTts;

pub enum SpeechOutput {
    /// Text-only replies; every `speak` fails with `NotConfigured`.
    Silent,
    Piper(PiperTts),
    ElevenLabs(ElevenLabsTts),
    GptSovits(GptSovitsTts),
}

impl SpeechOutput {
    /// # Errors
    ///
    /// Fails when the selected backend is missing required settings.
    pub fn from_config(config: &SpeechConfig) -> Result<Self, SpeechError> {
        let output = match config.tts {
            TtsBackend::None => Self::Silent,
            TtsBackend::Piper => Self::Piper(PiperTts::new(config.piper.clone())),
            TtsBackend::ElevenLabs => {
                Self::ElevenLabs(ElevenLabsTts::new(config.elevenlabs.clone())?)
            }
            TtsBackend::GptSovits => Self::GptSovits(GptSovitsTts::new(config.gptsovits.clone())?),
        };
        tracing::info!(backend = output.name(), "speech output ready");
        Ok(output)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Silent => "none",
            Self::Piper(_) => "piper",
            Self::ElevenLabs(_) => "elevenlabs",
            Self::GptSovits(_) => "gptsovits",
        }
    }
}

impl TextToSpeech for SpeechOutput {
    async fn speak(&self, text: &str) -> Result<AudioHandle, ServiceError> {
        match self {
            Self::Silent => Err(SpeechError::Disabled("text-to-speech").into_service()),
            Self::Piper(piper) => piper.speak(text).await,
            Self::ElevenLabs(eleven) => eleven.speak(text).await,
            Self::GptSovits(sovits) => sovits.speak(text).await,
        }
    }
}
