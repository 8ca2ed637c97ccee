//! ElevenLabs cloud synthesis. Returns MP3 bytes.

use std::time::Duration;

use serde::Serialize;

use astral_app::ports::{AudioHandle, TextToSpeech};
use astral_domain::error::ServiceError;

use crate::config::ElevenLabsConfig;
use crate::error::SpeechError;

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

pub struct ElevenLabsTts {
    http: reqwest::Client,
    api_key: String,
    config: ElevenLabsConfig,
}

impl ElevenLabsTts {
    /// # Errors
    ///
    /// Returns [`SpeechError::MissingApiKey`] without a key, or
    /// [`SpeechError::Build`] if the HTTP client cannot be created.
    pub fn new(config: ElevenLabsConfig) -> Result<Self, SpeechError> {
        let api_key = config
            .api_key()
            .ok_or(SpeechError::MissingApiKey("elevenlabs"))?
            .to_string();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SpeechError::Build)?;
        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.voice_id
        )
    }

    fn body<'a>(&'a self, text: &'a str) -> SynthesisRequest<'a> {
        SynthesisRequest {
            text,
            model_id: &self.config.model_id,
            voice_settings: VoiceSettings {
                stability: self.config.stability,
                similarity_boost: self.config.similarity_boost,
            },
        }
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let response = self
            .http
            .post(self.endpoint())
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&self.body(text))
            .send()
            .await
            .map_err(SpeechError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await.map_err(SpeechError::Http)?;
        Ok(bytes.to_vec())
    }
}

impl TextToSpeech for ElevenLabsTts {
    #[tracing::instrument(skip_all, fields(voice = %self.config.voice_id, chars = text.len()))]
    async fn speak(&self, text: &str) -> Result<AudioHandle, ServiceError> {
        let audio = self.synthesize(text).await.map_err(|err| {
            tracing::warn!(error = %err, "elevenlabs synthesis failed");
            err.into_service()
        })?;
        Ok(AudioHandle::Bytes(audio))
    }
}
