//! GPT-SoVITS local voice cloning.
//!
//! `POST {server_url}/tts` with the text and a reference clip of the
//! voice to imitate; the server answers with WAV bytes.

use std::time::Duration;

use serde::Serialize;

use astral_app::ports::{AudioHandle, TextToSpeech};
use astral_domain::error::ServiceError;

use crate::config::GptSovitsConfig;
use crate::error::SpeechError;

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    reference_audio: &'a str,
    reference_text: &'a str,
    language: &'a str,
}

pub struct GptSovitsTts {
    http: reqwest::Client,
    config: GptSovitsConfig,
}

impl GptSovitsTts {
    /// # Errors
    ///
    /// Returns [`SpeechError::Build`] if the HTTP client cannot be created.
    pub fn new(config: GptSovitsConfig) -> Result<Self, SpeechError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SpeechError::Build)?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.server_url.trim_end_matches('/'))
    }

    fn body<'a>(&'a self, text: &'a str) -> SynthesisRequest<'a> {
        SynthesisRequest {
            text,
            reference_audio: &self.config.reference_audio,
            reference_text: &self.config.reference_text,
            language: &self.config.language,
        }
    }

    /// Whether the server answers its health endpoint.
    pub async fn check_health(&self) -> bool {
        match self
            .http
            .get(self.url("/health"))
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::warn!(error = %err, "gpt-sovits server is not reachable");
                false
            }
        }
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let response = self
            .http
            .post(self.url("/tts"))
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

impl TextToSpeech for GptSovitsTts {
    #[tracing::instrument(skip_all, fields(language = %self.config.language, chars = text.len()))]
    async fn speak(&self, text: &str) -> Result<AudioHandle, ServiceError> {
        if text.trim().is_empty() {
            return Ok(AudioHandle::Bytes(Vec::new()));
        }
        let audio = self.synthesize(text).await.map_err(|err| {
            tracing::warn!(error = %err, "gpt-sovits synthesis failed");
            err.into_service()
        })?;
        Ok(AudioHandle::Bytes(audio))
    }
}
