//! Whisper server transcription.
//!
//! `POST {server_url}/transcribe` with the recording as the multipart
//! `file` field; the server answers `{"text": "..."}`.

use std::time::Duration;

use serde::Deserialize;

use astral_app::ports::SpeechToText;
use astral_domain::error::ServiceError;

use crate::config::WhisperConfig;
use crate::error::SpeechError;

#[derive(Debug, Deserialize)]
struct Transcription {
    #[serde(default)]
    text: String,
}

/// [`SpeechToText`] backed by a local Whisper HTTP server.
pub struct WhisperStt {
    http: reqwest::Client,
    config: WhisperConfig,
}

impl WhisperStt {
    /// # Errors
    ///
    /// Returns [`SpeechError::Build`] if the HTTP client cannot be created.
    pub fn new(config: WhisperConfig) -> Result<Self, SpeechError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SpeechError::Build)?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.server_url.trim_end_matches('/'))
    }

    /// Whether the server answers its health endpoint.
    pub async fn check_health(&self) -> bool {
        if !self.config.enabled {
            return false;
        }
        match self
            .http
            .get(self.url("/health"))
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::warn!(error = %err, "whisper server is not reachable");
                false
            }
        }
    }

    async fn request(&self, audio: Vec<u8>) -> Result<String, SpeechError> {
        if !self.config.enabled {
            return Err(SpeechError::Disabled("speech-to-text"));
        }
        if audio.is_empty() {
            return Ok(String::new());
        }

        let part = reqwest::multipart::Part::bytes(audio)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(SpeechError::Http)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.url("/transcribe"))
            .multipart(form)
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

        let transcription: Transcription = response.json().await.map_err(SpeechError::Http)?;
        Ok(transcription.text.trim().to_string())
    }
}

impl SpeechToText for WhisperStt {
    #[tracing::instrument(skip_all, fields(bytes = audio.len()))]
    async fn transcribe(&self, audio: Vec<u8>) -> Result<String, ServiceError> {
        let text = self.request(audio).await.map_err(|err| {
            tracing::warn!(error = %err, "transcription failed");
            err.into_service()
        })?;
        tracing::debug!(chars = text.len(), "transcribed");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stt(enabled: bool) -> WhisperStt {
        WhisperStt::new(WhisperConfig {
            enabled,
            server_url: "http://127.0.0.1:9/".to_string(),
            timeout_secs: 1,
        })
        .unwrap()
    }

    #[test]
    fn should_join_paths_without_double_slash() {
        assert_eq!(stt(true).url("/transcribe"), "http://127.0.0.1:9/transcribe");
    }

    #[tokio::test]
    async fn should_refuse_when_disabled() {
        let err = stt(false).transcribe(vec![1, 2, 3]).await.unwrap_err();
        assert_eq!(err, ServiceError::NotConfigured("speech-to-text"));
        assert!(!stt(false).check_health().await);
    }

    #[tokio::test]
    async fn should_treat_empty_recording_as_silence() {
        assert_eq!(stt(true).transcribe(Vec::new()).await.unwrap(), "");
    }

    #[test]
    fn should_default_missing_text_to_empty() {
        let t: Transcription = serde_json::from_str("{}").unwrap();
        assert_eq!(t.text, "");
    }
}
