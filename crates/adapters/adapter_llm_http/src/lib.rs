//! # astral-adapter-llm-http
//!
//! LLM adapter — implements the `LlmClient` port over HTTP.
//!
//! ## Providers
//! - **Ollama** (default, local): `POST {base_url}/api/chat`, no key
//! - **OpenAI**: `POST {base_url}/v1/chat/completions`, bearer key
//! - **Claude**: `POST {base_url}/v1/messages`, `x-api-key` header
//!
//! The system prompt travels as the first chat message for Ollama and
//! OpenAI, and as the top-level `system` field for Claude.
//!
//! ## Dependency rule
//! Depends on `astral-app` (for the port trait) and `astral-domain`.

pub mod config;
pub mod error;
mod wire;

use std::time::Duration;

use astral_app::ports::{LlmClient, LlmReply};
use astral_domain::conversation::Turn;
use astral_domain::error::ServiceError;

pub use config::{LlmConfig, LlmProvider};
pub use error::LlmHttpError;

/// [`LlmClient`] backed by a provider's HTTP API.
pub struct HttpLlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl HttpLlmClient {
    /// Build a client; the request timeout comes from the config.
    ///
    /// # Errors
    ///
    /// Returns [`LlmHttpError::MissingApiKey`] for a cloud provider without
    /// a key, or [`LlmHttpError::Build`] if the HTTP client cannot be created.
    pub fn new(config: LlmConfig) -> Result<Self, LlmHttpError> {
        if config.provider.needs_api_key() && config.api_key().is_none() {
            return Err(LlmHttpError::MissingApiKey(config.provider.name()));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(LlmHttpError::Build)?;
        tracing::info!(provider = config.provider.name(), model = %config.model, "LLM client ready");
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Cheap reachability check. For Ollama this lists local models; cloud
    /// providers only need a key.
    pub async fn check_connection(&self) -> bool {
        if self.config.provider != LlmProvider::Ollama {
            return self.config.api_key().is_some();
        }
        let url = format!("{}/api/tags", self.config.base_url());
        match self
            .http
            .get(&url)
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "ollama answered with an error");
                false
            }
            Err(err) => {
                tracing::warn!(error = %err, "ollama is not reachable");
                false
            }
        }
    }

    async fn request(&self, message: &str, history: &[Turn]) -> Result<String, LlmHttpError> {
        let url = wire::endpoint(&self.config);
        let body = wire::request_body(&self.config, history, message);

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = self.config.api_key() {
            request = match self.config.provider {
                LlmProvider::Claude => request
                    .header("x-api-key", key)
                    .header("anthropic-version", wire::ANTHROPIC_VERSION),
                LlmProvider::OpenAi | LlmProvider::Ollama => request.bearer_auth(key),
            };
        }

        let response = request.send().await.map_err(LlmHttpError::Http)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmHttpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: serde_json::Value = response.json().await.map_err(LlmHttpError::Http)?;
        wire::extract_content(self.config.provider, &payload)
    }
}

impl LlmClient for HttpLlmClient {
    #[tracing::instrument(skip_all, fields(provider = self.config.provider.name(), history = history.len()))]
    async fn send(&self, message: &str, history: &[Turn]) -> Result<LlmReply, ServiceError> {
        let content = self.request(message, history).await.map_err(|err| {
            tracing::warn!(error = %err, "LLM request failed");
            err.into_service()
        })?;
        Ok(LlmReply { content })
    }
}
