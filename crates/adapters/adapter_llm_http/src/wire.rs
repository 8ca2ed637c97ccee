//! Request and response shapes of the three chat APIs.

use serde::{Deserialize, Serialize};

use astral_domain::conversation::{Role, Turn};

use crate::config::{LlmConfig, LlmProvider};
use crate::error::LlmHttpError;

pub(crate) const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Turn> for WireMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            content: turn.content.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Deserialize)]
struct ContentOnly {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: ContentOnly,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct ClaudeBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeBlock>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: ContentOnly,
}

pub(crate) fn endpoint(config: &LlmConfig) -> String {
    let path = match config.provider {
        LlmProvider::Ollama => "/api/chat",
        LlmProvider::OpenAi => "/v1/chat/completions",
        LlmProvider::Claude => "/v1/messages",
    };
    format!("{}{path}", config.base_url())
}

/// Prior turns followed by the new user message, optionally led by a
/// system message.
fn chat(system: Option<&str>, history: &[Turn], message: &str) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    if let Some(system) = system {
        messages.push(WireMessage {
            role: Role::System,
            content: system.to_string(),
        });
    }
    messages.extend(history.iter().map(WireMessage::from));
    messages.push(WireMessage {
        role: Role::User,
        content: message.to_string(),
    });
    messages
}

pub(crate) fn request_body(
    config: &LlmConfig,
    history: &[Turn],
    message: &str,
) -> serde_json::Value {
    let body = match config.provider {
        LlmProvider::OpenAi => serde_json::to_value(OpenAiRequest {
            model: &config.model,
            messages: chat(Some(&config.system_prompt), history, message),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }),
        LlmProvider::Claude => serde_json::to_value(ClaudeRequest {
            model: &config.model,
            system: &config.system_prompt,
            messages: chat(None, history, message),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }),
        LlmProvider::Ollama => serde_json::to_value(OllamaRequest {
            model: &config.model,
            messages: chat(Some(&config.system_prompt), history, message),
            stream: false,
            options: OllamaOptions {
                temperature: config.temperature,
                num_predict: config.max_tokens,
            },
        }),
    };
    // plain structs of strings and numbers always serialize
    body.unwrap_or_default()
}

pub(crate) fn extract_content(
    provider: LlmProvider,
    payload: &serde_json::Value,
) -> Result<String, LlmHttpError> {
    let content = match provider {
        LlmProvider::OpenAi => OpenAiResponse::deserialize(payload)
            .ok()
            .and_then(|r| r.choices.into_iter().next())
            .map(|c| c.message.content),
        LlmProvider::Claude => ClaudeResponse::deserialize(payload).ok().map(|r| {
            r.content
                .into_iter()
                .map(|block| block.text)
                .collect::<Vec<_>>()
                .join("")
        }),
        LlmProvider::Ollama => OllamaResponse::deserialize(payload)
            .ok()
            .map(|r| r.message.content),
    };
    content
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or(LlmHttpError::EmptyReply)
}
