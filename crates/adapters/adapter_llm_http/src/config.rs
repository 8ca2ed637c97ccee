//! LLM provider configuration.

use serde::Deserialize;

const DEFAULT_SYSTEM_PROMPT: &str = "You are ASTRAL, a desktop voice assistant. \
    You help with tasks, answer questions and control the computer. \
    Keep answers short enough to be spoken aloud.";

/// Which HTTP API to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Ollama,
    #[serde(alias = "open_ai")]
    OpenAi,
    Claude,
}

impl LlmProvider {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
            Self::Claude => "claude",
        }
    }

    #[must_use]
    pub fn needs_api_key(self) -> bool {
        !matches!(self, Self::Ollama)
    }

    #[must_use]
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Ollama => "http://localhost:11434",
            Self::OpenAi => "https://api.openai.com",
            Self::Claude => "https://api.anthropic.com",
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" | "open_ai" => Ok(Self::OpenAi),
            "claude" | "anthropic" => Ok(Self::Claude),
            other => Err(format!("unknown LLM provider {other:?}")),
        }
    }
}

/// Configuration for the LLM adapter (`[llm]` section).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub model: String,
    /// Required for OpenAI and Claude. Blank counts as missing.
    pub api_key: Option<String>,
    /// Overrides the provider's default endpoint root.
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Number of prior messages sent as context.
    pub history_limit: usize,
    pub system_prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: "llama2".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: 500,
            timeout_secs: 30,
            history_limit: 10,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl LlmConfig {
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Endpoint root without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
    }
}
