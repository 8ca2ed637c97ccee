//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `astral.toml` in the working directory (or the path in
//! `ASTRAL_CONFIG`). Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use astral_adapter_desktop::DesktopConfig;
use astral_adapter_llm_http::{LlmConfig, LlmProvider};
use astral_adapter_speech::{SpeechConfig, TtsBackend};
use astral_app::action_executor::ExecutorConfig;
use astral_app::routine_engine::DisabledPolicy;
use astral_app::wake_word::WakeWordConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub llm: LlmConfig,
    pub speech: SpeechConfig,
    pub automation: AutomationConfig,
    pub wake_word: WakeWordSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "astrald=info,astral=info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisabledRoutines {
    #[default]
    Run,
    Reject,
}

impl From<DisabledRoutines> for DisabledPolicy {
    fn from(value: DisabledRoutines) -> Self {
        match value {
            DisabledRoutines::Run => Self::Run,
            DisabledRoutines::Reject => Self::Reject,
        }
    }
}

/// Routine execution and scheduling.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Let routines run `SystemCommand` actions.
    pub allow_system_commands: bool,
    pub disabled_policy: DisabledRoutines,
    pub scheduler_enabled: bool,
    pub scheduler_interval_secs: u64,
    /// Upper bound for one action; `0` disables the limit.
    pub action_timeout_secs: u64,
    /// Upper bound for one OS command.
    pub command_timeout_secs: u64,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            allow_system_commands: false,
            disabled_policy: DisabledRoutines::Run,
            scheduler_enabled: true,
            scheduler_interval_secs: 30,
            action_timeout_secs: 30,
            command_timeout_secs: 10,
        }
    }
}

impl AutomationConfig {
    #[must_use]
    pub fn executor(&self) -> ExecutorConfig {
        ExecutorConfig {
            allow_system_commands: self.allow_system_commands,
            action_timeout: (self.action_timeout_secs > 0)
                .then(|| Duration::from_secs(self.action_timeout_secs)),
        }
    }

    #[must_use]
    pub fn desktop(&self) -> DesktopConfig {
        DesktopConfig {
            command_timeout_secs: self.command_timeout_secs,
        }
    }

    #[must_use]
    pub fn scheduler_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler_interval_secs)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WakeWordSection {
    /// Needs Whisper enabled as well.
    pub enabled: bool,
    pub phrase: String,
    pub window_secs: u64,
    pub interval_secs: u64,
    /// Recording length for the command that follows the wake phrase.
    pub command_secs: u64,
}

impl Default for WakeWordSection {
    fn default() -> Self {
        Self {
            enabled: false,
            phrase: "hey astral".to_string(),
            window_secs: 2,
            interval_secs: 2,
            command_secs: 5,
        }
    }
}

impl WakeWordSection {
    #[must_use]
    pub fn listener(&self) -> WakeWordConfig {
        WakeWordConfig {
            phrase: self.phrase.clone(),
            window: Duration::from_secs(self.window_secs),
            interval: Duration::from_secs(self.interval_secs),
        }
    }

    #[must_use]
    pub fn command_window(&self) -> Duration {
        Duration::from_secs(self.command_secs)
    }
}

impl Config {
    /// Load configuration from `astral.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if
    /// the merged configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("ASTRAL_CONFIG").unwrap_or_else(|_| "astral.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("ASTRAL_LLM_PROVIDER") {
            match val.parse::<LlmProvider>() {
                Ok(provider) => self.llm.provider = provider,
                Err(err) => tracing::warn!(error = %err, "ignoring ASTRAL_LLM_PROVIDER"),
            }
        }
        if let Some(val) = var("ASTRAL_LLM_MODEL") {
            self.llm.model = val;
        }
        if let Some(val) = var("ASTRAL_LLM_API_KEY") {
            self.llm.api_key = Some(val);
        }
        if let Some(val) = var("ASTRAL_OLLAMA_URL") {
            self.llm.base_url = Some(val);
        }
        if let Some(val) = var("ASTRAL_WHISPER_URL") {
            self.speech.whisper.server_url = val;
        }
        if let Some(val) = var("ASTRAL_GPTSOVITS_URL") {
            self.speech.gptsovits.server_url = val;
        }
        if let Some(val) = var("ASTRAL_ELEVENLABS_API_KEY") {
            self.speech.elevenlabs.api_key = Some(val);
        }
        if let Some(val) = var("ASTRAL_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Validation(msg.to_string()));
        if self.llm.history_limit == 0 {
            return invalid("llm.history_limit must be non-zero");
        }
        if self.llm.timeout_secs == 0 {
            return invalid("llm.timeout_secs must be non-zero");
        }
        if self.llm.provider == LlmProvider::Ollama
            && self.llm.base_url.as_deref().is_some_and(|url| url.trim().is_empty())
        {
            return invalid("llm.base_url must not be empty");
        }
        if self.speech.whisper.enabled && self.speech.whisper.server_url.trim().is_empty() {
            return invalid("speech.whisper.server_url must not be empty");
        }
        if self.speech.tts == TtsBackend::GptSovits
            && self.speech.gptsovits.server_url.trim().is_empty()
        {
            return invalid("speech.gptsovits.server_url must not be empty");
        }
        if self.speech.player.program.trim().is_empty() {
            return invalid("speech.player.program must not be empty");
        }
        if self.automation.scheduler_interval_secs == 0 {
            return invalid("automation.scheduler_interval_secs must be non-zero");
        }
        if self.wake_word.enabled {
            if self.wake_word.phrase.trim().is_empty() {
                return invalid("wake_word.phrase must not be empty");
            }
            if self.wake_word.interval_secs == 0 || self.wake_word.window_secs == 0 {
                return invalid("wake_word window and interval must be non-zero");
            }
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
