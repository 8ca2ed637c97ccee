//! Trigger — how a routine gets started.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::ScheduleTime;

/// Describes what starts a routine besides an explicit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Only started on explicit request (UI button, API call).
    Manual,
    /// Started when a transcribed utterance contains one of the phrases.
    VoiceCommand { phrases: Vec<String> },
    /// Started by the scheduler at a wall-clock minute.
    Scheduled { time: ScheduleTime },
}

impl Trigger {
    /// Voice trigger with a single phrase.
    #[must_use]
    pub fn voice(phrase: impl Into<String>) -> Self {
        Self::VoiceCommand {
            phrases: vec![phrase.into()],
        }
    }

    /// Check that voice phrases are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPhrase`] if a voice trigger has no
    /// phrases or one of them is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::VoiceCommand { phrases }
                if phrases.is_empty() || phrases.iter().any(|p| p.trim().is_empty()) =>
            {
                Err(ValidationError::EmptyPhrase)
            }
            _ => Ok(()),
        }
    }

    /// Whether `normalized` (already lowercased and trimmed) contains one of
    /// the voice phrases. Non-voice triggers never match.
    #[must_use]
    pub fn matches_utterance(&self, normalized: &str) -> bool {
        match self {
            Self::VoiceCommand { phrases } => phrases
                .iter()
                .any(|phrase| normalized.contains(&phrase.trim().to_lowercase())),
            Self::Manual | Self::Scheduled { .. } => false,
        }
    }

    /// Whether a scheduled trigger is due at `at`.
    #[must_use]
    pub fn is_due(&self, at: NaiveTime) -> bool {
        match self {
            Self::Scheduled { time } => time.matches(at),
            Self::Manual | Self::VoiceCommand { .. } => false,
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => f.write_str("manual"),
            Self::VoiceCommand { phrases } => write!(f, "voice({})", phrases.join(" | ")),
            Self::Scheduled { time } => write!(f, "scheduled({time})"),
        }
    }
}
