//! Command classification — what a piece of transcribed text asks for.
//!
//! A classification is produced and consumed within a single routing call
//! and is never persisted.

use serde::{Deserialize, Serialize};

use crate::id::RoutineId;

/// Category assigned to an utterance, plus any extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Classification {
    Greeting,
    TimeQuery,
    DateQuery,
    RoutineTrigger { routine_id: RoutineId },
    LaunchApp { app_name: String },
    SystemInfo,
    ToggleDashboard,
    Help,
    /// Delegated to the LLM collaborator.
    LlmFallback { reason: FallbackReason },
}

/// Why an utterance ended up on the LLM path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Long, or contains a question/arithmetic keyword.
    Complex,
    /// Nothing else matched.
    CatchAll,
}

impl Classification {
    /// Short stable name, used as a tracing field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::TimeQuery => "time_query",
            Self::DateQuery => "date_query",
            Self::RoutineTrigger { .. } => "routine_trigger",
            Self::LaunchApp { .. } => "launch_app",
            Self::SystemInfo => "system_info",
            Self::ToggleDashboard => "toggle_dashboard",
            Self::Help => "help",
            Self::LlmFallback { .. } => "llm_fallback",
        }
    }

    /// Whether the LLM collaborator handles this utterance.
    #[must_use]
    pub fn is_llm(&self) -> bool {
        matches!(self, Self::LlmFallback { .. })
    }
}

/// Lowercase, trim, and drop trailing sentence punctuation.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim()
        .trim_end_matches(['.', '!', '?'])
        .trim_end()
        .to_lowercase()
}
