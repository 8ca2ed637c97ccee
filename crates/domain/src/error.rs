//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`AstralError`] via `#[from]`. Collaborator failures share one
//! vocabulary, [`ServiceError`], whatever the backend.

use serde::{Deserialize, Serialize};

use crate::assistant::InvalidTransition;

/// Top-level error for the assistant core.
#[derive(Debug, thiserror::Error)]
pub enum AstralError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("routine {id} is disabled")]
    Disabled { id: String },

    #[error("assistant is busy ({state})")]
    Busy { state: crate::assistant::AssistantState },

    #[error("invalid state transition")]
    InvalidTransition(#[from] InvalidTransition),

    #[error("external service error")]
    Service(#[from] ServiceError),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("id must not be empty")]
    EmptyId,

    #[error("name must not be empty")]
    EmptyName,

    #[error("routine must have at least one action")]
    NoActions,

    #[error("volume level {level} is outside 0..=100")]
    VolumeOutOfRange { level: u8 },

    #[error("wait of {seconds}s exceeds the {max}s limit")]
    WaitTooLong { seconds: u64, max: u64 },

    #[error("voice trigger phrase must not be empty")]
    EmptyPhrase,

    #[error("invalid schedule time {value:?}, expected HH:MM")]
    InvalidScheduleTime { value: String },

    #[error("unknown media command {value:?}")]
    UnknownMediaCommand { value: String },
}

/// A referenced item (routine, application, voice, …) does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Failure reported by an external collaborator (LLM, TTS, STT, OS facility).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("{0} not found")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("request timed out")]
    Timeout,

    #[error("not supported on this platform: {0}")]
    Unsupported(&'static str),

    #[error("{0}")]
    Failure(String),
}

/// Outcome category of a single failed automation action.
///
/// Recorded in the run report rather than propagated, so it is
/// serializable and cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ActionError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("external failure: {0}")]
    ExternalFailure(String),

    #[error("timed out")]
    Timeout,
}

impl From<ServiceError> for ActionError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(what) => Self::NotFound(what),
            ServiceError::PermissionDenied(what) => Self::PermissionDenied(what),
            ServiceError::Timeout => Self::Timeout,
            other @ (ServiceError::NotConfigured(_)
            | ServiceError::Unsupported(_)
            | ServiceError::Failure(_)) => Self::ExternalFailure(other.to_string()),
        }
    }
}
