//! Assistant state machine — one utterance cycle at a time.
//!
//! ```text
//! idle → listening → thinking → speaking → idle
//!   └────────────────↗
//! ```
//! Typed input skips `listening`. Every state may fall back to `idle`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantState {
    #[default]
    Idle,
    Listening,
    Thinking,
    Speaking,
}

/// Rejected move between two states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move from {from} to {to}")]
pub struct InvalidTransition {
    pub from: AssistantState,
    pub to: AssistantState,
}

impl AssistantState {
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (_, Self::Idle)
                | (Self::Idle, Self::Listening | Self::Thinking)
                | (Self::Listening, Self::Thinking)
                | (Self::Thinking, Self::Speaking)
        )
    }

    /// Move to `to` if allowed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] for any edge not in the cycle.
    pub fn transition(self, to: Self) -> Result<Self, InvalidTransition> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(InvalidTransition { from: self, to })
        }
    }

    #[must_use]
    pub fn is_idle(self) -> bool {
        self == Self::Idle
    }
}

impl std::fmt::Display for AssistantState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Thinking => "thinking",
            Self::Speaking => "speaking",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AssistantState::{Idle, Listening, Speaking, Thinking};

    #[test]
    fn should_walk_the_full_voice_cycle() {
        let state = Idle
            .transition(Listening)
            .and_then(|s| s.transition(Thinking))
            .and_then(|s| s.transition(Speaking))
            .and_then(|s| s.transition(Idle))
            .unwrap();
        assert_eq!(state, Idle);
    }

    #[test]
    fn should_allow_typed_input_to_skip_listening() {
        assert_eq!(Idle.transition(Thinking), Ok(Thinking));
    }

    #[test]
    fn should_allow_any_state_to_return_to_idle() {
        for state in [Idle, Listening, Thinking, Speaking] {
            assert!(state.can_transition_to(Idle));
        }
    }

    #[test]
    fn should_reject_skipping_thinking() {
        assert_eq!(
            Listening.transition(Speaking),
            Err(InvalidTransition {
                from: Listening,
                to: Speaking
            })
        );
    }

    #[test]
    fn should_reject_going_backwards() {
        assert!(Speaking.transition(Thinking).is_err());
        assert!(Thinking.transition(Listening).is_err());
    }

    #[test]
    fn should_default_to_idle() {
        assert!(AssistantState::default().is_idle());
    }
}
