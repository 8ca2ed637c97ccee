//! Event — something the UI shell may want to react to.
//!
//! Events travel over the in-process bus; they are notifications, not
//! commands, and nothing in the core waits for them to be consumed.

use serde::{Deserialize, Serialize};

use crate::assistant::AssistantState;
use crate::id::{RoutineId, RunId};
use crate::time::Timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssistantEvent {
    /// The assistant moved between utterance-cycle states.
    StateChanged {
        from: AssistantState,
        to: AssistantState,
    },
    /// The user asked to show or hide the dashboard/settings panel.
    DashboardToggled,
    /// The wake phrase was heard.
    WakeWordDetected { transcript: String },
    /// A routine finished (successfully or not).
    RoutineExecuted {
        run_id: RunId,
        routine_id: RoutineId,
        actions_executed: usize,
        actions_failed: usize,
        at: Timestamp,
    },
}

impl AssistantEvent {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::DashboardToggled => "dashboard_toggled",
            Self::WakeWordDetected { .. } => "wake_word_detected",
            Self::RoutineExecuted { .. } => "routine_executed",
        }
    }

    /// Summary event for a finished run.
    #[must_use]
    pub fn routine_executed(run: &crate::run::RunResult) -> Self {
        Self::RoutineExecuted {
            run_id: run.run_id,
            routine_id: run.routine_id.clone(),
            actions_executed: run.actions_executed,
            actions_failed: run.actions_failed,
            at: run.started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_state_change_with_type_tag() {
        let event = AssistantEvent::StateChanged {
            from: AssistantState::Idle,
            to: AssistantState::Listening,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({"type": "state_changed", "from": "idle", "to": "listening"})
        );
    }

    #[test]
    fn should_build_routine_executed_from_run() {
        let run = crate::run::RunResult::from_outcomes(
            RoutineId::from("gaming-mode"),
            crate::time::now(),
            5,
            vec![],
            false,
        );
        let event = AssistantEvent::routine_executed(&run);
        assert_eq!(event.kind(), "routine_executed");
        assert!(matches!(
            event,
            AssistantEvent::RoutineExecuted { routine_id, .. } if routine_id.as_str() == "gaming-mode"
        ));
    }
}
