//! Run report — the outcome of executing one routine.

use serde::{Deserialize, Serialize};

use crate::error::ActionError;
use crate::id::{RoutineId, RunId};
use crate::time::Timestamp;

/// Outcome of one attempted action, by position in the routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub index: usize,
    /// Display form of the action, for logs and UI.
    pub action: String,
    pub result: Result<(), ActionError>,
}

impl ActionOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Report produced by one routine execution. Not retained by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: RunId,
    pub routine_id: RoutineId,
    pub started_at: Timestamp,
    /// Number of actions attempted, successful or not.
    pub actions_executed: usize,
    pub actions_failed: usize,
    pub duration_ms: u64,
    pub outcomes: Vec<ActionOutcome>,
    /// Set when a cancellation signal stopped the run before its last action.
    #[serde(default)]
    pub cancelled: bool,
}

impl RunResult {
    /// Fold per-action outcomes into a report. Counts are derived from
    /// `outcomes`, so they cannot disagree with it.
    #[must_use]
    pub fn from_outcomes(
        routine_id: RoutineId,
        started_at: Timestamp,
        duration_ms: u64,
        outcomes: Vec<ActionOutcome>,
        cancelled: bool,
    ) -> Self {
        let actions_failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        Self {
            run_id: RunId::new(),
            routine_id,
            started_at,
            actions_executed: outcomes.len(),
            actions_failed,
            duration_ms,
            outcomes,
            cancelled,
        }
    }

    /// Whether every attempted action succeeded and none was skipped.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.actions_failed == 0 && !self.cancelled
    }

    /// Failed outcomes only, in execution order.
    pub fn failures(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }
}
