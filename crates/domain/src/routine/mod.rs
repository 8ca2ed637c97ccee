//! Routine — a named, ordered sequence of automation actions.
//!
//! A routine is started explicitly, by a voice phrase, or by the scheduler
//! (see [`Trigger`]). Its [`Action`]s always run strictly in list order.

mod action;
mod trigger;

pub use action::{Action, MAX_VOLUME, MAX_WAIT_SECS, MediaCommand};
pub use trigger::Trigger;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::RoutineId;
use crate::time::Timestamp;

/// A catalog entry describing one automation routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub id: RoutineId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub enabled: bool,
    pub trigger: Trigger,
    pub actions: Vec<Action>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub last_run: Option<Timestamp>,
}

impl Routine {
    /// Create a builder for constructing a [`Routine`].
    #[must_use]
    pub fn builder() -> RoutineBuilder {
        RoutineBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when:
    /// - `id` is blank ([`ValidationError::EmptyId`])
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `actions` is empty ([`ValidationError::NoActions`])
    /// - the trigger or any action is out of range
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.actions.is_empty() {
            return Err(ValidationError::NoActions);
        }
        self.trigger.validate()?;
        self.actions.iter().try_for_each(Action::validate)
    }

    /// Whether any action runs an arbitrary shell string.
    #[must_use]
    pub fn has_system_commands(&self) -> bool {
        self.actions.iter().any(Action::is_system_command)
    }
}

/// Step-by-step builder for [`Routine`].
#[derive(Debug, Default)]
pub struct RoutineBuilder {
    id: Option<RoutineId>,
    name: Option<String>,
    description: String,
    enabled: Option<bool>,
    trigger: Option<Trigger>,
    actions: Vec<Action>,
    created_at: Option<Timestamp>,
    last_run: Option<Timestamp>,
}

impl RoutineBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<RoutineId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    #[must_use]
    pub fn last_run(mut self, ts: Timestamp) -> Self {
        self.last_run = Some(ts);
        self
    }

    /// Consume the builder, validate, and return a [`Routine`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if required fields are missing or invalid.
    pub fn build(self) -> Result<Routine, ValidationError> {
        let routine = Routine {
            id: self.id.ok_or(ValidationError::EmptyId)?,
            name: self.name.unwrap_or_default(),
            description: self.description,
            enabled: self.enabled.unwrap_or(true),
            trigger: self.trigger.unwrap_or(Trigger::Manual),
            actions: self.actions,
            created_at: self.created_at.unwrap_or_else(crate::time::now),
            last_run: self.last_run,
        };
        routine.validate()?;
        Ok(routine)
    }
}
