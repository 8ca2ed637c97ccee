//! Routine engine — owns the routine catalog and runs routines.
//!
//! Actions of a routine run strictly in order. A failing action is
//! recorded in the [`RunResult`] and the next action still runs; a run
//! never aborts half-way except through an explicit cancellation signal.
//!
//! The catalog lock is never held across an `.await`, so catalog reads
//! stay available while a long routine (e.g. one with `Wait` actions)
//! is executing.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveTime;
use tokio_util::sync::CancellationToken;

use astral_domain::error::{AstralError, NotFoundError};
use astral_domain::id::RoutineId;
use astral_domain::routine::Routine;
use astral_domain::run::{ActionOutcome, RunResult};
use astral_domain::time;

use crate::action_executor::ActionRunner;

/// What [`RoutineEngine::execute`] does with a disabled routine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisabledPolicy {
    /// Run it anyway; `enabled` only gates automatic triggers.
    #[default]
    Run,
    /// Refuse with [`AstralError::Disabled`].
    Reject,
}

pub struct RoutineEngine<X> {
    runner: X,
    catalog: RwLock<HashMap<RoutineId, Routine>>,
    policy: DisabledPolicy,
}

fn not_found(id: &str) -> AstralError {
    NotFoundError {
        entity: "Routine",
        id: id.to_string(),
    }
    .into()
}

impl<X> RoutineEngine<X>
where
    X: ActionRunner + Sync,
{
    /// Create an engine with an empty catalog.
    pub fn new(runner: X) -> Self {
        Self {
            runner,
            catalog: RwLock::new(HashMap::new()),
            policy: DisabledPolicy::default(),
        }
    }

    /// Create an engine pre-loaded with `routines`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first invalid routine.
    pub fn with_routines(
        runner: X,
        routines: impl IntoIterator<Item = Routine>,
    ) -> Result<Self, AstralError> {
        let engine = Self::new(runner);
        for routine in routines {
            engine.register(routine)?;
        }
        Ok(engine)
    }

    #[must_use]
    pub fn with_disabled_policy(mut self, policy: DisabledPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<RoutineId, Routine>> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<RoutineId, Routine>> {
        self.catalog.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or replace a routine. Returns the routine previously stored
    /// under the same id, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AstralError::Validation`] if the routine breaks an invariant.
    pub fn register(&self, routine: Routine) -> Result<Option<Routine>, AstralError> {
        routine.validate()?;
        if routine.has_system_commands() {
            tracing::warn!(routine_id = %routine.id, "routine contains system commands");
        }
        tracing::debug!(routine_id = %routine.id, trigger = %routine.trigger, "routine registered");
        Ok(self.write().insert(routine.id.clone(), routine))
    }

    /// Replace an existing routine, keeping its `created_at` and `last_run`.
    ///
    /// # Errors
    ///
    /// Returns [`AstralError::NotFound`] if no routine has that id, or a
    /// validation error.
    pub fn update(&self, mut routine: Routine) -> Result<Routine, AstralError> {
        routine.validate()?;
        let mut catalog = self.write();
        let current = catalog
            .get_mut(&routine.id)
            .ok_or_else(|| not_found(routine.id.as_str()))?;
        routine.created_at = current.created_at;
        routine.last_run = current.last_run;
        *current = routine.clone();
        Ok(routine)
    }

    /// Delete a routine and hand it back.
    ///
    /// # Errors
    ///
    /// Returns [`AstralError::NotFound`] if no routine has that id.
    pub fn remove(&self, id: &str) -> Result<Routine, AstralError> {
        self.write().remove(id).ok_or_else(|| not_found(id))
    }

    /// # Errors
    ///
    /// Returns [`AstralError::NotFound`] if no routine has that id.
    pub fn get(&self, id: &str) -> Result<Routine, AstralError> {
        self.read().get(id).cloned().ok_or_else(|| not_found(id))
    }

    /// Snapshot of the catalog, sorted by id.
    #[must_use]
    pub fn list(&self) -> Vec<Routine> {
        let mut routines: Vec<_> = self.read().values().cloned().collect();
        routines.sort_by(|a, b| a.id.cmp(&b.id));
        routines
    }

    /// Flip the `enabled` flag and return the new value.
    ///
    /// # Errors
    ///
    /// Returns [`AstralError::NotFound`] if no routine has that id; the
    /// catalog is left unchanged.
    pub fn toggle(&self, id: &str) -> Result<bool, AstralError> {
        let mut catalog = self.write();
        let routine = catalog.get_mut(id).ok_or_else(|| not_found(id))?;
        routine.enabled = !routine.enabled;
        tracing::info!(routine_id = %id, enabled = routine.enabled, "routine toggled");
        Ok(routine.enabled)
    }

    /// First enabled voice-triggered routine, in id order, whose phrase
    /// occurs in `normalized`.
    #[must_use]
    pub fn match_voice_phrase(&self, normalized: &str) -> Option<RoutineId> {
        self.list()
            .into_iter()
            .find(|r| r.enabled && r.trigger.matches_utterance(normalized))
            .map(|r| r.id)
    }

    /// Enabled scheduled routines due in the minute of `at`, in id order.
    #[must_use]
    pub fn due_at(&self, at: NaiveTime) -> Vec<RoutineId> {
        self.list()
            .into_iter()
            .filter(|r| r.enabled && r.trigger.is_due(at))
            .map(|r| r.id)
            .collect()
    }

    /// Run every action of a routine in order.
    ///
    /// # Errors
    ///
    /// Returns [`AstralError::NotFound`] for an unknown id, or
    /// [`AstralError::Disabled`] when the routine is disabled and the
    /// policy is [`DisabledPolicy::Reject`]. Action failures are not
    /// errors; they are reported in the [`RunResult`].
    pub async fn execute(&self, id: &str) -> Result<RunResult, AstralError> {
        self.execute_with_cancel(id, &CancellationToken::new()).await
    }

    /// Like [`execute`](Self::execute), but stops before the next action
    /// once `cancel` fires. The report then has `cancelled` set and lists
    /// only the attempted actions.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    #[tracing::instrument(skip_all, fields(routine_id = %id))]
    pub async fn execute_with_cancel(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<RunResult, AstralError> {
        let started_at = time::now();
        let routine = {
            let mut catalog = self.write();
            let routine = catalog.get_mut(id).ok_or_else(|| not_found(id))?;
            if !routine.enabled && self.policy == DisabledPolicy::Reject {
                return Err(AstralError::Disabled { id: id.to_string() });
            }
            routine.last_run = Some(started_at);
            routine.clone()
        };
        if !routine.enabled {
            tracing::warn!("running disabled routine on explicit request");
        }

        let clock = tokio::time::Instant::now();
        let mut outcomes = Vec::with_capacity(routine.actions.len());
        let mut cancelled = false;

        for (index, action) in routine.actions.iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let result = self.runner.run(action).await;
            match &result {
                Ok(()) => tracing::debug!(index, %action, "action completed"),
                Err(err) => tracing::warn!(index, %action, error = %err, "action failed"),
            }
            outcomes.push(ActionOutcome {
                index,
                action: action.to_string(),
                result,
            });
        }

        let duration_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);
        let run = RunResult::from_outcomes(
            routine.id,
            started_at,
            duration_ms,
            outcomes,
            cancelled,
        );
        tracing::info!(
            run_id = %run.run_id,
            executed = run.actions_executed,
            failed = run.actions_failed,
            cancelled = run.cancelled,
            duration_ms = run.duration_ms,
            "routine finished"
        );
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astral_domain::error::{ActionError, ValidationError};
    use astral_domain::routine::{Action, Trigger};
    use std::sync::Mutex;

    // ── Scripted runner ────────────────────────────────────────────

    /// Fails `LaunchApp` for names listed in `missing`, records everything.
    #[derive(Default)]
    struct ScriptedRunner {
        missing: Vec<&'static str>,
        ran: Mutex<Vec<String>>,
        cancel_after_first: Option<CancellationToken>,
    }

    impl ActionRunner for ScriptedRunner {
        async fn run(&self, action: &Action) -> Result<(), ActionError> {
            self.ran.lock().unwrap().push(action.to_string());
            if let Some(token) = &self.cancel_after_first {
                token.cancel();
            }
            match action {
                Action::LaunchApp { app_name } if self.missing.contains(&app_name.as_str()) => {
                    Err(ActionError::NotFound(app_name.clone()))
                }
                _ => Ok(()),
            }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn speak(text: &str) -> Action {
        Action::Speak {
            text: text.to_string(),
        }
    }

    fn launch(app: &str) -> Action {
        Action::LaunchApp {
            app_name: app.to_string(),
        }
    }

    fn routine(id: &str, actions: Vec<Action>) -> Routine {
        Routine::builder()
            .id(id)
            .name(id)
            .actions(actions)
            .build()
            .unwrap()
    }

    fn engine_with(runner: ScriptedRunner, routines: Vec<Routine>) -> RoutineEngine<ScriptedRunner> {
        RoutineEngine::with_routines(runner, routines).unwrap()
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_run_every_action_in_order() {
        let engine = engine_with(
            ScriptedRunner::default(),
            vec![routine("r", vec![speak("one"), launch("Code"), speak("three")])],
        );

        let run = engine.execute("r").await.unwrap();

        assert_eq!(run.actions_executed, 3);
        assert_eq!(run.actions_failed, 0);
        assert!(run.succeeded());
        assert_eq!(
            *engine.runner.ran.lock().unwrap(),
            vec!["speak(3 chars)", "launch_app(Code)", "speak(5 chars)"]
        );
    }

    #[tokio::test]
    async fn should_continue_after_failing_action() {
        let engine = engine_with(
            ScriptedRunner {
                missing: vec!["doesnotexist"],
                ..ScriptedRunner::default()
            },
            vec![routine("r", vec![launch("doesnotexist"), speak("done")])],
        );

        let run = engine.execute("r").await.unwrap();

        assert_eq!(run.actions_executed, 2);
        assert_eq!(run.actions_failed, 1);
        assert_eq!(
            run.outcomes[0].result,
            Err(ActionError::NotFound("doesnotexist".to_string()))
        );
        assert_eq!(run.outcomes[1].result, Ok(()));
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_routine() {
        let engine = engine_with(ScriptedRunner::default(), vec![]);
        let err = engine.execute("nope").await.unwrap_err();
        assert!(matches!(err, AstralError::NotFound(e) if e.id == "nope"));
    }

    #[tokio::test]
    async fn should_set_last_run_to_start_time() {
        let engine = engine_with(ScriptedRunner::default(), vec![routine("r", vec![speak("x")])]);
        assert!(engine.get("r").unwrap().last_run.is_none());

        let run = engine.execute("r").await.unwrap();

        assert_eq!(engine.get("r").unwrap().last_run, Some(run.started_at));
    }

    #[tokio::test]
    async fn should_run_disabled_routine_by_default() {
        let engine = engine_with(ScriptedRunner::default(), vec![routine("r", vec![speak("x")])]);
        engine.toggle("r").unwrap();

        let run = engine.execute("r").await.unwrap();
        assert_eq!(run.actions_executed, 1);
    }

    #[tokio::test]
    async fn should_reject_disabled_routine_when_policy_says_so() {
        let engine = engine_with(ScriptedRunner::default(), vec![routine("r", vec![speak("x")])])
            .with_disabled_policy(DisabledPolicy::Reject);
        engine.toggle("r").unwrap();

        let err = engine.execute("r").await.unwrap_err();
        assert!(matches!(err, AstralError::Disabled { id } if id == "r"));
        assert!(engine.get("r").unwrap().last_run.is_none());
    }

    #[tokio::test]
    async fn should_stop_before_next_action_when_cancelled() {
        let token = CancellationToken::new();
        let engine = engine_with(
            ScriptedRunner {
                cancel_after_first: Some(token.clone()),
                ..ScriptedRunner::default()
            },
            vec![routine("r", vec![speak("a"), speak("b"), speak("c")])],
        );

        let run = engine.execute_with_cancel("r", &token).await.unwrap();

        assert!(run.cancelled);
        assert!(!run.succeeded());
        assert_eq!(run.actions_executed, 1);
    }

    #[test]
    fn should_toggle_twice_back_to_original() {
        let engine = engine_with(ScriptedRunner::default(), vec![routine("r", vec![speak("x")])]);
        assert!(!engine.toggle("r").unwrap());
        assert!(engine.toggle("r").unwrap());
        assert!(engine.get("r").unwrap().enabled);
    }

    #[test]
    fn should_fail_toggle_for_unknown_id_without_changes() {
        let engine = engine_with(ScriptedRunner::default(), vec![routine("r", vec![speak("x")])]);
        let before = engine.list();

        assert!(matches!(engine.toggle("missing"), Err(AstralError::NotFound(_))));
        assert_eq!(engine.list(), before);
    }

    #[test]
    fn should_reject_routine_without_actions() {
        let engine = engine_with(ScriptedRunner::default(), vec![]);
        let mut bad = routine("r", vec![speak("x")]);
        bad.actions.clear();

        let err = engine.register(bad).unwrap_err();
        assert!(matches!(err, AstralError::Validation(ValidationError::NoActions)));
        assert!(engine.list().is_empty());
    }

    #[test]
    fn should_return_previous_routine_on_register() {
        let engine = engine_with(ScriptedRunner::default(), vec![routine("r", vec![speak("x")])]);
        let previous = engine.register(routine("r", vec![speak("y")])).unwrap();
        assert_eq!(previous.unwrap().actions, vec![speak("x")]);
        assert_eq!(engine.get("r").unwrap().actions, vec![speak("y")]);
    }

    #[test]
    fn should_keep_timestamps_on_update() {
        let engine = engine_with(ScriptedRunner::default(), vec![routine("r", vec![speak("x")])]);
        let created = engine.get("r").unwrap().created_at;

        let mut changed = routine("r", vec![speak("y")]);
        changed.name = "Renamed".to_string();
        let updated = engine.update(changed).unwrap();

        assert_eq!(updated.created_at, created);
        assert_eq!(engine.get("r").unwrap().name, "Renamed");
        assert!(matches!(
            engine.update(routine("other", vec![speak("z")])),
            Err(AstralError::NotFound(_))
        ));
    }

    #[test]
    fn should_remove_routine() {
        let engine = engine_with(ScriptedRunner::default(), vec![routine("r", vec![speak("x")])]);
        engine.remove("r").unwrap();
        assert!(matches!(engine.get("r"), Err(AstralError::NotFound(_))));
        assert!(matches!(engine.remove("r"), Err(AstralError::NotFound(_))));
    }

    #[test]
    fn should_list_routines_sorted_by_id() {
        let engine = engine_with(
            ScriptedRunner::default(),
            vec![
                routine("zeta", vec![speak("x")]),
                routine("alpha", vec![speak("x")]),
            ],
        );
        let ids: Vec<_> = engine.list().into_iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }

    #[test]
    fn should_match_voice_phrase_of_enabled_routine_only() {
        let mut work = routine("work-mode", vec![speak("x")]);
        work.trigger = Trigger::voice("work mode");
        let engine = engine_with(ScriptedRunner::default(), vec![work]);

        assert_eq!(
            engine.match_voice_phrase("start work mode please"),
            Some(RoutineId::from("work-mode"))
        );
        engine.toggle("work-mode").unwrap();
        assert_eq!(engine.match_voice_phrase("start work mode please"), None);
    }

    #[test]
    fn should_not_start_seeded_routine_for_other_verbs() {
        let engine = engine_with(ScriptedRunner::default(), crate::catalog::default_routines());

        assert_eq!(
            engine.match_voice_phrase("start work mode"),
            Some(RoutineId::from("work-mode"))
        );
        assert_eq!(engine.match_voice_phrase("stop work mode"), None);
        assert_eq!(engine.match_voice_phrase("exit gaming mode"), None);
    }

    #[test]
    fn should_list_due_scheduled_routines() {
        let engine = engine_with(ScriptedRunner::default(), crate::catalog::default_routines());
        let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap();

        assert_eq!(engine.due_at(eight), vec![RoutineId::from("morning-routine")]);
        assert!(engine.due_at(NaiveTime::from_hms_opt(8, 1, 0).unwrap()).is_empty());
    }
}
