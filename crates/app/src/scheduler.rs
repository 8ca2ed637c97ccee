//! Routine scheduler — runs `Scheduled` routines at their wall-clock minute.
//!
//! The scheduler ticks on an interval shorter than a minute, so the same
//! minute is usually seen more than once; a routine fires at most once per
//! calendar minute.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use astral_domain::event::AssistantEvent;
use astral_domain::id::RoutineId;
use astral_domain::run::RunResult;

use crate::action_executor::ActionRunner;
use crate::ports::EventPublisher;
use crate::routine_engine::RoutineEngine;

pub struct RoutineScheduler<X, P> {
    engine: Arc<RoutineEngine<X>>,
    publisher: P,
    interval: Duration,
    clock: fn() -> DateTime<Local>,
    last_fired: HashMap<RoutineId, NaiveDateTime>,
}

fn minute_of(at: NaiveDateTime) -> NaiveDateTime {
    at.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at)
}

impl<X, P> RoutineScheduler<X, P>
where
    X: ActionRunner + Send + Sync,
    P: EventPublisher + Sync,
{
    pub fn new(engine: Arc<RoutineEngine<X>>, publisher: P, interval: Duration) -> Self {
        Self {
            engine,
            publisher,
            interval,
            clock: Local::now,
            last_fired: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    /// Run every routine due at `now` that has not fired in this minute yet.
    pub async fn tick(&mut self, now: NaiveDateTime) -> Vec<RunResult> {
        let minute = minute_of(now);
        let mut runs = Vec::new();

        for id in self.engine.due_at(now.time()) {
            if self.last_fired.get(&id) == Some(&minute) {
                continue;
            }
            self.last_fired.insert(id.clone(), minute);
            tracing::info!(routine_id = %id, "scheduled routine due");
            match self.engine.execute(id.as_str()).await {
                Ok(run) => {
                    let _ = self
                        .publisher
                        .publish(AssistantEvent::routine_executed(&run))
                        .await;
                    runs.push(run);
                }
                Err(err) => tracing::warn!(routine_id = %id, error = %err, "scheduled run failed"),
            }
        }

        self.last_fired.retain(|_, fired| *fired == minute);
        runs
    }

    /// Tick until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(interval_secs = self.interval.as_secs(), "scheduler started");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let now = (self.clock)().naive_local();
                    self.tick(now).await;
                }
            }
        }
        tracing::info!("scheduler stopped");
    }
}
