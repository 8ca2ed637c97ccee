//! Command router — classifies an utterance and dispatches it.
//!
//! Classification is an ordered list of [`Rule`]s; the first rule that
//! claims the text wins. The last rule always claims it, so every
//! utterance gets exactly one [`Classification`]. Dispatch then turns the
//! classification into spoken text, a routine run, a launched app or an
//! LLM reply.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Local};
use rand::seq::SliceRandom;

use astral_domain::command::{Classification, FallbackReason, normalize};
use astral_domain::error::{AstralError, ServiceError};
use astral_domain::event::AssistantEvent;
use astral_domain::id::RoutineId;
use astral_domain::run::RunResult;
use astral_domain::time::{spoken_date, spoken_time};

use crate::action_executor::ActionRunner;
use crate::conversation::Conversation;
use crate::ports::{AppLauncher, EventPublisher, LlmClient, SystemInfo};
use crate::routine_engine::RoutineEngine;

/// Spoken when the LLM collaborator fails or returns nothing.
pub const LLM_APOLOGY: &str =
    "Sorry, I couldn't reach my language model just now. Please try again in a moment.";

pub const HELP_TEXT: &str = "You can ask me the time or the date, say \"open\" followed by an \
    app name, ask for system stats, or start a routine like \"start work mode\". \
    Anything else I'll try to answer as best I can.";

const SYSTEM_STATS_UNAVAILABLE: &str = "I couldn't read the system stats right now.";

const GREETINGS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
];

const GREETING_REPLIES: &[&str] = &[
    "Hello! How can I help you?",
    "Hi there! What can I do for you?",
    "Hey! What do you need?",
    "Greetings! I'm listening.",
];

const LAUNCH_VERBS: &[&str] = &["open", "launch", "start"];

const COMPLEX_KEYWORDS: &[&str] = &["why", "how", "explain", "what is", "calculate"];

const ARITHMETIC_SYMBOLS: &[char] = &['+', '*', '/', '='];

/// Utterances longer than this (in characters, after normalization) go to the LLM.
const SHORT_COMMAND_CHARS: usize = 15;

/// Normalized text plus the routine whose phrase it contains, if any.
pub struct Utterance {
    pub text: String,
    pub routine: Option<RoutineId>,
}

/// One classification rule. Returns `None` to let the next rule try.
pub struct Rule {
    pub name: &'static str,
    pub classify: fn(&Utterance) -> Option<Classification>,
}

/// Rules in priority order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "greeting",
        classify: greeting,
    },
    Rule {
        name: "time",
        classify: time_query,
    },
    Rule {
        name: "date",
        classify: date_query,
    },
    Rule {
        name: "routine",
        classify: routine_trigger,
    },
    Rule {
        name: "launch",
        classify: launch_app,
    },
    Rule {
        name: "system",
        classify: system_info,
    },
    Rule {
        name: "dashboard",
        classify: toggle_dashboard,
    },
    Rule {
        name: "help",
        classify: help,
    },
    Rule {
        name: "complex",
        classify: complex_question,
    },
    Rule {
        name: "fallback",
        classify: catch_all,
    },
];

fn starts_with_word(text: &str, word: &str) -> bool {
    text.strip_prefix(word)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(|c: char| !c.is_alphanumeric()))
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric()).any(|w| w == word)
}

fn greeting(u: &Utterance) -> Option<Classification> {
    GREETINGS
        .iter()
        .any(|g| starts_with_word(&u.text, g))
        .then_some(Classification::Greeting)
}

fn time_query(u: &Utterance) -> Option<Classification> {
    u.text.contains("time").then_some(Classification::TimeQuery)
}

fn date_query(u: &Utterance) -> Option<Classification> {
    u.text.contains("date").then_some(Classification::DateQuery)
}

fn routine_trigger(u: &Utterance) -> Option<Classification> {
    u.routine
        .clone()
        .map(|routine_id| Classification::RoutineTrigger { routine_id })
}

fn launch_app(u: &Utterance) -> Option<Classification> {
    let rest = LAUNCH_VERBS
        .iter()
        .filter(|verb| starts_with_word(&u.text, verb))
        .find_map(|verb| u.text.strip_prefix(verb))?
        .trim();
    let app_name = rest.strip_prefix("the ").unwrap_or(rest).trim();
    (!app_name.is_empty()).then(|| Classification::LaunchApp {
        app_name: app_name.to_string(),
    })
}

fn system_info(u: &Utterance) -> Option<Classification> {
    ((u.text.contains("system") || u.text.contains("stats")) && !has_word(&u.text, "ai"))
        .then_some(Classification::SystemInfo)
}

fn toggle_dashboard(u: &Utterance) -> Option<Classification> {
    (u.text.contains("dashboard") || u.text.contains("settings"))
        .then_some(Classification::ToggleDashboard)
}

fn help(u: &Utterance) -> Option<Classification> {
    u.text.contains("help").then_some(Classification::Help)
}

fn complex_question(u: &Utterance) -> Option<Classification> {
    let text = u.text.as_str();
    let complex = text.chars().count() > SHORT_COMMAND_CHARS
        || COMPLEX_KEYWORDS.iter().any(|k| text.contains(k))
        || text.contains(ARITHMETIC_SYMBOLS)
        || text.contains(" - ");
    complex.then_some(Classification::LlmFallback {
        reason: FallbackReason::Complex,
    })
}

#[allow(clippy::unnecessary_wraps)]
fn catch_all(_: &Utterance) -> Option<Classification> {
    Some(Classification::LlmFallback {
        reason: FallbackReason::CatchAll,
    })
}

/// Outcome of routing one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterResponse {
    pub classification: Classification,
    /// Text to speak back. `None` for silent commands (dashboard toggle).
    pub speech: Option<String>,
    /// Report of the routine run, for routine triggers.
    pub run: Option<RunResult>,
}

/// Anything that can turn text into a response. The assistant pipeline
/// depends on this seam rather than on the concrete router.
pub trait Responder {
    fn respond(&self, text: &str) -> impl Future<Output = RouterResponse> + Send;
}

fn pick_greeting() -> String {
    GREETING_REPLIES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Hello!")
        .to_string()
}

pub struct CommandRouter<X, L, A, S, P> {
    engine: Arc<RoutineEngine<X>>,
    conversation: Conversation<L>,
    launcher: A,
    system: S,
    publisher: P,
    clock: fn() -> DateTime<Local>,
}

impl<X, L, A, S, P> CommandRouter<X, L, A, S, P>
where
    X: ActionRunner + Send + Sync,
    L: LlmClient + Sync,
    A: AppLauncher + Sync,
    S: SystemInfo + Sync,
    P: EventPublisher + Sync,
{
    pub fn new(
        engine: Arc<RoutineEngine<X>>,
        conversation: Conversation<L>,
        launcher: A,
        system: S,
        publisher: P,
    ) -> Self {
        Self {
            engine,
            conversation,
            launcher,
            system,
            publisher,
            clock: Local::now,
        }
    }

    /// Replace the wall clock used for time and date answers.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    pub fn conversation(&self) -> &Conversation<L> {
        &self.conversation
    }

    /// Assign exactly one classification to `text`.
    #[must_use]
    pub fn classify(&self, text: &str) -> Classification {
        let normalized = normalize(text);
        let utterance = Utterance {
            routine: self.engine.match_voice_phrase(&normalized),
            text: normalized,
        };
        RULES
            .iter()
            .find_map(|rule| {
                let hit = (rule.classify)(&utterance)?;
                tracing::trace!(rule = rule.name, "rule matched");
                Some(hit)
            })
            .unwrap_or(Classification::LlmFallback {
                reason: FallbackReason::CatchAll,
            })
    }

    async fn run_routine(&self, routine_id: &RoutineId) -> (String, Option<RunResult>) {
        let name = self
            .engine
            .get(routine_id.as_str())
            .map(|r| r.name)
            .unwrap_or_else(|_| routine_id.to_string());
        match self.engine.execute(routine_id.as_str()).await {
            Ok(run) => {
                let _ = self
                    .publisher
                    .publish(AssistantEvent::routine_executed(&run))
                    .await;
                let speech = if run.actions_failed == 0 {
                    format!("{name} complete.")
                } else {
                    format!(
                        "{name} finished, but {} of {} actions failed.",
                        run.actions_failed, run.actions_executed
                    )
                };
                (speech, Some(run))
            }
            Err(AstralError::Disabled { .. }) => (format!("{name} is turned off."), None),
            Err(err) => {
                tracing::warn!(error = %err, "routine could not start");
                (format!("I couldn't run {name}."), None)
            }
        }
    }

    async fn launch(&self, app_name: &str) -> String {
        match self.launcher.launch(app_name).await {
            Ok(app) => format!("Opening {}.", app.resolved_name),
            Err(ServiceError::NotFound(_)) => format!("I couldn't find an app called {app_name}."),
            Err(err) => {
                tracing::warn!(app_name, error = %err, "launch failed");
                format!("I couldn't open {app_name}.")
            }
        }
    }

    async fn system_stats(&self) -> String {
        match self.system.stats().await {
            Ok(stats) => stats.summary(),
            Err(err) => {
                tracing::warn!(error = %err, "system stats unavailable");
                SYSTEM_STATS_UNAVAILABLE.to_string()
            }
        }
    }

    async fn ask_llm(&self, text: &str) -> String {
        match self.conversation.ask(text).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "language model unavailable");
                LLM_APOLOGY.to_string()
            }
        }
    }
}

impl<X, L, A, S, P> Responder for CommandRouter<X, L, A, S, P>
where
    X: ActionRunner + Send + Sync,
    L: LlmClient + Sync,
    A: AppLauncher + Sync,
    S: SystemInfo + Sync,
    P: EventPublisher + Sync,
{
    #[tracing::instrument(skip_all)]
    async fn respond(&self, text: &str) -> RouterResponse {
        let classification = self.classify(text);
        tracing::debug!(kind = classification.kind(), "utterance classified");

        let mut run = None;
        let speech = match &classification {
            Classification::Greeting => Some(pick_greeting()),
            Classification::TimeQuery => Some(format!("It's {}.", spoken_time(&(self.clock)()))),
            Classification::DateQuery => Some(format!("Today is {}.", spoken_date(&(self.clock)()))),
            Classification::RoutineTrigger { routine_id } => {
                let (speech, result) = self.run_routine(routine_id).await;
                run = result;
                Some(speech)
            }
            Classification::LaunchApp { app_name } => Some(self.launch(app_name).await),
            Classification::SystemInfo => Some(self.system_stats().await),
            Classification::ToggleDashboard => {
                let _ = self.publisher.publish(AssistantEvent::DashboardToggled).await;
                None
            }
            Classification::Help => Some(HELP_TEXT.to_string()),
            Classification::LlmFallback { .. } => Some(self.ask_llm(text.trim()).await),
        };

        RouterResponse {
            classification,
            speech,
            run,
        }
    }
}
