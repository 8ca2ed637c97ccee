//! End-to-end scenarios for the fully wired assistant.
//!
//! Each test builds the real use-cases (engine, executor, router,
//! conversation, assistant pipeline) around in-memory collaborators, so
//! no process is spawned and no network is touched. Application names go
//! through the real desktop registry.

use std::sync::{Arc, Mutex};

use astral_adapter_desktop::RegistryLauncher;
use astral_app::action_executor::{ActionExecutor, ExecutorConfig};
use astral_app::assistant::Assistant;
use astral_app::catalog::default_routines;
use astral_app::command_router::CommandRouter;
use astral_app::conversation::Conversation;
use astral_app::event_bus::InProcessEventBus;
use astral_app::ports::{
    AppLauncher, AudioHandle, AudioSink, Desktop, LaunchedApp, LlmClient, LlmReply,
    SpeechToText, SystemInfo, TextToSpeech,
};
use astral_app::routine_engine::RoutineEngine;
use astral_domain::command::Classification;
use astral_domain::conversation::Turn;
use astral_domain::error::{ActionError, AstralError, ServiceError};
use astral_domain::event::AssistantEvent;
use astral_domain::routine::{Action, MediaCommand, Routine, Trigger};
use astral_domain::system::SystemStats;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

type Log = Arc<Mutex<Vec<String>>>;

struct RecordingDesktop(Log);

impl RecordingDesktop {
    fn record(&self, entry: String) -> Result<(), ServiceError> {
        self.0.lock().unwrap().push(entry);
        Ok(())
    }
}

impl Desktop for RecordingDesktop {
    async fn open_url(&self, url: &str) -> Result<(), ServiceError> {
        self.record(format!("open {url}"))
    }

    async fn notify(&self, title: &str, _message: &str) -> Result<(), ServiceError> {
        self.record(format!("notify {title}"))
    }

    async fn set_volume(&self, level: u8) -> Result<(), ServiceError> {
        self.record(format!("volume {level}"))
    }

    async fn media(&self, command: MediaCommand) -> Result<(), ServiceError> {
        self.record(format!("media {command}"))
    }

    async fn run_shell(&self, command: &str) -> Result<(), ServiceError> {
        self.record(format!("shell {command}"))
    }
}

/// Resolves names with the real registry but never spawns anything.
struct DryRunLauncher(Log);

impl AppLauncher for DryRunLauncher {
    async fn launch(&self, app_name: &str) -> Result<LaunchedApp, ServiceError> {
        let app = RegistryLauncher::resolve(app_name).map_err(|err| err.into_service())?;
        self.0.lock().unwrap().push(format!("launch {}", app.name));
        Ok(LaunchedApp {
            resolved_name: app.name.to_string(),
        })
    }
}

struct SilentTts;

impl TextToSpeech for SilentTts {
    async fn speak(&self, text: &str) -> Result<AudioHandle, ServiceError> {
        Ok(AudioHandle::Bytes(text.as_bytes().to_vec()))
    }
}

/// Records what would have come out of the speakers.
struct RecordingSpeaker(Log);

impl AudioSink for RecordingSpeaker {
    async fn play(&self, audio: &AudioHandle) -> Result<(), ServiceError> {
        if let AudioHandle::Bytes(bytes) = audio {
            self.0
                .lock()
                .unwrap()
                .push(String::from_utf8_lossy(bytes).into_owned());
        }
        Ok(())
    }
}

struct NoStt;

impl SpeechToText for NoStt {
    async fn transcribe(&self, _audio: Vec<u8>) -> Result<String, ServiceError> {
        Ok(String::new())
    }
}

#[derive(Default)]
struct SpyLlm {
    calls: Mutex<Vec<(String, Vec<Turn>)>>,
}

impl LlmClient for SpyLlm {
    async fn send(&self, message: &str, history: &[Turn]) -> Result<LlmReply, ServiceError> {
        self.calls
            .lock()
            .unwrap()
            .push((message.to_string(), history.to_vec()));
        Ok(LlmReply {
            content: format!("answer to {message}"),
        })
    }
}

struct FixedStats;

impl SystemInfo for FixedStats {
    async fn stats(&self) -> Result<SystemStats, ServiceError> {
        Ok(SystemStats {
            cpu_percent: 5.0,
            memory_used_bytes: 1 << 30,
            memory_total_bytes: 4 << 30,
            gpu_percent: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

type Executor = ActionExecutor<RecordingDesktop, DryRunLauncher, SilentTts, RecordingSpeaker>;

struct Harness {
    engine: Arc<RoutineEngine<Executor>>,
    assistant: Assistant<
        CommandRouter<Executor, Arc<SpyLlm>, DryRunLauncher, FixedStats, InProcessEventBus>,
        NoStt,
        SilentTts,
        RecordingSpeaker,
        InProcessEventBus,
    >,
    llm: Arc<SpyLlm>,
    log: Log,
    played: Log,
    bus: InProcessEventBus,
}

fn harness() -> Harness {
    let log: Log = Arc::default();
    let played: Log = Arc::default();
    let bus = InProcessEventBus::new(64);
    let llm = Arc::new(SpyLlm::default());

    let executor = ActionExecutor::new(
        RecordingDesktop(Arc::clone(&log)),
        DryRunLauncher(Arc::clone(&log)),
        SilentTts,
        RecordingSpeaker(Arc::clone(&played)),
        ExecutorConfig::default(),
    );
    let engine = Arc::new(RoutineEngine::with_routines(executor, default_routines()).unwrap());
    let router = CommandRouter::new(
        Arc::clone(&engine),
        Conversation::new(Arc::clone(&llm), 10),
        DryRunLauncher(Arc::clone(&log)),
        FixedStats,
        bus.clone(),
    );
    let assistant = Assistant::new(
        router,
        NoStt,
        SilentTts,
        RecordingSpeaker(Arc::clone(&played)),
        bus.clone(),
    );

    Harness {
        engine,
        assistant,
        llm,
        log,
        played,
        bus,
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_run_work_mode_when_phrase_spoken() {
    let h = harness();
    let mut events = h.bus.subscribe();

    let exchange = h.assistant.handle_text("start work mode").await.unwrap();

    assert_eq!(
        exchange.response.classification,
        Classification::RoutineTrigger {
            routine_id: "work-mode".into()
        }
    );
    let run = exchange.response.run.unwrap();
    assert_eq!(run.actions_executed, 5);
    assert_eq!(run.actions_failed, 0);
    assert_eq!(exchange.response.speech.as_deref(), Some("Work Mode complete."));
    assert_eq!(
        *h.log.lock().unwrap(),
        [
            "launch Visual Studio Code",
            "launch Microsoft Teams",
            "volume 30",
            "notify Work Mode"
        ]
    );
    assert_eq!(
        *h.played.lock().unwrap(),
        [
            "Activating work mode. Let's be productive!",
            "Work Mode complete."
        ]
    );
    assert!(h.llm.calls.lock().unwrap().is_empty());

    let mut saw_run = false;
    while let Ok(event) = events.try_recv() {
        saw_run |= matches!(event, AssistantEvent::RoutineExecuted { actions_executed: 5, .. });
    }
    assert!(saw_run);
}

#[tokio::test]
async fn should_answer_time_without_llm() {
    let h = harness();

    let exchange = h.assistant.handle_text("what time is it").await.unwrap();

    assert_eq!(exchange.response.classification, Classification::TimeQuery);
    assert!(exchange.response.speech.unwrap().starts_with("It's "));
    assert!(h.llm.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_forward_unmatched_text_to_llm_once() {
    let h = harness();

    let exchange = h.assistant.handle_text("tell me something odd").await.unwrap();

    assert!(exchange.response.classification.is_llm());
    assert_eq!(
        exchange.response.speech.as_deref(),
        Some("answer to tell me something odd")
    );
    let calls = h.llm.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "tell me something odd");
    assert!(calls[0].1.is_empty());
}

#[tokio::test]
async fn should_report_unknown_app_without_launching() {
    let h = harness();

    let exchange = h.assistant.handle_text("open doesnotexist").await.unwrap();

    assert_eq!(
        exchange.response.speech.as_deref(),
        Some("I couldn't find an app called doesnotexist.")
    );
    assert!(h.log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_publish_dashboard_toggle_silently() {
    let h = harness();
    let mut events = h.bus.subscribe();

    let exchange = h.assistant.handle_text("show the dashboard").await.unwrap();

    assert_eq!(exchange.response.speech, None);
    assert_eq!(exchange.audio, None);
    assert!(h.played.lock().unwrap().is_empty());
    let mut toggled = false;
    while let Ok(event) = events.try_recv() {
        toggled |= event == AssistantEvent::DashboardToggled;
    }
    assert!(toggled);
}

// ---------------------------------------------------------------------------
// Routine engine
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_continue_after_failed_action() {
    let h = harness();
    let routine = Routine::builder()
        .id("broken")
        .name("Broken")
        .trigger(Trigger::Manual)
        .action(Action::LaunchApp {
            app_name: "doesnotexist".to_string(),
        })
        .action(Action::Speak {
            text: "done".to_string(),
        })
        .build()
        .unwrap();
    h.engine.register(routine).unwrap();

    let run = h.engine.execute("broken").await.unwrap();

    assert_eq!(run.actions_executed, 2);
    assert_eq!(run.actions_failed, 1);
    assert_eq!(
        run.outcomes[0].result,
        Err(ActionError::NotFound("doesnotexist".to_string()))
    );
    assert_eq!(run.outcomes[1].result, Ok(()));
    assert_eq!(*h.played.lock().unwrap(), ["done"]);
}

#[test]
fn should_restore_catalog_after_double_toggle() {
    let h = harness();
    let before = h.engine.list();

    assert!(!h.engine.toggle("gaming-mode").unwrap());
    assert!(h.engine.toggle("gaming-mode").unwrap());

    assert_eq!(h.engine.list(), before);
}

#[test]
fn should_report_missing_routine_on_toggle() {
    let h = harness();
    let before = h.engine.list();

    let err = h.engine.toggle("does-not-exist").unwrap_err();

    assert!(matches!(err, AstralError::NotFound(_)));
    assert_eq!(h.engine.list(), before);
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_drop_oldest_turns_after_eleven_questions() {
    let h = harness();

    for i in 0..11 {
        h.assistant
            .handle_text(&format!("tell me about thing {i}"))
            .await
            .unwrap();
    }

    let calls = h.llm.calls.lock().unwrap();
    assert_eq!(calls.len(), 11);
    let last_context = &calls[10].1;
    assert_eq!(last_context.len(), 10);
    assert!(
        last_context
            .iter()
            .all(|turn| turn.content != "tell me about thing 0")
    );
    assert_eq!(h.assistant.responder().conversation().history().len(), 10);
}
