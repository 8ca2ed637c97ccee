//! # astrald — ASTRAL assistant daemon
//!
//! Composition root that wires all adapters together and runs the assistant.
//!
//! ## Responsibilities
//! - Load configuration (file, env vars) and initialise tracing
//! - Construct adapters (LLM, speech, desktop) behind the port traits
//! - Construct the routine engine with the seeded catalog, the command
//!   router and the assistant pipeline
//! - Spawn background tasks: routine scheduler, wake-word listener, event
//!   printer
//! - Read lines from stdin and feed them to the assistant
//! - Shut down on Ctrl-C or end of input
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;
mod shell;

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use astral_adapter_desktop::{OsDesktop, ProcSystemInfo, RegistryLauncher};
use astral_adapter_llm_http::HttpLlmClient;
use astral_adapter_speech::{CommandPlayer, CommandRecorder, SpeechOutput, WhisperStt};
use astral_app::action_executor::ActionExecutor;
use astral_app::assistant::{Assistant, Exchange};
use astral_app::catalog::default_routines;
use astral_app::command_router::CommandRouter;
use astral_app::conversation::Conversation;
use astral_app::event_bus::InProcessEventBus;
use astral_app::ports::AudioSource;
use astral_app::routine_engine::RoutineEngine;
use astral_app::scheduler::RoutineScheduler;
use astral_app::wake_word::WakeWordListener;
use astral_domain::error::AstralError;
use astral_domain::event::AssistantEvent;

use crate::config::Config;
use crate::shell::{ShellCommand, USAGE};

type Executor =
    ActionExecutor<OsDesktop, Arc<RegistryLauncher>, Arc<SpeechOutput>, Arc<CommandPlayer>>;
type Engine = RoutineEngine<Executor>;
type Router =
    CommandRouter<Executor, HttpLlmClient, Arc<RegistryLauncher>, ProcSystemInfo, InProcessEventBus>;
type Shell =
    Assistant<Router, Arc<WhisperStt>, Arc<SpeechOutput>, Arc<CommandPlayer>, InProcessEventBus>;

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_exchange(exchange: &Exchange) {
    if let Some(speech) = &exchange.response.speech {
        println!("astral> {speech}");
    }
    if let Some(run) = &exchange.response.run {
        for failure in run.failures() {
            if let Err(err) = &failure.result {
                println!("  action {} ({}) failed: {err}", failure.index, failure.action);
            }
        }
    }
}

fn print_routines(engine: &Engine) {
    for routine in engine.list() {
        let trigger = routine.trigger.to_string();
        println!(
            "  {:<18} {:<4} {trigger:<24} {} actions",
            routine.id.as_str(),
            if routine.enabled { "on" } else { "off" },
            routine.actions.len()
        );
    }
}

/// Record the command that follows a wake phrase and answer it.
async fn answer_wake_word(assistant: &Shell, recorder: &CommandRecorder, config: &Config) {
    let claim = match assistant.start_listening().await {
        Ok(claim) => claim,
        Err(err) => {
            tracing::debug!(error = %err, "ignoring wake word");
            return;
        }
    };
    let audio = match recorder.record(config.wake_word.command_window()).await {
        Ok(audio) => audio,
        Err(err) => {
            tracing::warn!(error = %err, "could not record command");
            assistant.cancel_listening(claim).await;
            return;
        }
    };
    match assistant.handle_recording(claim, audio).await {
        Ok(Some(exchange)) => {
            println!("you> {}", exchange.transcript);
            print_exchange(&exchange);
        }
        Ok(None) => println!("astral> I didn't catch that."),
        Err(err) => tracing::warn!(error = %err, "voice command failed"),
    }
}

/// Print bus notices; answer wake words when a recorder is available.
fn spawn_event_printer(
    bus: &InProcessEventBus,
    assistant: Arc<Shell>,
    recorder: Option<CommandRecorder>,
    config: Arc<Config>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                event = events.recv() => event,
            };
            match event {
                Ok(AssistantEvent::DashboardToggled) => println!("[dashboard toggled]"),
                Ok(AssistantEvent::RoutineExecuted {
                    routine_id,
                    actions_executed,
                    actions_failed,
                    ..
                }) => tracing::info!(
                    routine_id = %routine_id,
                    actions_executed,
                    actions_failed,
                    "routine executed"
                ),
                Ok(AssistantEvent::WakeWordDetected { .. }) => {
                    if let Some(recorder) = &recorder {
                        answer_wake_word(&assistant, recorder, &config).await;
                    }
                }
                Ok(AssistantEvent::StateChanged { .. }) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event printer lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
        if let Some(recorder) = recorder {
            recorder.close().await;
        }
    })
}

async fn run_shell(assistant: &Shell, engine: &Engine) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("ASTRAL ready. {USAGE}");

    loop {
        let line = tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("listening for Ctrl-C")?;
                tracing::info!("interrupted");
                break;
            }
            line = lines.next_line() => line.context("reading stdin")?,
        };
        let Some(line) = line else {
            tracing::info!("end of input");
            break;
        };

        match ShellCommand::parse(&line) {
            ShellCommand::Empty => {}
            ShellCommand::Quit => break,
            ShellCommand::Help => println!("{USAGE}"),
            ShellCommand::Routines => print_routines(engine),
            ShellCommand::Toggle(id) => match engine.toggle(&id) {
                Ok(enabled) => println!("{id} is now {}", if enabled { "on" } else { "off" }),
                Err(err) => println!("{err}"),
            },
            ShellCommand::Clear => {
                assistant.responder().conversation().clear();
                println!("conversation cleared");
            }
            ShellCommand::Unknown(text) => println!("unknown command {text:?}; {USAGE}"),
            ShellCommand::Say(text) => match assistant.handle_text(&text).await {
                Ok(exchange) => print_exchange(&exchange),
                Err(AstralError::Busy { state }) => println!("astral is busy ({state})"),
                Err(err) => tracing::warn!(error = %err, "request failed"),
            },
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(Config::load().context("loading configuration")?);
    init_tracing(&config.logging.filter);

    // Event bus
    let bus = InProcessEventBus::new(256);

    // Adapters
    let llm = HttpLlmClient::new(config.llm.clone()).context("building LLM client")?;
    if !llm.check_connection().await {
        tracing::warn!(
            provider = config.llm.provider.name(),
            "language model not reachable; general questions will get an apology"
        );
    }
    let stt = Arc::new(WhisperStt::new(config.speech.whisper.clone()).context("building STT")?);
    let tts = Arc::new(SpeechOutput::from_config(&config.speech).context("building TTS")?);
    let player = Arc::new(CommandPlayer::new(config.speech.player.clone()));
    let launcher = Arc::new(RegistryLauncher::default());
    let desktop = OsDesktop::new(&config.automation.desktop());

    // Use-cases
    let executor = ActionExecutor::new(
        desktop,
        Arc::clone(&launcher),
        Arc::clone(&tts),
        Arc::clone(&player),
        config.automation.executor(),
    );
    let engine = Arc::new(
        RoutineEngine::with_routines(executor, default_routines())
            .context("loading routine catalog")?
            .with_disabled_policy(config.automation.disabled_policy.into()),
    );
    let router = CommandRouter::new(
        Arc::clone(&engine),
        Conversation::new(llm, config.llm.history_limit),
        launcher,
        ProcSystemInfo::default(),
        bus.clone(),
    );
    let assistant = Arc::new(Assistant::new(
        router,
        Arc::clone(&stt),
        tts,
        player,
        bus.clone(),
    ));

    // Background tasks
    let cancel = CancellationToken::new();
    let mut tasks = Vec::new();

    if config.automation.scheduler_enabled {
        let scheduler = RoutineScheduler::new(
            Arc::clone(&engine),
            bus.clone(),
            config.automation.scheduler_interval(),
        );
        tasks.push(tokio::spawn(scheduler.run(cancel.child_token())));
    }

    let voice = config.wake_word.enabled && stt.is_enabled();
    if config.wake_word.enabled && !voice {
        tracing::warn!("wake word needs speech.whisper.enabled; listener not started");
    }
    if voice {
        if !stt.check_health().await {
            tracing::warn!(url = %config.speech.whisper.server_url, "whisper server not reachable");
        }
        let listener = WakeWordListener::new(
            CommandRecorder::new(config.speech.recorder.clone()),
            Arc::clone(&stt),
            bus.clone(),
            config.wake_word.listener(),
        );
        tasks.push(tokio::spawn(listener.run(cancel.child_token())));
    }

    tasks.push(spawn_event_printer(
        &bus,
        Arc::clone(&assistant),
        voice.then(|| CommandRecorder::new(config.speech.recorder.clone())),
        Arc::clone(&config),
        cancel.child_token(),
    ));

    let result = run_shell(&assistant, &engine).await;

    cancel.cancel();
    for task in tasks {
        if let Err(err) = task.await {
            tracing::warn!(error = %err, "background task ended abnormally");
        }
    }
    tracing::info!("astrald stopped");
    result
}
