//! # astral-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `LlmClient` — chat completion with prior turns
//!   - `SpeechToText` / `TextToSpeech` — transcription and synthesis
//!   - `AudioSource` — microphone windows for wake-word polling
//!   - `AudioSink` — playback of synthesised replies
//!   - `AppLauncher` / `Desktop` — OS side effects used by routine actions
//!   - `SystemInfo` — CPU, memory and GPU load
//!   - `EventPublisher` — notifications for the UI shell
//! - Provide the **use-cases**:
//!   - `RoutineEngine` — catalog and in-order execution of routines
//!   - `ActionExecutor` — the side effect of one action
//!   - `CommandRouter` — classify an utterance and dispatch it
//!   - `Assistant` — the listening/thinking/speaking cycle
//!   - `WakeWordListener` and `RoutineScheduler` — background loops
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `astral-domain` only (plus `tokio` for timers and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod action_executor;
pub mod assistant;
pub mod catalog;
pub mod command_router;
pub mod conversation;
pub mod event_bus;
pub mod ports;
pub mod routine_engine;
pub mod scheduler;
pub mod wake_word;
