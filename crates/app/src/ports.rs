//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the assistant core and the outside world
//! (LLM providers, speech engines, the operating system). They are defined
//! here (in `app`) so that both the use-case layer and the adapter layer can
//! depend on them without creating circular dependencies.

pub mod audio;
pub mod desktop;
pub mod event_bus;
pub mod llm;
pub mod speech;
pub mod system_info;

pub use audio::{AudioSink, AudioSource};
pub use desktop::{AppLauncher, Desktop, LaunchedApp};
pub use event_bus::EventPublisher;
pub use llm::{LlmClient, LlmReply};
pub use speech::{AudioHandle, SpeechToText, TextToSpeech};
pub use system_info::SystemInfo;
