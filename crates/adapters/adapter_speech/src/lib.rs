//! # astral-adapter-speech
//!
//! Speech adapter — implements the `SpeechToText`, `TextToSpeech`,
//! `AudioSource` and `AudioSink` ports.
//!
//! ## Backends
//! - [`WhisperStt`]: multipart upload to a local Whisper HTTP server
//! - [`PiperTts`]: local Piper process, text on stdin, raw PCM on stdout
//! - [`ElevenLabsTts`]: ElevenLabs cloud synthesis
//! - [`GptSovitsTts`]: local GPT-SoVITS voice-cloning server
//! - [`CommandRecorder`]: fixed-length WAV windows from a recorder program
//!   such as `arecord`
//! - [`CommandPlayer`]: replies played through a program such as `ffplay`
//!
//! [`SpeechOutput`] picks the configured TTS backend at startup.
//!
//! ## Dependency rule
//! Depends on `astral-app` (for the port traits) and `astral-domain`.

pub mod config;
pub mod elevenlabs;
pub mod error;
pub mod gptsovits;
pub mod output;
pub mod piper;
pub mod player;
pub mod recorder;
pub mod whisper;

pub use config::{
    ElevenLabsConfig, GptSovitsConfig, PiperConfig, PlayerConfig, RecorderConfig, SpeechConfig,
    TtsBackend, WhisperConfig,
};
pub use elevenlabs::ElevenLabsTts;
pub use error::SpeechError;
pub use gptsovits::GptSovitsTts;
pub use output::SpeechOutput;
pub use piper::PiperTts;
pub use player::CommandPlayer;
pub use recorder::CommandRecorder;
pub use whisper::WhisperStt;
