//! Speech ports — text-to-speech and speech-to-text collaborators.

use std::future::Future;
use std::path::PathBuf;

use astral_domain::error::ServiceError;

/// Synthesised audio, in whichever form the engine produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioHandle {
    Bytes(Vec<u8>),
    File(PathBuf),
}

pub trait TextToSpeech {
    fn speak(&self, text: &str) -> impl Future<Output = Result<AudioHandle, ServiceError>> + Send;
}

/// Transcribes a WAV recording. An empty string means no speech was
/// detected and is not an error.
pub trait SpeechToText {
    fn transcribe(
        &self,
        audio: Vec<u8>,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send;
}

impl<T: TextToSpeech + Send + Sync> TextToSpeech for std::sync::Arc<T> {
    fn speak(&self, text: &str) -> impl Future<Output = Result<AudioHandle, ServiceError>> + Send {
        (**self).speak(text)
    }
}

impl<T: SpeechToText + Send + Sync> SpeechToText for std::sync::Arc<T> {
    fn transcribe(
        &self,
        audio: Vec<u8>,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send {
        (**self).transcribe(audio)
    }
}
