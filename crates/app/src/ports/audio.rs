//! Audio device ports — microphone windows in, synthesised speech out.

use std::future::Future;
use std::time::Duration;

use astral_domain::error::ServiceError;

use super::speech::AudioHandle;

pub trait AudioSource {
    /// Record `window` worth of audio and return it WAV-encoded.
    fn record(
        &self,
        window: Duration,
    ) -> impl Future<Output = Result<Vec<u8>, ServiceError>> + Send;

    /// Release the underlying device. Called once when polling stops.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// Plays synthesised speech to the user. Resolves once playback is over.
pub trait AudioSink {
    fn play(&self, audio: &AudioHandle) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

impl<T: AudioSink + Send + Sync> AudioSink for std::sync::Arc<T> {
    fn play(&self, audio: &AudioHandle) -> impl Future<Output = Result<(), ServiceError>> + Send {
        (**self).play(audio)
    }
}
