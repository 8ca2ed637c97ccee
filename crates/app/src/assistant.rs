//! Assistant pipeline — one utterance cycle at a time.
//!
//! Audio flows `listening → thinking → speaking → idle`; typed text
//! enters at `thinking`. While a cycle is in flight any new input is
//! refused with [`AstralError::Busy`]. Every exit path, including errors,
//! returns the state to `idle`.
//!
//! A cycle opened with [`Assistant::start_listening`] belongs to whoever
//! holds the returned [`ListeningClaim`]; only that claim can feed the
//! recording in through [`Assistant::handle_recording`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use astral_domain::assistant::AssistantState;
use astral_domain::error::AstralError;
use astral_domain::event::AssistantEvent;

use crate::command_router::{Responder, RouterResponse};
use crate::ports::{AudioHandle, AudioSink, EventPublisher, SpeechToText, TextToSpeech};

/// Everything produced by one completed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub transcript: String,
    pub response: RouterResponse,
    /// Synthesised reply, when there was something to say and TTS worked.
    pub audio: Option<AudioHandle>,
}

/// Ownership of a listening cycle opened by [`Assistant::start_listening`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "hand the claim to `handle_recording` or `cancel_listening`"]
pub struct ListeningClaim {
    cycle: u64,
}

#[derive(Debug, Default)]
struct Pipeline {
    state: AssistantState,
    /// Bumped each time a cycle starts.
    cycle: u64,
}

pub struct Assistant<R, S, T, A, P> {
    responder: R,
    stt: S,
    tts: T,
    sink: A,
    publisher: P,
    pipeline: Mutex<Pipeline>,
}

impl<R, S, T, A, P> Assistant<R, S, T, A, P>
where
    R: Responder + Sync,
    S: SpeechToText + Sync,
    T: TextToSpeech + Sync,
    A: AudioSink + Sync,
    P: EventPublisher + Sync,
{
    pub fn new(responder: R, stt: S, tts: T, sink: A, publisher: P) -> Self {
        Self {
            responder,
            stt,
            tts,
            sink,
            publisher,
            pipeline: Mutex::new(Pipeline::default()),
        }
    }

    pub fn responder(&self) -> &R {
        &self.responder
    }

    fn lock(&self) -> MutexGuard<'_, Pipeline> {
        self.pipeline.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn state(&self) -> AssistantState {
        self.lock().state
    }

    /// Claim the pipeline for a new cycle entering at `to`.
    fn begin(&self, to: AssistantState) -> Result<u64, AstralError> {
        let mut pipeline = self.lock();
        if !pipeline.state.is_idle() {
            return Err(AstralError::Busy {
                state: pipeline.state,
            });
        }
        pipeline.state = pipeline.state.transition(to)?;
        pipeline.cycle = pipeline.cycle.wrapping_add(1);
        Ok(pipeline.cycle)
    }

    fn advance(&self, to: AssistantState) -> Result<AssistantState, AstralError> {
        let mut pipeline = self.lock();
        let from = pipeline.state;
        pipeline.state = from.transition(to)?;
        Ok(from)
    }

    async fn announce(&self, from: AssistantState, to: AssistantState) {
        tracing::debug!(%from, %to, "assistant state changed");
        let _ = self
            .publisher
            .publish(AssistantEvent::StateChanged { from, to })
            .await;
    }

    async fn reset(&self) {
        let from = std::mem::take(&mut self.lock().state);
        if !from.is_idle() {
            self.announce(from, AssistantState::Idle).await;
        }
    }

    /// Enter `listening` ahead of a recording, so the UI can show it.
    ///
    /// # Errors
    ///
    /// Returns [`AstralError::Busy`] if a cycle is already in flight.
    pub async fn start_listening(&self) -> Result<ListeningClaim, AstralError> {
        let cycle = self.begin(AssistantState::Listening)?;
        self.announce(AssistantState::Idle, AssistantState::Listening)
            .await;
        Ok(ListeningClaim { cycle })
    }

    /// Give up a listening cycle without a recording.
    pub async fn cancel_listening(&self, claim: ListeningClaim) {
        if self.owns(&claim) {
            self.reset().await;
        }
    }

    fn owns(&self, claim: &ListeningClaim) -> bool {
        let pipeline = self.lock();
        pipeline.cycle == claim.cycle && pipeline.state == AssistantState::Listening
    }

    /// Transcribe and handle a recorded utterance in a fresh cycle.
    /// Returns `None` when no speech was detected.
    ///
    /// # Errors
    ///
    /// Returns [`AstralError::Busy`] while another cycle runs, or the
    /// transcription failure. The state is back at `idle` either way.
    #[tracing::instrument(skip_all, fields(bytes = audio.len()))]
    pub async fn handle_audio(&self, audio: Vec<u8>) -> Result<Option<Exchange>, AstralError> {
        let claim = self.start_listening().await?;
        self.handle_recording(claim, audio).await
    }

    /// Handle the recording for a cycle opened by
    /// [`start_listening`](Self::start_listening).
    ///
    /// # Errors
    ///
    /// Returns [`AstralError::Busy`] if `claim` no longer owns the
    /// pipeline, or the transcription failure.
    pub async fn handle_recording(
        &self,
        claim: ListeningClaim,
        audio: Vec<u8>,
    ) -> Result<Option<Exchange>, AstralError> {
        if !self.owns(&claim) {
            return Err(AstralError::Busy {
                state: self.state(),
            });
        }

        let transcript = match self.stt.transcribe(audio).await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "transcription failed");
                self.reset().await;
                return Err(err.into());
            }
        };
        if transcript.is_empty() {
            tracing::debug!("no speech detected");
            self.reset().await;
            return Ok(None);
        }

        let from = match self.advance(AssistantState::Thinking) {
            Ok(from) => from,
            Err(err) => {
                self.reset().await;
                return Err(err);
            }
        };
        self.announce(from, AssistantState::Thinking).await;
        self.finish(transcript).await.map(Some)
    }

    /// Handle typed input, skipping transcription.
    ///
    /// # Errors
    ///
    /// Returns [`AstralError::Busy`] while another cycle runs.
    #[tracing::instrument(skip_all)]
    pub async fn handle_text(&self, text: &str) -> Result<Exchange, AstralError> {
        self.begin(AssistantState::Thinking)?;
        self.announce(AssistantState::Idle, AssistantState::Thinking)
            .await;
        self.finish(text.trim().to_string()).await
    }

    async fn finish(&self, transcript: String) -> Result<Exchange, AstralError> {
        let response = self.responder.respond(&transcript).await;

        let audio = match &response.speech {
            Some(speech) => {
                if let Err(err) = self.advance(AssistantState::Speaking) {
                    self.reset().await;
                    return Err(err);
                }
                self.announce(AssistantState::Thinking, AssistantState::Speaking)
                    .await;
                self.say(speech).await
            }
            None => None,
        };

        self.reset().await;
        Ok(Exchange {
            transcript,
            response,
            audio,
        })
    }

    /// Synthesise and play `speech`. Failures only cost the audio.
    async fn say(&self, speech: &str) -> Option<AudioHandle> {
        let audio = match self.tts.speak(speech).await {
            Ok(audio) => audio,
            Err(err) => {
                tracing::warn!(error = %err, "speech synthesis failed");
                return None;
            }
        };
        if let Err(err) = self.sink.play(&audio).await {
            tracing::warn!(error = %err, "playback failed");
        }
        Some(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::InProcessEventBus;
    use astral_domain::command::{Classification, FallbackReason};
    use astral_domain::error::ServiceError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use AssistantState::{Idle, Listening, Speaking, Thinking};

    // ── Fakes ──────────────────────────────────────────────────────

    /// Echoes the text back; optionally blocks until released.
    #[derive(Default)]
    struct EchoResponder {
        gate: Option<Arc<Notify>>,
    }

    impl Responder for EchoResponder {
        async fn respond(&self, text: &str) -> RouterResponse {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            RouterResponse {
                classification: Classification::LlmFallback {
                    reason: FallbackReason::CatchAll,
                },
                speech: (text != "silent").then(|| format!("you said {text}")),
                run: None,
            }
        }
    }

    /// Returns a fixed transcript; optionally blocks until released.
    struct ScriptedStt {
        reply: Result<&'static str, ServiceError>,
        gate: Option<Arc<Notify>>,
        calls: AtomicUsize,
    }

    impl ScriptedStt {
        fn new(reply: Result<&'static str, ServiceError>) -> Self {
            Self {
                reply,
                gate: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SpeechToText for ScriptedStt {
        async fn transcribe(&self, _audio: Vec<u8>) -> Result<String, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.reply.clone().map(str::to_string)
        }
    }

    struct FakeTts {
        fail: bool,
    }

    impl TextToSpeech for FakeTts {
        async fn speak(&self, text: &str) -> Result<AudioHandle, ServiceError> {
            if self.fail {
                return Err(ServiceError::NotConfigured("text-to-speech"));
            }
            Ok(AudioHandle::Bytes(text.as_bytes().to_vec()))
        }
    }

    #[derive(Default)]
    struct FakeSpeaker {
        played: Mutex<Vec<AudioHandle>>,
        fail: bool,
    }

    impl AudioSink for FakeSpeaker {
        async fn play(&self, audio: &AudioHandle) -> Result<(), ServiceError> {
            self.played.lock().unwrap().push(audio.clone());
            if self.fail {
                return Err(ServiceError::NotFound("ffplay".to_string()));
            }
            Ok(())
        }
    }

    type TestAssistant =
        Assistant<EchoResponder, ScriptedStt, FakeTts, FakeSpeaker, InProcessEventBus>;

    fn assistant(stt: Result<&'static str, ServiceError>) -> (TestAssistant, InProcessEventBus) {
        let bus = InProcessEventBus::new(32);
        let a = Assistant::new(
            EchoResponder::default(),
            ScriptedStt::new(stt),
            FakeTts { fail: false },
            FakeSpeaker::default(),
            bus.clone(),
        );
        (a, bus)
    }

    fn drain(
        rx: &mut tokio::sync::broadcast::Receiver<AssistantEvent>,
    ) -> Vec<(AssistantState, AssistantState)> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let AssistantEvent::StateChanged { from, to } = event {
                out.push((from, to));
            }
        }
        out
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_walk_full_cycle_for_audio() {
        let (a, bus) = assistant(Ok("hello"));
        let mut rx = bus.subscribe();

        let exchange = a.handle_audio(vec![1, 2, 3]).await.unwrap().unwrap();

        assert_eq!(exchange.transcript, "hello");
        assert_eq!(exchange.response.speech.as_deref(), Some("you said hello"));
        assert_eq!(
            exchange.audio,
            Some(AudioHandle::Bytes(b"you said hello".to_vec()))
        );
        assert_eq!(
            drain(&mut rx),
            vec![
                (Idle, Listening),
                (Listening, Thinking),
                (Thinking, Speaking),
                (Speaking, Idle)
            ]
        );
        assert_eq!(a.state(), Idle);
    }

    #[tokio::test]
    async fn should_play_synthesised_reply() {
        let (a, _bus) = assistant(Ok(""));

        a.handle_text("hi").await.unwrap();

        assert_eq!(
            *a.sink.played.lock().unwrap(),
            vec![AudioHandle::Bytes(b"you said hi".to_vec())]
        );
    }

    #[tokio::test]
    async fn should_keep_reply_audio_when_playback_fails() {
        let a = Assistant::new(
            EchoResponder::default(),
            ScriptedStt::new(Ok("")),
            FakeTts { fail: false },
            FakeSpeaker {
                fail: true,
                ..FakeSpeaker::default()
            },
            InProcessEventBus::new(8),
        );

        let exchange = a.handle_text("hi").await.unwrap();

        assert!(exchange.audio.is_some());
        assert_eq!(a.state(), Idle);
    }

    #[tokio::test]
    async fn should_skip_listening_for_typed_text() {
        let (a, bus) = assistant(Ok(""));
        let mut rx = bus.subscribe();

        a.handle_text("hi").await.unwrap();

        assert_eq!(drain(&mut rx)[0], (Idle, Thinking));
    }

    #[tokio::test]
    async fn should_skip_speaking_when_nothing_to_say() {
        let (a, bus) = assistant(Ok(""));
        let mut rx = bus.subscribe();

        let exchange = a.handle_text("silent").await.unwrap();

        assert_eq!(exchange.audio, None);
        assert!(a.sink.played.lock().unwrap().is_empty());
        assert_eq!(drain(&mut rx), vec![(Idle, Thinking), (Thinking, Idle)]);
    }

    #[tokio::test]
    async fn should_return_to_idle_when_no_speech_detected() {
        let (a, _bus) = assistant(Ok("   "));
        assert_eq!(a.handle_audio(vec![0]).await.unwrap(), None);
        assert_eq!(a.state(), Idle);
    }

    #[tokio::test]
    async fn should_return_to_idle_when_transcription_fails() {
        let (a, _bus) = assistant(Err(ServiceError::Timeout));
        let err = a.handle_audio(vec![0]).await.unwrap_err();
        assert!(matches!(err, AstralError::Service(ServiceError::Timeout)));
        assert_eq!(a.state(), Idle);
    }

    #[tokio::test]
    async fn should_keep_reply_text_when_tts_fails() {
        let a = Assistant::new(
            EchoResponder::default(),
            ScriptedStt::new(Ok("")),
            FakeTts { fail: true },
            FakeSpeaker::default(),
            InProcessEventBus::new(8),
        );

        let exchange = a.handle_text("hi").await.unwrap();

        assert_eq!(exchange.audio, None);
        assert_eq!(exchange.response.speech.as_deref(), Some("you said hi"));
        assert!(a.sink.played.lock().unwrap().is_empty());
        assert_eq!(a.state(), Idle);
    }

    #[tokio::test]
    async fn should_handle_recording_for_claimed_cycle() {
        let (a, bus) = assistant(Ok("hello"));
        let mut rx = bus.subscribe();

        let claim = a.start_listening().await.unwrap();
        assert_eq!(a.state(), Listening);
        let exchange = a.handle_recording(claim, vec![1]).await.unwrap().unwrap();

        assert_eq!(exchange.transcript, "hello");
        assert_eq!(drain(&mut rx)[..2], [(Idle, Listening), (Listening, Thinking)]);
        assert_eq!(a.state(), Idle);
    }

    #[tokio::test]
    async fn should_reject_stale_claim() {
        let (a, _bus) = assistant(Ok("hello"));

        let stale = a.start_listening().await.unwrap();
        a.cancel_listening(ListeningClaim { cycle: stale.cycle })
            .await;
        let _current = a.start_listening().await.unwrap();

        let err = a.handle_recording(stale, vec![1]).await.unwrap_err();
        assert!(matches!(err, AstralError::Busy { state: Listening }));
        assert_eq!(a.stt.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn should_return_to_idle_when_listening_is_cancelled() {
        let (a, _bus) = assistant(Ok("hello"));
        let claim = a.start_listening().await.unwrap();
        a.cancel_listening(claim).await;
        assert_eq!(a.state(), Idle);
    }

    #[tokio::test]
    async fn should_reject_second_recording_while_first_is_transcribed() {
        let gate = Arc::new(Notify::new());
        let a = Arc::new(Assistant::new(
            EchoResponder::default(),
            ScriptedStt {
                gate: Some(Arc::clone(&gate)),
                ..ScriptedStt::new(Ok("hello"))
            },
            FakeTts { fail: false },
            FakeSpeaker::default(),
            InProcessEventBus::new(8),
        ));

        let first = tokio::spawn({
            let a = Arc::clone(&a);
            async move { a.handle_audio(vec![1]).await }
        });
        while a.stt.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(a.state(), Listening);

        let err = a.handle_audio(vec![2]).await.unwrap_err();
        assert!(matches!(err, AstralError::Busy { state: Listening }));
        assert_eq!(a.stt.calls.load(Ordering::SeqCst), 1);

        gate.notify_one();
        let exchange = first.await.unwrap().unwrap().unwrap();
        assert_eq!(exchange.transcript, "hello");
        assert_eq!(a.state(), Idle);
    }

    #[tokio::test]
    async fn should_reject_input_while_busy() {
        let gate = Arc::new(Notify::new());
        let a = Arc::new(Assistant::new(
            EchoResponder {
                gate: Some(Arc::clone(&gate)),
            },
            ScriptedStt::new(Ok("")),
            FakeTts { fail: false },
            FakeSpeaker::default(),
            InProcessEventBus::new(8),
        ));

        let first = tokio::spawn({
            let a = Arc::clone(&a);
            async move { a.handle_text("first").await }
        });
        while a.state() != Thinking {
            tokio::task::yield_now().await;
        }

        let err = a.handle_text("second").await.unwrap_err();
        assert!(matches!(err, AstralError::Busy { state: Thinking }));
        assert!(matches!(
            a.start_listening().await,
            Err(AstralError::Busy { .. })
        ));
        assert!(matches!(
            a.handle_audio(vec![0]).await,
            Err(AstralError::Busy { .. })
        ));

        gate.notify_one();
        let exchange = first.await.unwrap().unwrap();
        assert_eq!(exchange.transcript, "first");
        assert_eq!(a.state(), Idle);
    }
}
