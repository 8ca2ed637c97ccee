//! Action executor — performs the side effect of one routine action.
//!
//! Every [`Action`] variant maps to exactly one external effect (or a
//! timer, for [`Action::Wait`]); `Speak` is synthesis followed by playback. Failures are classified into
//! [`ActionError`] and handed back; nothing here aborts a routine.

use std::future::Future;
use std::time::Duration;

use astral_domain::error::ActionError;
use astral_domain::routine::Action;

use crate::ports::{AppLauncher, AudioSink, Desktop, TextToSpeech};

/// Runs a single action. The routine engine only depends on this seam.
pub trait ActionRunner {
    fn run(&self, action: &Action) -> impl Future<Output = Result<(), ActionError>> + Send;
}

/// Executor policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Whether [`Action::SystemCommand`] may run at all. Off by default:
    /// only routine authors who opt in through configuration get a shell.
    pub allow_system_commands: bool,
    /// Upper bound for any single non-`Wait` action.
    pub action_timeout: Option<Duration>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            allow_system_commands: false,
            action_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Default [`ActionRunner`] backed by desktop, launcher, TTS and playback
/// collaborators.
pub struct ActionExecutor<D, L, T, A> {
    desktop: D,
    launcher: L,
    tts: T,
    sink: A,
    config: ExecutorConfig,
}

impl<D, L, T, A> ActionExecutor<D, L, T, A>
where
    D: Desktop + Sync,
    L: AppLauncher + Sync,
    T: TextToSpeech + Sync,
    A: AudioSink + Sync,
{
    pub fn new(desktop: D, launcher: L, tts: T, sink: A, config: ExecutorConfig) -> Self {
        Self {
            desktop,
            launcher,
            tts,
            sink,
            config,
        }
    }

    async fn perform(&self, action: &Action) -> Result<(), ActionError> {
        match action {
            Action::LaunchApp { app_name } => {
                let launched = self.launcher.launch(app_name).await?;
                tracing::debug!(resolved = %launched.resolved_name, "application launched");
                Ok(())
            }
            Action::OpenWebsite { url } => Ok(self.desktop.open_url(url).await?),
            Action::SendNotification { title, message } => {
                Ok(self.desktop.notify(title, message).await?)
            }
            Action::SetVolume { level } => {
                action
                    .validate()
                    .map_err(|err| ActionError::ExternalFailure(err.to_string()))?;
                Ok(self.desktop.set_volume(*level).await?)
            }
            Action::MediaControl { command } => Ok(self.desktop.media(*command).await?),
            Action::SystemCommand { command } => Ok(self.desktop.run_shell(command).await?),
            Action::Speak { text } => {
                let audio = self.tts.speak(text).await?;
                Ok(self.sink.play(&audio).await?)
            }
            Action::Wait { seconds } => {
                tokio::time::sleep(Duration::from_secs(*seconds)).await;
                Ok(())
            }
        }
    }
}

impl<D, L, T, A> ActionRunner for ActionExecutor<D, L, T, A>
where
    D: Desktop + Sync,
    L: AppLauncher + Sync,
    T: TextToSpeech + Sync,
    A: AudioSink + Sync,
{
    async fn run(&self, action: &Action) -> Result<(), ActionError> {
        if action.is_system_command() && !self.config.allow_system_commands {
            return Err(ActionError::PermissionDenied(
                "system commands are disabled".to_string(),
            ));
        }

        // Wait suspends only this routine; it is never cut short by the timeout.
        let limit = match action {
            Action::Wait { .. } => None,
            _ => self.config.action_timeout,
        };

        match limit {
            Some(limit) => tokio::time::timeout(limit, self.perform(action))
                .await
                .map_err(|_| ActionError::Timeout)?,
            None => self.perform(action).await,
        }
    }
}
