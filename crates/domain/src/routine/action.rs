//! Action — one side-effecting step of a routine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Longest pause a single [`Action::Wait`] may request, in seconds.
pub const MAX_WAIT_SECS: u64 = 3600;

/// Highest accepted [`Action::SetVolume`] level.
pub const MAX_VOLUME: u8 = 100;

/// A single automation step. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Start an application by its registry name or alias.
    LaunchApp { app_name: String },
    /// Open a URL in the default browser.
    OpenWebsite { url: String },
    /// Show a desktop notification.
    SendNotification { title: String, message: String },
    /// Set the master output volume, `0..=100`.
    SetVolume { level: u8 },
    /// Press a media key.
    MediaControl { command: MediaCommand },
    /// Run an arbitrary shell string. Gated by the executor.
    SystemCommand { command: String },
    /// Pause the routine's own action loop.
    Wait { seconds: u64 },
    /// Say something through the TTS collaborator.
    Speak { text: String },
}

impl Action {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::VolumeOutOfRange`] for a level above 100 and
    /// [`ValidationError::WaitTooLong`] for a wait above [`MAX_WAIT_SECS`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::SetVolume { level } if *level > MAX_VOLUME => {
                Err(ValidationError::VolumeOutOfRange { level: *level })
            }
            Self::Wait { seconds } if *seconds > MAX_WAIT_SECS => Err(ValidationError::WaitTooLong {
                seconds: *seconds,
                max: MAX_WAIT_SECS,
            }),
            _ => Ok(()),
        }
    }

    /// Whether this action runs an arbitrary shell string.
    #[must_use]
    pub fn is_system_command(&self) -> bool {
        matches!(self, Self::SystemCommand { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LaunchApp { app_name } => write!(f, "launch_app({app_name})"),
            Self::OpenWebsite { url } => write!(f, "open_website({url})"),
            Self::SendNotification { title, .. } => write!(f, "send_notification({title})"),
            Self::SetVolume { level } => write!(f, "set_volume({level}%)"),
            Self::MediaControl { command } => write!(f, "media_control({command})"),
            Self::SystemCommand { .. } => f.write_str("system_command"),
            Self::Wait { seconds } => write!(f, "wait({seconds}s)"),
            Self::Speak { text } => write!(f, "speak({} chars)", text.chars().count()),
        }
    }
}

/// Media key to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCommand {
    Play,
    Pause,
    Next,
    Prev,
}

impl MediaCommand {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Next => "next",
            Self::Prev => "prev",
        }
    }
}

impl fmt::Display for MediaCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaCommand {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "play" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            "next" => Ok(Self::Next),
            "prev" | "previous" => Ok(Self::Prev),
            _ => Err(ValidationError::UnknownMediaCommand {
                value: s.to_string(),
            }),
        }
    }
}
