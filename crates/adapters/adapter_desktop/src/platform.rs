//! Per-platform command tables.
//!
//! Builders are pure: they only describe the process to start, which keeps
//! every platform's table testable from any host.

use astral_domain::routine::MediaCommand;

use crate::error::DesktopError;
use crate::registry::AppEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
}

/// Program and arguments of one child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Escape for an AppleScript double-quoted string.
fn applescript_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Escape for a PowerShell single-quoted string.
fn powershell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn powershell(script: String) -> CommandSpec {
    CommandSpec::new(
        "powershell",
        ["-NoProfile", "-NonInteractive", "-Command"]
            .into_iter()
            .map(str::to_string)
            .chain(std::iter::once(script)),
    )
}

impl Platform {
    /// The platform this binary was built for; other Unixes use the Linux
    /// tables.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Linux
        }
    }

    #[must_use]
    pub fn launch(self, app: &AppEntry) -> CommandSpec {
        match self {
            Self::Linux => match app.linux.split_first() {
                Some((program, args)) => CommandSpec::new(program, args.iter().copied()),
                None => CommandSpec::new(app.key, std::iter::empty::<&str>()),
            },
            Self::MacOs => CommandSpec::new("open", ["-a", app.name]),
            Self::Windows => CommandSpec::new("cmd", ["/C", "start", "", app.windows]),
        }
    }

    #[must_use]
    pub fn open_url(self, url: &str) -> CommandSpec {
        match self {
            Self::Linux => CommandSpec::new("xdg-open", [url]),
            Self::MacOs => CommandSpec::new("open", [url]),
            Self::Windows => CommandSpec::new("cmd", ["/C", "start", "", url]),
        }
    }

    #[must_use]
    pub fn notify(self, title: &str, message: &str) -> CommandSpec {
        match self {
            Self::Linux => CommandSpec::new("notify-send", ["--app-name=ASTRAL", title, message]),
            Self::MacOs => CommandSpec::new(
                "osascript",
                [
                    "-e".to_string(),
                    format!(
                        "display notification {} with title {}",
                        applescript_quote(message),
                        applescript_quote(title)
                    ),
                ],
            ),
            Self::Windows => powershell(format!(
                "Add-Type -AssemblyName System.Windows.Forms; \
                 $n = New-Object System.Windows.Forms.NotifyIcon; \
                 $n.Icon = [System.Drawing.SystemIcons]::Information; \
                 $n.Visible = $true; \
                 $n.ShowBalloonTip(5000, {}, {}, 'Info'); \
                 Start-Sleep -Seconds 5; $n.Dispose()",
                powershell_quote(title),
                powershell_quote(message)
            )),
        }
    }

    /// # Errors
    ///
    /// Windows has no stock command-line volume control.
    pub fn set_volume(self, level: u8) -> Result<CommandSpec, DesktopError> {
        match self {
            Self::Linux => Ok(CommandSpec::new(
                "pactl",
                [
                    "set-sink-volume".to_string(),
                    "@DEFAULT_SINK@".to_string(),
                    format!("{level}%"),
                ],
            )),
            Self::MacOs => Ok(CommandSpec::new(
                "osascript",
                ["-e".to_string(), format!("set volume output volume {level}")],
            )),
            Self::Windows => Err(DesktopError::Unsupported("volume control on windows")),
        }
    }

    #[must_use]
    pub fn media(self, command: MediaCommand) -> CommandSpec {
        match self {
            Self::Linux => {
                let verb = match command {
                    MediaCommand::Play => "play",
                    MediaCommand::Pause => "pause",
                    MediaCommand::Next => "next",
                    MediaCommand::Prev => "previous",
                };
                CommandSpec::new("playerctl", [verb])
            }
            Self::MacOs => {
                let verb = match command {
                    MediaCommand::Play => "play",
                    MediaCommand::Pause => "pause",
                    MediaCommand::Next => "next track",
                    MediaCommand::Prev => "previous track",
                };
                CommandSpec::new(
                    "osascript",
                    ["-e".to_string(), format!("tell application \"Music\" to {verb}")],
                )
            }
            Self::Windows => {
                // virtual-key codes: play/pause 0xB3, next 0xB0, previous 0xB1
                let key = match command {
                    MediaCommand::Play | MediaCommand::Pause => 179,
                    MediaCommand::Next => 176,
                    MediaCommand::Prev => 177,
                };
                powershell(format!(
                    "(New-Object -ComObject WScript.Shell).SendKeys([char]{key})"
                ))
            }
        }
    }

    #[must_use]
    pub fn shell(self, command: &str) -> CommandSpec {
        match self {
            Self::Linux | Self::MacOs => CommandSpec::new("sh", ["-c", command]),
            Self::Windows => CommandSpec::new("cmd", ["/C", command]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::find_app;

    fn spec(program: &str, args: &[&str]) -> CommandSpec {
        CommandSpec::new(program, args.iter().copied())
    }

    #[test]
    fn should_launch_from_each_platform_table() {
        let code = find_app("code").unwrap();
        assert_eq!(Platform::Linux.launch(code), spec("code", &[]));
        assert_eq!(
            Platform::MacOs.launch(code),
            spec("open", &["-a", "Visual Studio Code"])
        );
        assert_eq!(
            Platform::Windows.launch(code),
            spec("cmd", &["/C", "start", "", "code"])
        );
        let files = find_app("files").unwrap();
        assert_eq!(Platform::Linux.launch(files), spec("xdg-open", &["."]));
    }

    #[test]
    fn should_build_open_url_commands() {
        assert_eq!(
            Platform::Linux.open_url("https://news.google.com"),
            spec("xdg-open", &["https://news.google.com"])
        );
        assert_eq!(
            Platform::Windows.open_url("https://x.test"),
            spec("cmd", &["/C", "start", "", "https://x.test"])
        );
    }

    #[test]
    fn should_escape_notification_text() {
        let mac = Platform::MacOs.notify("Say \"hi\"", "done");
        assert_eq!(
            mac.args[1],
            "display notification \"done\" with title \"Say \\\"hi\\\"\""
        );
        let win = Platform::Windows.notify("It's", "ok");
        assert!(win.args[3].contains("'It''s'"));
        assert_eq!(
            Platform::Linux.notify("t", "m"),
            spec("notify-send", &["--app-name=ASTRAL", "t", "m"])
        );
    }

    #[test]
    fn should_build_volume_commands() {
        assert_eq!(
            Platform::Linux.set_volume(40).unwrap(),
            spec("pactl", &["set-sink-volume", "@DEFAULT_SINK@", "40%"])
        );
        assert_eq!(
            Platform::MacOs.set_volume(0).unwrap().args[1],
            "set volume output volume 0"
        );
        assert!(matches!(
            Platform::Windows.set_volume(10),
            Err(DesktopError::Unsupported(_))
        ));
    }

    #[test]
    fn should_map_media_commands() {
        assert_eq!(
            Platform::Linux.media(MediaCommand::Prev),
            spec("playerctl", &["previous"])
        );
        assert!(Platform::Windows.media(MediaCommand::Next).args[3].ends_with("[char]176)"));
    }

    #[test]
    fn should_wrap_shell_commands() {
        assert_eq!(Platform::Linux.shell("echo hi"), spec("sh", &["-c", "echo hi"]));
        assert_eq!(Platform::Windows.shell("dir"), spec("cmd", &["/C", "dir"]));
    }
}
