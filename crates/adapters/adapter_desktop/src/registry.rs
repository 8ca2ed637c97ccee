//! Known applications and how to start them on each platform.

/// A launchable application.
#[derive(Debug, PartialEq, Eq)]
pub struct AppEntry {
    /// Lookup key, lowercase.
    pub key: &'static str,
    /// Display name; also the macOS application name.
    pub name: &'static str,
    /// Windows executable or `start` target.
    pub windows: &'static str,
    /// Linux argv.
    pub linux: &'static [&'static str],
    /// Lowercase spoken alternatives.
    pub aliases: &'static [&'static str],
}

pub const APPS: &[AppEntry] = &[
    AppEntry {
        key: "chrome",
        name: "Google Chrome",
        windows: "chrome",
        linux: &["google-chrome"],
        aliases: &["chrome", "google chrome", "browser"],
    },
    AppEntry {
        key: "firefox",
        name: "Firefox",
        windows: "firefox",
        linux: &["firefox"],
        aliases: &["firefox", "mozilla"],
    },
    AppEntry {
        key: "edge",
        name: "Microsoft Edge",
        windows: "msedge",
        linux: &["microsoft-edge"],
        aliases: &["edge", "microsoft edge"],
    },
    AppEntry {
        key: "spotify",
        name: "Spotify",
        windows: "spotify.exe",
        linux: &["spotify"],
        aliases: &["spotify", "music"],
    },
    AppEntry {
        key: "vlc",
        name: "VLC Media Player",
        windows: "vlc",
        linux: &["vlc"],
        aliases: &["vlc", "video player"],
    },
    AppEntry {
        key: "discord",
        name: "Discord",
        windows: "Discord.exe",
        linux: &["discord"],
        aliases: &["discord"],
    },
    AppEntry {
        key: "slack",
        name: "Slack",
        windows: "slack",
        linux: &["slack"],
        aliases: &["slack"],
    },
    AppEntry {
        key: "teams",
        name: "Microsoft Teams",
        windows: "ms-teams",
        linux: &["teams-for-linux"],
        aliases: &["teams", "microsoft teams"],
    },
    AppEntry {
        key: "vscode",
        name: "Visual Studio Code",
        windows: "code",
        linux: &["code"],
        aliases: &["vscode", "vs code", "code", "visual studio code"],
    },
    AppEntry {
        key: "notepad",
        name: "Notepad",
        windows: "notepad",
        linux: &["gedit"],
        aliases: &["notepad", "text editor"],
    },
    AppEntry {
        key: "explorer",
        name: "File Explorer",
        windows: "explorer",
        linux: &["xdg-open", "."],
        aliases: &["explorer", "file explorer", "files", "folder"],
    },
    AppEntry {
        key: "calculator",
        name: "Calculator",
        windows: "calc",
        linux: &["gnome-calculator"],
        aliases: &["calculator", "calc"],
    },
    AppEntry {
        key: "calendar",
        name: "Calendar",
        windows: "outlookcal:",
        linux: &["gnome-calendar"],
        aliases: &["calendar", "agenda"],
    },
    AppEntry {
        key: "terminal",
        name: "Terminal",
        windows: "wt",
        linux: &["x-terminal-emulator"],
        aliases: &["terminal", "windows terminal", "command prompt", "cmd"],
    },
    AppEntry {
        key: "powershell",
        name: "PowerShell",
        windows: "powershell",
        linux: &["pwsh"],
        aliases: &["powershell", "pwsh"],
    },
];

/// Resolve a spoken application name: exact key first, then an exact
/// alias, then the first alias contained in the query. Ties go to table
/// order.
#[must_use]
pub fn find_app(query: &str) -> Option<&'static AppEntry> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    APPS.iter()
        .find(|app| app.key == query)
        .or_else(|| APPS.iter().find(|app| app.aliases.contains(&query.as_str())))
        .or_else(|| {
            APPS.iter()
                .find(|app| app.aliases.iter().any(|alias| query.contains(alias)))
        })
}
