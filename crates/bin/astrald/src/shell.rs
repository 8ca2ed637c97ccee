//! Line commands of the interactive text shell.
//!
//! Anything that does not start with `/` is spoken to the assistant.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Quit,
    Help,
    /// List the routine catalog.
    Routines,
    Toggle(String),
    /// Forget the LLM conversation.
    Clear,
    Say(String),
    Unknown(String),
}

pub const USAGE: &str = "commands: /routines, /toggle <id>, /clear, /help, /quit; anything else is sent to ASTRAL";

impl ShellCommand {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Self::Say(line.to_string());
        };
        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(n, a)| (n, a.trim()));
        match (name, arg) {
            ("quit" | "exit", _) => Self::Quit,
            ("help", _) => Self::Help,
            ("routines", _) => Self::Routines,
            ("toggle", id) if !id.is_empty() => Self::Toggle(id.to_string()),
            ("clear", _) => Self::Clear,
            _ => Self::Unknown(line.to_string()),
        }
    }
}
