//! Process spawn configuration.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;

/// How to launch the target REPL.
///
/// Deserializable so suite files can carry it. Unset fields take the
/// defaults below, which include `NO_COLOR=1`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Program to run.
    pub command: String,

    /// Arguments passed to the program.
    pub args: Vec<String>,

    /// Extra environment variables, applied in order.
    pub env: IndexMap<String, String>,

    /// Working directory (inherits the harness's when `None`).
    pub cwd: Option<PathBuf>,

    /// Terminal width for the PTY.
    pub terminal_width: u16,

    /// Terminal height for the PTY.
    pub terminal_height: u16,
}

impl SpawnConfig {
    /// Create a configuration for `command` with default terminal settings.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    /// Replace the argument list.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// The full command line, for logs and error messages.
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        let mut env = IndexMap::new();
        env.insert("NO_COLOR".to_string(), "1".to_string());
        env.insert("TERM".to_string(), "xterm".to_string());

        Self {
            command: String::new(),
            args: Vec::new(),
            env,
            cwd: None,
            terminal_width: 200,
            terminal_height: 24,
        }
    }
}
