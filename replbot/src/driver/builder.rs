//! Builder for creating sessions.

use std::path::PathBuf;
use std::time::Duration;

use log::info;

use super::config::SessionConfig;
use super::session::Session;
use crate::error::Result;
use crate::transport::{PtyTransport, SpawnConfig, TerminalChannel};

/// Builder for constructing sessions.
///
/// # Example
///
/// ```rust,no_run
/// use replbot::SessionBuilder;
///
/// # async fn example() -> Result<(), replbot::Error> {
/// let mut session = SessionBuilder::new("cargo")
///     .args(["run", "--", "--default-config"])
///     .spawn()?;
///
/// session.await_ready().await?;
/// let response = session.evaluate("5+4").await?;
/// assert_eq!(response.result, "9");
/// session.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    spawn: SpawnConfig,
    config: SessionConfig,
}

impl SessionBuilder {
    /// Create a new builder for the specified program.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            spawn: SpawnConfig::new(command),
            config: SessionConfig::default(),
        }
    }

    /// Start from an existing spawn configuration.
    pub fn from_spawn_config(spawn: SpawnConfig) -> Self {
        Self {
            spawn,
            config: SessionConfig::default(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.spawn.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spawn.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.spawn.env.insert(key.into(), value.into());
        self
    }

    /// Set the child's working directory.
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.spawn.cwd = Some(cwd.into());
        self
    }

    /// Set terminal dimensions.
    pub fn terminal_size(mut self, width: u16, height: u16) -> Self {
        self.spawn.terminal_width = width;
        self.spawn.terminal_height = height;
        self
    }

    /// Set the literal prompt marker (default `In:`).
    pub fn prompt_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.prompt_marker = marker.into();
        self
    }

    /// Set the response marker stripped from results (default `Out:`).
    pub fn response_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.response_marker = Some(marker.into());
        self
    }

    /// Return results without stripping any response marker.
    pub fn no_response_marker(mut self) -> Self {
        self.config.response_marker = None;
        self
    }

    /// Set the line terminator (default `"\n\r"`).
    pub fn line_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.config.line_terminator = terminator.into();
        self
    }

    /// Set the quiet period that completes a partial line.
    pub fn settle(mut self, settle: Duration) -> Self {
        self.config.settle = settle;
        self
    }

    /// Set the wall-clock limit the scenario runner applies per call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set the transport read size.
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// Replace the protocol settings wholesale.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// The spawn configuration built so far.
    pub fn spawn_config(&self) -> &SpawnConfig {
        &self.spawn
    }

    /// The protocol settings built so far.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Spawn the program in a pseudo-terminal.
    ///
    /// The returned session is not ready yet; call `await_ready()` first.
    pub fn spawn(self) -> Result<Session<PtyTransport>> {
        info!("spawning `{}`", self.spawn.command_line());
        let transport = PtyTransport::spawn(self.spawn, self.config.read_buffer_size)?;
        Ok(Session::new(transport, self.config))
    }

    /// Build a session over an already connected transport.
    ///
    /// The spawn configuration is ignored.
    pub fn attach<T: TerminalChannel>(self, transport: T) -> Session<T> {
        Session::new(transport, self.config)
    }
}
