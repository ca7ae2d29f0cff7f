//! Error types for replbot.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for replbot operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Pseudo-terminal or process errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Prompt synchronization errors
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A check produced output that did not match its expectation
    #[error("{0}")]
    Assertion(#[from] AssertionError),

    /// Scenario definition or loading errors
    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),
}

/// Transport layer errors (process spawn, PTY I/O).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to allocate a pseudo-terminal
    #[error("Failed to open pseudo-terminal: {0}")]
    PtyOpenFailed(String),

    /// Failed to start the target process
    #[error("Failed to spawn `{command}`: {message}")]
    SpawnFailed { command: String, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Prompt synchronization errors.
///
/// Both variants are fatal to the session; nothing retries them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The stream ended before the expected marker or any output was seen
    #[error("Stream closed before the prompt was observed")]
    StreamClosed,

    /// An externally imposed wall-clock limit expired
    #[error("No prompt within {0:?}")]
    Timeout(Duration),
}

/// A check whose output did not match what was expected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Check failed for `{input}`:\n  expected: {expected}\n    actual: {actual:?}")]
pub struct AssertionError {
    /// The input line that was evaluated.
    pub input: String,

    /// Display form of the expectation (quoted literal or `/pattern/`).
    pub expected: String,

    /// The normalized output that was received.
    pub actual: String,
}

/// Scenario definition and loading errors.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// Invalid regex pattern in an expectation
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Suite file could not be read
    #[error("Failed to read suite file {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Suite file is not valid JSON or has the wrong shape
    #[error("Failed to parse suite: {0}")]
    Parse(#[from] serde_json::Error),

    /// A scenario was requested by name but the suite has none by that name
    #[error("Unknown scenario '{name}'")]
    UnknownScenario { name: String },
}

/// Result type alias using replbot's Error.
pub type Result<T> = std::result::Result<T, Error>;
