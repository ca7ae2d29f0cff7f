//! Protocol settings for a session.

use std::time::Duration;

use crate::channel::{DEFAULT_PROMPT_MARKER, DEFAULT_RESPONSE_MARKER, DEFAULT_SETTLE};

/// Line terminator appended to every input line.
pub const DEFAULT_LINE_TERMINATOR: &str = "\n\r";

/// Protocol settings for a [`Session`](super::Session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Literal prefix of the idle prompt line.
    pub prompt_marker: String,

    /// Prefix stripped once from each response, if any.
    pub response_marker: Option<String>,

    /// Appended to every input line.
    pub line_terminator: String,

    /// Quiet period after which a partial line is treated as complete.
    pub settle: Duration,

    /// Optional wall-clock limit applied around each call by the runner.
    /// The protocol itself never times out.
    pub timeout: Option<Duration>,

    /// Largest chunk requested from the transport per read.
    pub read_buffer_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prompt_marker: DEFAULT_PROMPT_MARKER.to_string(),
            response_marker: Some(DEFAULT_RESPONSE_MARKER.to_string()),
            line_terminator: DEFAULT_LINE_TERMINATOR.to_string(),
            settle: DEFAULT_SETTLE,
            timeout: None,
            read_buffer_size: 4096,
        }
    }
}
