//! Response type for evaluation results.

use std::time::Duration;

/// Response from one `evaluate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The input line that was sent.
    pub input: String,

    /// The normalized output (response marker removed, trimmed).
    pub result: String,

    /// Output segments as received, after escape stripping.
    pub raw_result: String,

    /// Time from sending the input to the end of collection.
    pub elapsed: Duration,

    /// True when the stream closed before the closing prompt.
    pub truncated: bool,
}

impl Response {
    /// Create a response that ended on a closing prompt.
    pub fn new(
        input: impl Into<String>,
        result: impl Into<String>,
        raw_result: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            input: input.into(),
            result: result.into(),
            raw_result: raw_result.into(),
            elapsed,
            truncated: false,
        }
    }

    /// Create a response cut short by end of stream.
    pub fn truncated(
        input: impl Into<String>,
        result: impl Into<String>,
        raw_result: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            truncated: true,
            ..Self::new(input, result, raw_result, elapsed)
        }
    }

    /// Check if the response ended on a closing prompt.
    pub fn is_complete(&self) -> bool {
        !self.truncated
    }

    /// Get the result lines as an iterator.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.result.lines()
    }

    /// Check if the result contains a substring.
    pub fn contains(&self, pattern: &str) -> bool {
        self.result.contains(pattern)
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}
