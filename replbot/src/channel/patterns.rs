//! Prompt and response marker matching.

use regex::Regex;

/// Default marker a REPL prints at the start of its idle prompt line.
pub const DEFAULT_PROMPT_MARKER: &str = "In:";

/// Default marker a REPL may print before a result.
pub const DEFAULT_RESPONSE_MARKER: &str = "Out:";

/// Trait for prompt detection - literal marker by default, regex when needed.
pub trait PromptMatcher: Send + Sync {
    /// Whether `segment` begins with the prompt.
    ///
    /// Used to find the end of a response, so it must only accept the
    /// marker at the start of the segment.
    fn starts_prompt(&self, segment: &str) -> bool;

    /// Whether the prompt appears anywhere in `text`.
    ///
    /// Used while waiting for the target to become ready, when the prompt
    /// may follow banner text on the same line.
    fn appears_in(&self, text: &str) -> bool;
}

/// Literal prompt prefix such as `In:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMarker {
    marker: String,
}

impl PromptMarker {
    /// Create a marker from its literal text.
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl Default for PromptMarker {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT_MARKER)
    }
}

/// Line editors often redraw with a bare `\r` before the prompt.
fn line_start(segment: &str) -> &str {
    segment.trim_start_matches('\r')
}

impl PromptMatcher for PromptMarker {
    fn starts_prompt(&self, segment: &str) -> bool {
        line_start(segment).starts_with(&self.marker)
    }

    fn appears_in(&self, text: &str) -> bool {
        text.contains(&self.marker)
    }
}

/// Regex-based prompt matcher for REPLs whose prompt is not a fixed prefix.
impl PromptMatcher for Regex {
    fn starts_prompt(&self, segment: &str) -> bool {
        self.find(line_start(segment)).is_some_and(|m| m.start() == 0)
    }

    fn appears_in(&self, text: &str) -> bool {
        self.is_match(text)
    }
}

/// Normalize a collected response.
///
/// Leading whitespace is trimmed, then one leading `marker` is removed if
/// present, then the rest is trimmed. The marker is never removed twice.
pub fn normalize_response<'a>(raw: &'a str, marker: Option<&str>) -> &'a str {
    let text = raw.trim_start();
    let text = match marker {
        Some(marker) if !marker.is_empty() => text.strip_prefix(marker).unwrap_or(text),
        _ => text,
    };
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_prefix_only() {
        let marker = PromptMarker::default();
        assert!(marker.starts_prompt("In: "));
        assert!(marker.starts_prompt("In: fact(4)\r\n"));
        assert!(marker.starts_prompt("\rIn: "));
        assert!(!marker.starts_prompt("24 In: "));
        assert!(!marker.starts_prompt("Out: 9"));
    }

    #[test]
    fn test_marker_anywhere() {
        let marker = PromptMarker::default();
        assert!(marker.appears_in("Welcome to IRust\nIn: "));
        assert!(!marker.appears_in("Compiling irust v1.0"));
    }

    #[test]
    fn test_regex_matcher() {
        let prompt = Regex::new(r">>> ").unwrap();
        assert!(prompt.starts_prompt(">>> "));
        assert!(!prompt.starts_prompt("x >>> "));
        assert!(prompt.appears_in("Python 3\n>>> "));
    }

    #[test]
    fn test_normalize_strips_marker_once() {
        assert_eq!(normalize_response("Out: 9\r\n", Some("Out:")), "9");
        assert_eq!(normalize_response("Out:Out: 9", Some("Out:")), "Out: 9");
        assert_eq!(normalize_response("\r\nOut: 24 ", Some("Out:")), "24");
    }

    #[test]
    fn test_normalize_marker_after_leading_line_break() {
        // The marker counts once leading whitespace is gone, not only at offset 0.
        assert_eq!(normalize_response("\r\nOut: 9", Some("Out:")), "9");
        assert_eq!(normalize_response("Out: 9", Some("Out:")), "9");
        // Anywhere past the start it is left alone.
        assert_eq!(normalize_response("\r\nresult Out: 9", Some("Out:")), "result Out: 9");
    }

    #[test]
    fn test_normalize_without_marker() {
        assert_eq!(
            normalize_response("  error: cannot find value `z`\n", Some("Out:")),
            "error: cannot find value `z`"
        );
        assert_eq!(normalize_response("Out: 9", None), "Out: 9");
    }
}
