//! Expected results: an exact string or a pattern.

use std::fmt;

use regex::Regex;

use crate::error::ScenarioError;

/// What a check expects the normalized output to be.
#[derive(Debug, Clone)]
pub enum Expected {
    /// Byte-for-byte equality with the trimmed output.
    Exact(String),

    /// The trimmed output contains a match anywhere.
    Pattern(Regex),
}

impl Expected {
    /// Expect exactly `text`.
    pub fn exact(text: impl Into<String>) -> Self {
        Self::Exact(text.into())
    }

    /// Expect output containing a match for `pattern`.
    pub fn pattern(pattern: &str) -> Result<Self, ScenarioError> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    /// Check `actual` against the expectation.
    pub fn matches(&self, actual: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == actual,
            Self::Pattern(pattern) => pattern.is_match(actual),
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(expected) => write!(f, "{:?}", expected),
            Self::Pattern(pattern) => write!(f, "/{}/", pattern.as_str()),
        }
    }
}

impl From<&str> for Expected {
    fn from(text: &str) -> Self {
        Self::exact(text)
    }
}

impl From<String> for Expected {
    fn from(text: String) -> Self {
        Self::Exact(text)
    }
}

impl From<Regex> for Expected {
    fn from(pattern: Regex) -> Self {
        Self::Pattern(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_requires_equality() {
        let expected = Expected::exact("9");
        assert!(expected.matches("9"));
        assert!(!expected.matches("9 "));
        assert!(!expected.matches("99"));
    }

    #[test]
    fn test_pattern_matches_anywhere() {
        let expected = Expected::pattern(r"cannot find value `z`").unwrap();
        assert!(expected.matches(
            "error[E0425]: cannot find value `z` in this scope\n --> src/main.rs"
        ));
        assert!(!expected.matches("cannot find value `y`"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            Expected::pattern("(unclosed"),
            Err(ScenarioError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Expected::exact("`&str`").to_string(), "\"`&str`\"");
        assert_eq!(Expected::pattern("a.*a").unwrap().to_string(), "/a.*a/");
    }

    #[test]
    fn test_conversions() {
        assert!(matches!(Expected::from("4"), Expected::Exact(ref s) if s == "4"));
        let pattern = Regex::new(r"\d+").unwrap();
        assert!(Expected::from(pattern).matches("24"));
    }
}
