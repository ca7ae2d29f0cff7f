//! Channel layer for escape stripping, chunk coalescing and prompt detection.
//!
//! This module turns the raw chunks a transport delivers into clean text
//! segments the protocol engine can classify.

pub mod ansi;
mod buffer;
mod patterns;
mod prompt;

pub use ansi::{AnsiStripper, strip};
pub use buffer::SegmentBuffer;
pub use patterns::{
    DEFAULT_PROMPT_MARKER, DEFAULT_RESPONSE_MARKER, PromptMarker, PromptMatcher,
    normalize_response,
};
pub use prompt::{DEFAULT_SETTLE, PromptChannel};
