//! Coalescing buffer that turns stripped chunks into segments.
//!
//! Terminal output arrives in arbitrary pieces. The buffer holds text until
//! it forms a complete line; whatever is left over stays pending until the
//! caller decides the stream has gone quiet and takes it as a partial line.
//! Segment boundaries therefore follow the text, not the chunking.

/// Pending-text buffer yielding line-sized segments.
#[derive(Debug, Default)]
pub struct SegmentBuffer {
    /// Stripped text not yet handed out.
    pending: String,
}

impl SegmentBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            pending: String::with_capacity(1024),
        }
    }

    /// Append stripped text.
    pub fn push(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    /// Take the next complete line, including its `\n`.
    pub fn next_line(&mut self) -> Option<String> {
        let end = memchr::memchr(b'\n', self.pending.as_bytes())? + 1;
        let rest = self.pending.split_off(end);
        Some(std::mem::replace(&mut self.pending, rest))
    }

    /// Take whatever is pending as a segment, if anything.
    ///
    /// Call only when no complete line is left.
    pub fn take_partial(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }

    /// Whether text is pending.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Pending text, for diagnostics.
    pub fn as_str(&self) -> &str {
        &self.pending
    }

    /// Number of pending bytes.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Check if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
