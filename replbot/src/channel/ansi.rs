//! Terminal escape stripping built on the vte parser.
//!
//! Only printable text plus `\n`, `\r` and `\t` survive. CSI, OSC, DCS and
//! other control sequences are dropped without being interpreted.

use vte::{Parser, Perform};

/// Collects printable output from the parser.
#[derive(Debug, Default)]
struct TextCollector {
    out: String,
}

impl Perform for TextCollector {
    fn print(&mut self, c: char) {
        self.out.push(c);
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.out.push(byte as char);
        }
    }
}

/// Incremental escape stripper.
///
/// Parser state survives between calls, so an escape sequence or a UTF-8
/// character split across two chunks is still removed or decoded correctly.
#[derive(Default)]
pub struct AnsiStripper {
    parser: Parser,
    collector: TextCollector,
}

impl AnsiStripper {
    /// Create a stripper in the ground state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip one chunk, returning the text it completes.
    pub fn strip(&mut self, data: &[u8]) -> String {
        self.parser.advance(&mut self.collector, data);
        std::mem::take(&mut self.collector.out)
    }
}

/// Strip escape sequences from a complete piece of text.
pub fn strip(text: &str) -> String {
    AnsiStripper::new().strip(text.as_bytes())
}
