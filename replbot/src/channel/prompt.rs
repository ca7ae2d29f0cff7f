//! Segment reader over a terminal transport.

use std::time::Duration;

use log::trace;

use super::ansi::AnsiStripper;
use super::buffer::SegmentBuffer;
use super::patterns::PromptMatcher;
use crate::error::Result;
use crate::transport::TerminalChannel;

/// Default quiet period after which a partial line counts as a segment.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(100);

/// Reads stripped, coalesced segments from a transport.
///
/// A segment is a complete line, or the partial line left over once one of
/// these happens:
///
/// - the stream has been quiet for the settle interval, or has closed
/// - the partial line starts with the prompt and more data arrives
/// - a newly read chunk starts with the prompt
///
/// Otherwise segments follow the text, not the read boundaries.
pub struct PromptChannel<T> {
    transport: T,
    prompt: Box<dyn PromptMatcher>,
    stripper: AnsiStripper,
    buffer: SegmentBuffer,
    /// Partial line cut at a read boundary, handed out before the buffer.
    cut: Option<String>,
    settle: Duration,
    closed: bool,
}

impl<T: TerminalChannel> PromptChannel<T> {
    /// Wrap a transport.
    pub fn new(transport: T, prompt: Box<dyn PromptMatcher>, settle: Duration) -> Self {
        Self {
            transport,
            prompt,
            stripper: AnsiStripper::new(),
            buffer: SegmentBuffer::new(),
            cut: None,
            settle,
            closed: false,
        }
    }

    /// Next segment, or `None` once the stream has ended and nothing is left.
    ///
    /// Waits indefinitely for data while no partial line is pending.
    pub async fn next_segment(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(partial) = self.cut.take() {
                trace!("segment (cut): {:?}", partial);
                return Ok(Some(partial));
            }

            if let Some(line) = self.buffer.next_line() {
                trace!("segment (line): {:?}", line);
                return Ok(Some(line));
            }

            if self.closed {
                return Ok(self.buffer.take_partial());
            }

            let chunk = if self.buffer.has_pending() {
                match tokio::time::timeout(self.settle, self.transport.read()).await {
                    Ok(chunk) => chunk?,
                    Err(_) => {
                        let partial = self.buffer.take_partial();
                        trace!("segment (settled): {:?}", partial);
                        return Ok(partial);
                    }
                }
            } else {
                self.transport.read().await?
            };

            match chunk {
                Some(data) => {
                    let text = self.stripper.strip(&data);
                    if self.buffer.has_pending()
                        && (self.prompt.starts_prompt(self.buffer.as_str())
                            || self.prompt.starts_prompt(&text))
                    {
                        self.cut = self.buffer.take_partial();
                    }
                    self.buffer.push(&text);
                }
                None => {
                    trace!("stream closed with {} bytes pending", self.buffer.len());
                    self.closed = true;
                }
            }
        }
    }

    /// Write raw bytes to the transport.
    pub async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.transport.write(data).await
    }

    /// Close the underlying transport.
    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await
    }

    /// Whether the transport has reported end of stream.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The matcher used to recognize the idle prompt.
    pub fn prompt(&self) -> &dyn PromptMatcher {
        self.prompt.as_ref()
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
