//! Response collection state machine.
//!
//! One `evaluate` transaction moves through three phases:
//!
//! ```text
//!   Sending --sent()--> Collecting { seen } --closing prompt / EOF--> Done
//! ```
//!
//! While collecting, every segment that does not start with the prompt
//! counts as output. A prompt segment closes the transaction only once at
//! least one output segment has been seen; a prompt arriving first is the
//! echo of the line just sent and is skipped.

use log::debug;

use crate::channel::normalize_response;
use crate::error::ProtocolError;

/// Phase of one request/response transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The input has not been written yet.
    Sending,

    /// Reading output; `seen` counts non-prompt segments so far.
    Collecting { seen: usize },

    /// The response is complete.
    Done,
}

/// What the engine observed on the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation<'a> {
    /// A segment beginning with the prompt marker.
    Prompt(&'a str),

    /// Any other segment.
    Output(&'a str),

    /// End of stream.
    Closed,
}

/// Outcome of feeding one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Keep reading.
    Continue,

    /// The closing prompt arrived.
    Complete,

    /// The stream ended after some output; the result is truncated.
    Truncated,
}

/// Accumulates one response.
#[derive(Debug)]
pub struct Collector {
    phase: Phase,
    output: String,
    truncated: bool,
}

/// A finished response before it is wrapped in a `Response`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collected {
    /// Segments in arrival order, unmodified.
    pub raw: String,

    /// Normalized text.
    pub text: String,

    /// Whether the stream closed before a closing prompt.
    pub truncated: bool,
}

impl Collector {
    /// Start a transaction in the `Sending` phase.
    pub fn new() -> Self {
        Self {
            phase: Phase::Sending,
            output: String::new(),
            truncated: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Output accumulated so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Record that the input line was written.
    pub fn sent(&mut self) {
        if self.phase == Phase::Sending {
            self.phase = Phase::Collecting { seen: 0 };
        }
    }

    /// Feed one observation.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::StreamClosed` when the stream ends before
    /// any output was seen.
    ///
    /// Observations before [`sent`](Self::sent) are ignored, and a finished
    /// collector stays finished.
    pub fn observe(&mut self, observation: Observation<'_>) -> Result<Transition, ProtocolError> {
        let seen = match self.phase {
            Phase::Sending => return Ok(Transition::Continue),
            Phase::Done if self.truncated => return Ok(Transition::Truncated),
            Phase::Done => return Ok(Transition::Complete),
            Phase::Collecting { seen } => seen,
        };

        match observation {
            Observation::Output(segment) => {
                self.output.push_str(segment);
                self.phase = Phase::Collecting { seen: seen + 1 };
                Ok(Transition::Continue)
            }
            Observation::Prompt(_) if seen >= 1 => {
                self.phase = Phase::Done;
                Ok(Transition::Complete)
            }
            Observation::Prompt(segment) => {
                debug!("skipping prompt before any output: {:?}", segment);
                self.phase = Phase::Collecting { seen: 0 };
                Ok(Transition::Continue)
            }
            Observation::Closed if seen == 0 => Err(ProtocolError::StreamClosed),
            Observation::Closed => {
                self.phase = Phase::Done;
                self.truncated = true;
                Ok(Transition::Truncated)
            }
        }
    }

    /// Finish the transaction, normalizing the accumulated output.
    pub fn finish(self, response_marker: Option<&str>) -> Collected {
        let text = normalize_response(&self.output, response_marker).to_string();
        Collected {
            raw: self.output,
            text,
            truncated: self.truncated,
        }
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}
