//! Prompt-synchronization engine.
//!
//! The driver layer waits for the target to become ready, sends one line at
//! a time, and collects the output framed between two idle prompts.

mod builder;
pub mod collector;
mod config;
pub(crate) mod response;
mod session;

pub use builder::SessionBuilder;
pub use collector::{Collected, Collector, Observation, Phase, Transition};
pub use config::{DEFAULT_LINE_TERMINATOR, SessionConfig};
pub use response::Response;
pub use session::{Session, bounded};
