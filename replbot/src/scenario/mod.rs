//! Scenarios: ordered send and check steps run against one session.
//!
//! A check sends a line, waits for the response and compares it with an
//! [`Expected`] value. A send only writes the line, for statements that
//! print nothing.
//!
//! # Example
//!
//! ```rust
//! use replbot::scenario::{Expected, Scenario};
//!
//! # fn example() -> Result<(), replbot::error::ScenarioError> {
//! let scenario = Scenario::new("arithmetic")
//!     .send("let a = 2;")
//!     .check("a + a", "4")
//!     .check("z", Expected::pattern(r"cannot find value `z`")?);
//! assert_eq!(scenario.checks(), 2);
//! # Ok(())
//! # }
//! ```

pub mod builtin;
mod expect;
mod runner;
mod suite;

pub use expect::Expected;
pub use runner::{
    ConsoleReporter, Reporter, ScenarioReport, ScenarioRunner, StepOutcome, SuiteReport,
};
pub use suite::{SessionSettings, Suite};

/// One step of a scenario.
#[derive(Debug, Clone)]
pub enum Step {
    /// Write a line without reading a response.
    Send(String),

    /// Evaluate a line and compare the response.
    Check {
        /// The line to evaluate.
        input: String,

        /// What the response must be.
        expected: Expected,
    },
}

impl Step {
    /// The line this step sends.
    pub fn input(&self) -> &str {
        match self {
            Self::Send(input) | Self::Check { input, .. } => input,
        }
    }
}

/// A named, ordered list of steps.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Scenario name, used in reports.
    pub name: String,

    /// Steps in execution order.
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Create an empty scenario.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Add a write-only step.
    pub fn send(mut self, input: impl Into<String>) -> Self {
        self.steps.push(Step::Send(input.into()));
        self
    }

    /// Add a check step.
    pub fn check(mut self, input: impl Into<String>, expected: impl Into<Expected>) -> Self {
        self.steps.push(Step::Check {
            input: input.into(),
            expected: expected.into(),
        });
        self
    }

    /// Add an already built step.
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Number of check steps.
    pub fn checks(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step, Step::Check { .. }))
            .count()
    }
}
