//! # replbot
//!
//! Scripted testing for interactive REPLs over a pseudo-terminal.
//!
//! replbot spawns a REPL under a PTY, waits for its input prompt, and then
//! runs lines through it one at a time, comparing each response with an
//! expected value. Output is framed between two idle prompts, so it works
//! with any REPL that prints a recognizable prompt after every evaluation.
//!
//! ## Layers
//!
//! - [`transport`]: raw bytes in and out of the target (PTY, async I/O, or
//!   a scripted stream for tests)
//! - [`channel`]: ANSI stripping and line segmentation with a quiet-period
//!   flush for prompts that lack a trailing newline
//! - [`driver`]: the prompt-synchronization protocol (`await_ready`,
//!   `evaluate`)
//! - [`scenario`]: expectations, scenarios, suites and the runner
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use replbot::{ConsoleReporter, Scenario, ScenarioRunner, SessionBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), replbot::Error> {
//!     let mut session = SessionBuilder::new("cargo")
//!         .args(["run", "--", "--default-config"])
//!         .spawn()?;
//!
//!     session.await_ready().await?;
//!
//!     let scenario = Scenario::new("arithmetic")
//!         .send("let a = 2;")
//!         .check("a + a", "4");
//!
//!     let mut runner = ScenarioRunner::new(&mut session, ConsoleReporter::stdout());
//!     runner.run(&scenario).await?;
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod driver;
pub mod error;
pub mod scenario;
pub mod transport;

pub use driver::{Response, Session, SessionBuilder, SessionConfig};
pub use error::{Error, Result};
pub use scenario::{ConsoleReporter, Expected, Reporter, Scenario, ScenarioRunner, Suite};
pub use transport::{PtyTransport, SpawnConfig, TerminalChannel};
