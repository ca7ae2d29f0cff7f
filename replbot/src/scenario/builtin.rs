//! Built-in suite for the IRust REPL.
//!
//! Runs IRust from its source checkout with `cargo run -- --default-config`,
//! so the working directory must be the IRust repository.

use super::{Expected, Scenario, Suite};
use crate::error::ScenarioError;
use crate::transport::SpawnConfig;

/// Recursive function definition sent as a single multi-line input.
const FACT: &str = "fn fact(n: usize) -> usize {
      match n {
        1 => 1,
        n => n * fact(n-1)
      }
  }";

/// Create the IRust suite.
pub fn irust() -> Result<Suite, ScenarioError> {
    let spawn = SpawnConfig::new("cargo").with_args(["run", "--", "--default-config"]);

    let basics = Scenario::new("basics")
        .send(r#"let a = "hello";"#)
        .check(":type a", "`&str`")
        .send(FACT)
        .check("fact(4)", "24")
        .check("5+4", "9")
        .check("z", Expected::pattern(r"cannot find value `z`")?)
        .check("let a = 2; a + a", "4");

    Ok(Suite::new(spawn).with_scenario(basics))
}
