//! Scenario execution and progress reporting.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use log::{debug, info};

use super::{Expected, Scenario, Step, Suite};
use crate::driver::{Response, Session, bounded};
use crate::error::{AssertionError, Error, Result};
use crate::transport::TerminalChannel;

/// Receives progress while scenarios run.
pub trait Reporter {
    /// A scenario is about to start.
    fn scenario_started(&mut self, _name: &str) {}

    /// A check was sent; its result is not known yet.
    fn step_started(&mut self, input: &str);

    /// The last started check matched.
    fn step_passed(&mut self, input: &str, elapsed: Duration);

    /// The last started check failed, with the error that ends the run.
    fn step_failed(&mut self, input: &str, error: &Error);

    /// A scenario finished with every check passing.
    fn scenario_finished(&mut self, _report: &ScenarioReport) {}
}

/// Writes `eval: <input>` before each check and ` [OK]` after it.
#[derive(Debug)]
pub struct ConsoleReporter<W> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    /// Report to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Report to any writer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Get the writer back.
    pub fn into_inner(self) -> W {
        self.out
    }
}

// Progress output is best effort; a closed stdout must not fail the run.
impl<W: Write> Reporter for ConsoleReporter<W> {
    fn scenario_started(&mut self, name: &str) {
        let _ = writeln!(self.out, "== {}", name);
    }

    fn step_started(&mut self, input: &str) {
        let _ = write!(self.out, "eval: {}", input);
        let _ = self.out.flush();
    }

    fn step_passed(&mut self, _input: &str, _elapsed: Duration) {
        let _ = writeln!(self.out, " [OK]");
    }

    fn step_failed(&mut self, _input: &str, _error: &Error) {
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}

/// Result of a single step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// The line that was sent.
    pub input: String,

    /// The normalized response, `None` for send-only steps.
    pub output: Option<String>,

    /// Time taken for this step.
    pub elapsed: Duration,
}

/// Result of a scenario whose checks all passed.
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,

    /// Every step in order.
    pub steps: Vec<StepOutcome>,

    /// Total time for the scenario.
    pub elapsed: Duration,
}

impl ScenarioReport {
    /// Number of checks that ran.
    pub fn checks(&self) -> usize {
        self.steps.iter().filter(|s| s.output.is_some()).count()
    }
}

/// Result of a run over several scenarios.
#[derive(Debug, Clone, Default)]
pub struct SuiteReport {
    /// Reports in execution order.
    pub scenarios: Vec<ScenarioReport>,

    /// Total time for the run.
    pub elapsed: Duration,
}

impl SuiteReport {
    /// Number of checks across all scenarios.
    pub fn checks(&self) -> usize {
        self.scenarios.iter().map(ScenarioReport::checks).sum()
    }
}

/// Runs scenarios against one session, stopping at the first failure.
pub struct ScenarioRunner<'s, T, R> {
    session: &'s mut Session<T>,
    reporter: R,
}

impl<'s, T: TerminalChannel, R: Reporter> ScenarioRunner<'s, T, R> {
    /// Create a runner over a ready session.
    pub fn new(session: &'s mut Session<T>, reporter: R) -> Self {
        Self { session, reporter }
    }

    /// Evaluate `input` and compare the result with `expected`.
    ///
    /// # Errors
    ///
    /// `Error::Assertion` on mismatch; protocol errors pass through.
    pub async fn check(&mut self, input: &str, expected: &Expected) -> Result<Response> {
        self.reporter.step_started(input);

        let limit = self.session.config().timeout;
        let response = match bounded(limit, self.session.evaluate(input)).await {
            Ok(response) => response,
            Err(err) => {
                self.reporter.step_failed(input, &err);
                return Err(err);
            }
        };

        if !expected.matches(&response.result) {
            let err: Error = AssertionError {
                input: input.to_string(),
                expected: expected.to_string(),
                actual: response.result.clone(),
            }
            .into();
            self.reporter.step_failed(input, &err);
            return Err(err);
        }

        self.reporter.step_passed(input, response.elapsed);
        Ok(response)
    }

    /// Write `input` without reading a response.
    pub async fn send(&mut self, input: &str) -> Result<()> {
        let limit = self.session.config().timeout;
        bounded(limit, self.session.send_line(input)).await
    }

    /// Run every step of `scenario` in order.
    pub async fn run(&mut self, scenario: &Scenario) -> Result<ScenarioReport> {
        info!("running scenario '{}'", scenario.name);
        self.reporter.scenario_started(&scenario.name);

        let start = Instant::now();
        let mut steps = Vec::with_capacity(scenario.steps.len());

        for step in &scenario.steps {
            let step_start = Instant::now();
            let output = match step {
                Step::Send(input) => {
                    self.send(input).await?;
                    None
                }
                Step::Check { input, expected } => Some(self.check(input, expected).await?.result),
            };
            steps.push(StepOutcome {
                input: step.input().to_string(),
                output,
                elapsed: step_start.elapsed(),
            });
        }

        let report = ScenarioReport {
            name: scenario.name.clone(),
            steps,
            elapsed: start.elapsed(),
        };
        debug!(
            "scenario '{}': {} checks in {:?}",
            report.name,
            report.checks(),
            report.elapsed
        );
        self.reporter.scenario_finished(&report);
        Ok(report)
    }

    /// Run scenarios in order, stopping at the first failure.
    pub async fn run_all<'a, I>(&mut self, scenarios: I) -> Result<SuiteReport>
    where
        I: IntoIterator<Item = &'a Scenario>,
    {
        let start = Instant::now();
        let mut report = SuiteReport::default();
        for scenario in scenarios {
            report.scenarios.push(self.run(scenario).await?);
        }
        report.elapsed = start.elapsed();
        Ok(report)
    }

    /// Run the scenarios of `suite` named in `names`, or all of them.
    pub async fn run_suite(&mut self, suite: &Suite, names: &[String]) -> Result<SuiteReport> {
        let selected = suite.select(names)?;
        info!("running {} of {} scenarios", selected.len(), suite.scenarios.len());
        self.run_all(selected).await
    }

    /// Get the reporter back.
    pub fn into_reporter(self) -> R {
        self.reporter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::SessionConfig;
    use crate::error::ProtocolError;
    use crate::transport::{ChunkStream, StreamTransport};

    const GAP: Duration = Duration::from_millis(200);

    fn session(chunks: Vec<&'static str>) -> Session<StreamTransport<ChunkStream>> {
        Session::new(StreamTransport::from_chunks(chunks, GAP), SessionConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_passing_scenario_reports_ok() {
        let mut session = session(vec!["In: ", "Out: 9\r\n", "In: ", "Out: 4\r\n", "In: "]);
        let scenario = Scenario::new("math")
            .send("let a = 2;")
            .check("5+4", "9")
            .check("a + a", "4");

        let mut runner = ScenarioRunner::new(&mut session, ConsoleReporter::new(Vec::new()));
        let report = runner.run(&scenario).await.unwrap();
        let printed = String::from_utf8(runner.into_reporter().into_inner()).unwrap();

        assert_eq!(report.checks(), 2);
        assert_eq!(report.steps[0].output, None);
        assert_eq!(report.steps[1].output.as_deref(), Some("9"));
        assert_eq!(printed, "== math\neval: 5+4 [OK]\neval: a + a [OK]\n");
        assert_eq!(
            session.transport().written_lossy(),
            "let a = 2;\n\r5+4\n\ra + a\n\r"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_mismatch_stops_scenario() {
        let mut session = session(vec!["Out: 10\r\n", "In: ", "Out: 4\r\n", "In: "]);
        let scenario = Scenario::new("math").check("5+4", "9").check("2+2", "4");

        let mut runner = ScenarioRunner::new(&mut session, ConsoleReporter::new(Vec::new()));
        let err = runner.run(&scenario).await.unwrap_err();
        let printed = String::from_utf8(runner.into_reporter().into_inner()).unwrap();

        match err {
            Error::Assertion(assertion) => {
                assert_eq!(assertion.input, "5+4");
                assert_eq!(assertion.expected, "\"9\"");
                assert_eq!(assertion.actual, "10");
            }
            other => panic!("expected assertion error, got {other:?}"),
        }
        assert_eq!(printed, "== math\neval: 5+4\n");
        assert_eq!(session.transport().written_lossy(), "5+4\n\r");
    }

    #[tokio::test(start_paused = true)]
    async fn test_pattern_check() {
        let mut session = session(vec![
            "error[E0425]: cannot find value `z` in this scope\r\n",
            "In: ",
        ]);
        let expected = Expected::pattern(r"cannot find value `z`").unwrap();

        let mut runner = ScenarioRunner::new(&mut session, ConsoleReporter::new(io::sink()));
        let response = runner.check("z", &expected).await.unwrap();
        assert!(response.result.starts_with("error[E0425]"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_protocol_error_propagates() {
        let mut session = session(vec!["In: "]);
        let scenario = Scenario::new("eof").check("5+4", "9");

        let mut runner = ScenarioRunner::new(&mut session, ConsoleReporter::new(io::sink()));
        let err = runner.run(&scenario).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::StreamClosed)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_all_stops_at_first_failing_scenario() {
        let mut session = session(vec!["Out: 9\r\n", "In: ", "Out: 5\r\n", "In: "]);
        let first = Scenario::new("first").check("5+4", "9");
        let second = Scenario::new("second").check("2+2", "4");
        let third = Scenario::new("third").check("1+1", "2");

        let mut runner = ScenarioRunner::new(&mut session, ConsoleReporter::new(Vec::new()));
        let err = runner.run_all([&first, &second, &third]).await.unwrap_err();
        let printed = String::from_utf8(runner.into_reporter().into_inner()).unwrap();

        assert!(matches!(err, Error::Assertion(_)));
        assert!(!printed.contains("third"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_suite_selects_by_name() {
        let mut session = session(vec!["Out: 4\r\n", "In: "]);
        let suite = Suite::new(crate::transport::SpawnConfig::new("irust"))
            .with_scenario(Scenario::new("skipped").check("5+4", "9"))
            .with_scenario(Scenario::new("picked").check("2+2", "4"));

        let mut runner = ScenarioRunner::new(&mut session, ConsoleReporter::new(io::sink()));
        let report = runner
            .run_suite(&suite, &["picked".to_string()])
            .await
            .unwrap();

        assert_eq!(report.scenarios.len(), 1);
        assert_eq!(report.scenarios[0].name, "picked");
        assert_eq!(report.checks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_applies_per_check() {
        let config = SessionConfig {
            timeout: Some(Duration::from_secs(1)),
            ..SessionConfig::default()
        };
        let transport = StreamTransport::from_chunks(["Out: 9\r\n"], Duration::from_secs(10));
        let mut session = Session::new(transport, config);

        let mut runner = ScenarioRunner::new(&mut session, ConsoleReporter::new(io::sink()));
        let err = runner.check("5+4", &Expected::exact("9")).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::Timeout(_))));
    }
}
