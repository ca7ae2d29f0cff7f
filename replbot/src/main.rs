//! `replbot` command line runner.
//!
//! Runs a suite of REPL scenarios and exits non-zero on the first failure.
//!
//! ```bash
//! # built-in IRust suite, run from an IRust checkout
//! replbot --cwd ../irust
//!
//! # a suite file, against a different command
//! replbot --suite suite.json --scenario arithmetic -- python3 -i
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{error, info, warn};

use replbot::driver::bounded;
use replbot::scenario::{SuiteReport, builtin};
use replbot::{ConsoleReporter, ScenarioRunner, Suite};

#[derive(Parser, Debug)]
#[command(name = "replbot", version, about = "Scripted testing for interactive REPLs")]
struct Args {
    /// Suite file (JSON); the built-in IRust suite is used when omitted
    #[arg(long)]
    suite: Option<PathBuf>,

    /// Run only the named scenario (repeatable)
    #[arg(long = "scenario", value_name = "NAME")]
    scenarios: Vec<String>,

    /// Working directory for the target
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// Quiet period before a partial line is treated as complete
    #[arg(long, value_name = "MS")]
    settle_ms: Option<u64>,

    /// Timeout for startup and for each step
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Command to run instead of the suite's
    #[arg(last = true)]
    command: Vec<String>,
}

impl Args {
    fn load_suite(&self) -> replbot::Result<Suite> {
        let mut suite = match self.suite {
            Some(ref path) => Suite::load(path)?,
            None => builtin::irust()?,
        };

        if let Some((command, args)) = self.command.split_first() {
            suite.spawn.command = command.clone();
            suite.spawn.args = args.to_vec();
        }
        if let Some(ref cwd) = self.cwd {
            suite.spawn.cwd = Some(cwd.clone());
        }
        if let Some(ms) = self.settle_ms {
            suite.session.settle = Duration::from_millis(ms);
        }
        if let Some(secs) = self.timeout {
            suite.session.timeout = Some(Duration::from_secs(secs));
        }
        Ok(suite)
    }
}

async fn run(args: &Args) -> replbot::Result<SuiteReport> {
    let suite = args.load_suite()?;
    // Fail on bad names before anything is spawned.
    suite.select(&args.scenarios)?;

    info!("starting {}", suite.spawn.command_line());
    let mut session = suite.session_builder().spawn()?;

    let result = async {
        bounded(suite.session.timeout, session.await_ready()).await?;
        let mut runner = ScenarioRunner::new(&mut session, ConsoleReporter::stdout());
        runner.run_suite(&suite, &args.scenarios).await
    }
    .await;

    if let Err(e) = session.close().await {
        warn!("failed to close session: {}", e);
    }
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    // RUST_LOG overrides the default filter
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match run(&args).await {
        Ok(report) => {
            println!(
                "{} scenarios, {} checks passed in {:.2?}",
                report.scenarios.len(),
                report.checks(),
                report.elapsed
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
