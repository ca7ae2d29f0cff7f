//! Drives a small shell-script REPL through a real pseudo-terminal.

#![cfg(unix)]

use std::time::Duration;

use replbot::driver::bounded;
use replbot::error::{Error, ProtocolError};
use replbot::scenario::Expected;
use replbot::{ConsoleReporter, PtyTransport, Scenario, ScenarioRunner, Session, SessionBuilder};

/// Prints `In: ` when idle and `Out: <line>` for most input. Echo is off so
/// typed input never shows up as output; `\n\r` arrives as a line plus an
/// empty line, which is ignored.
const FAKE_REPL: &str = r#"
stty -echo
printf 'fake repl 0.1\nloading...\n'
printf 'In: '
while IFS= read -r line; do
  case "$line" in
    '') continue ;;
    '5+4') printf 'Out: 9\n' ;;
    'z') printf 'error[E0425]: cannot find value `z` in this scope\n  --> src/main.rs:1:1\n' ;;
    let*) ;;
    'bye') printf 'Out: bye\n'; exit 0 ;;
    'quit') exit 0 ;;
    *) printf 'Out: %s\n' "$line" ;;
  esac
  printf 'In: '
done
"#;

const LIMIT: Duration = Duration::from_secs(10);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

async fn ready_session() -> Session<PtyTransport> {
    init_logging();
    let mut session = SessionBuilder::new("sh")
        .args(["-c", FAKE_REPL])
        .timeout(LIMIT)
        .spawn()
        .unwrap();
    bounded(Some(LIMIT), session.await_ready()).await.unwrap();
    session
}

#[tokio::test]
async fn test_evaluate_over_pty() {
    let mut session = ready_session().await;
    assert!(session.is_ready());
    assert_eq!(session.transport().config().command, "sh");
    assert!(session.transport().process_id().is_some());

    let response = bounded(Some(LIMIT), session.evaluate("5+4")).await.unwrap();
    assert_eq!(response.result, "9");
    assert!(response.is_complete());

    let response = bounded(Some(LIMIT), session.evaluate("hello world"))
        .await
        .unwrap();
    assert_eq!(response.result, "hello world");

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_multiline_output() {
    let mut session = ready_session().await;

    let response = bounded(Some(LIMIT), session.evaluate("z")).await.unwrap();
    assert!(response.result.starts_with("error[E0425]"));
    assert!(response.contains("src/main.rs"));
    assert_eq!(response.lines().count(), 2);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_statement_then_evaluate() {
    let mut session = ready_session().await;

    bounded(Some(LIMIT), session.send_line("let a = 2;"))
        .await
        .unwrap();
    // Consume the statement's prompt so it cannot run into the next response.
    bounded(Some(LIMIT), session.await_ready()).await.unwrap();

    let response = bounded(Some(LIMIT), session.evaluate("a + a")).await.unwrap();
    assert_eq!(response.result, "a + a");

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_scenario_over_pty() {
    let mut session = ready_session().await;
    let scenario = Scenario::new("fake")
        .check("5+4", "9")
        .check("z", Expected::pattern(r"cannot find value `z`").unwrap())
        .check("4", "4");

    let mut runner = ScenarioRunner::new(&mut session, ConsoleReporter::new(Vec::new()));
    let report = runner.run(&scenario).await.unwrap();
    let printed = String::from_utf8(runner.into_reporter().into_inner()).unwrap();

    assert_eq!(report.checks(), 3);
    assert!(printed.contains("eval: z [OK]"));

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_failed_check_reports_actual_output() {
    let mut session = ready_session().await;
    let scenario = Scenario::new("wrong").check("5+4", "10");

    let mut runner = ScenarioRunner::new(&mut session, ConsoleReporter::new(Vec::new()));
    let err = runner.run(&scenario).await.unwrap_err();
    match err {
        Error::Assertion(assertion) => assert_eq!(assertion.actual, "9"),
        other => panic!("expected assertion error, got {other:?}"),
    }

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_exit_without_output_is_stream_closed() {
    let mut session = ready_session().await;

    let err = bounded(Some(LIMIT), session.evaluate("quit"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Protocol(ProtocolError::StreamClosed)));

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_exit_after_output_is_truncated() {
    let mut session = ready_session().await;

    let response = bounded(Some(LIMIT), session.evaluate("bye")).await.unwrap();
    assert_eq!(response.result, "bye");
    assert!(response.truncated);

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_spawn_failure() {
    init_logging();
    let result = SessionBuilder::new("/nonexistent/replbot-target").spawn();
    assert!(matches!(
        result,
        Err(Error::Transport(replbot::error::TransportError::SpawnFailed { .. }))
    ));
}
