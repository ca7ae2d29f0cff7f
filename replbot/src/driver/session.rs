//! Session: the prompt-synchronized conversation with one target.

use std::future::Future;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use super::collector::{Collector, Observation, Transition};
use super::config::SessionConfig;
use super::response::Response;
use crate::channel::{PromptChannel, PromptMarker, PromptMatcher};
use crate::error::{ProtocolError, Result};
use crate::transport::TerminalChannel;

/// A live session with one REPL process.
///
/// The session owns its transport exclusively. Every method takes
/// `&mut self`, so at most one transaction is ever in flight.
pub struct Session<T> {
    /// Segment reader over the transport.
    channel: PromptChannel<T>,

    /// Protocol settings.
    config: SessionConfig,

    /// Whether `await_ready` has seen the first prompt.
    ready: bool,
}

impl<T: TerminalChannel> Session<T> {
    /// Create a session using the literal prompt marker from `config`.
    pub fn new(transport: T, config: SessionConfig) -> Self {
        let prompt = Box::new(PromptMarker::new(config.prompt_marker.clone()));
        Self::with_prompt_matcher(transport, config, prompt)
    }

    /// Create a session with a custom prompt matcher.
    pub fn with_prompt_matcher(
        transport: T,
        config: SessionConfig,
        prompt: Box<dyn PromptMatcher>,
    ) -> Self {
        Self {
            channel: PromptChannel::new(transport, prompt, config.settle),
            config,
            ready: false,
        }
    }

    /// Wait until the target prints its first prompt.
    ///
    /// Everything before it (banner, build output) is discarded. There is no
    /// timeout; wrap the call with [`bounded`] if the target may hang.
    ///
    /// # Errors
    ///
    /// `ProtocolError::StreamClosed` if the stream ends before any prompt.
    pub async fn await_ready(&mut self) -> Result<()> {
        while let Some(segment) = self.channel.next_segment().await? {
            if self.channel.prompt().appears_in(&segment) {
                debug!("target ready");
                self.ready = true;
                return Ok(());
            }
            trace!("discarding startup output: {:?}", segment);
        }
        Err(ProtocolError::StreamClosed.into())
    }

    /// Send one line and collect everything up to the next idle prompt.
    ///
    /// The input must make the target print something. An input that
    /// produces no output leaves this call waiting forever; use
    /// [`send_line`](Self::send_line) for those.
    ///
    /// If the stream closes after some output, the partial result is
    /// returned with `truncated` set.
    ///
    /// # Errors
    ///
    /// `ProtocolError::StreamClosed` if the stream closes before any output.
    pub async fn evaluate(&mut self, input: &str) -> Result<Response> {
        let start = Instant::now();
        let mut collector = Collector::new();

        debug!("evaluate: {:?}", input);
        self.write_line(input).await?;
        collector.sent();

        loop {
            let transition = match self.channel.next_segment().await? {
                Some(segment) => {
                    let observation = if self.channel.prompt().starts_prompt(&segment) {
                        Observation::Prompt(&segment)
                    } else {
                        Observation::Output(&segment)
                    };
                    collector.observe(observation)?
                }
                None => collector.observe(Observation::Closed)?,
            };

            match transition {
                Transition::Continue => {}
                Transition::Complete | Transition::Truncated => break,
            }
        }

        let elapsed = start.elapsed();
        let collected = collector.finish(self.config.response_marker.as_deref());

        if collected.truncated {
            warn!("stream closed while collecting output for {:?}", input);
            Ok(Response::truncated(input, collected.text, collected.raw, elapsed))
        } else {
            debug!("evaluate: {:?} -> {:?} in {:?}", input, collected.text, elapsed);
            Ok(Response::new(input, collected.text, collected.raw, elapsed))
        }
    }

    /// Send one line without waiting for output.
    ///
    /// Meant for statements that print nothing. Their trailing prompt is
    /// skipped by the next `evaluate`.
    pub async fn send_line(&mut self, input: &str) -> Result<()> {
        debug!("send: {:?}", input);
        self.write_line(input).await
    }

    async fn write_line(&mut self, input: &str) -> Result<()> {
        let mut line = String::with_capacity(input.len() + self.config.line_terminator.len());
        line.push_str(input);
        line.push_str(&self.config.line_terminator);
        self.channel.send(line.as_bytes()).await
    }

    /// Close the transport. For a PTY this terminates the child.
    pub async fn close(&mut self) -> Result<()> {
        debug!("closing session");
        self.ready = false;
        self.channel.close().await
    }

    /// Whether the first prompt has been seen.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Get the protocol settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        self.channel.transport()
    }
}

/// Run `fut`, failing with `ProtocolError::Timeout` if `limit` passes first.
///
/// The protocol has no timeouts of its own; this is the boundary callers use
/// when a hung target must not hang the harness.
pub async fn bounded<F, R>(limit: Option<Duration>, fut: F) -> Result<R>
where
    F: Future<Output = Result<R>>,
{
    match limit {
        None => fut.await,
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| ProtocolError::Timeout(limit))?,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transport::{ChunkStream, IoTransport, StreamTransport};

    /// Longer than the default settle interval.
    const GAP: Duration = Duration::from_millis(200);

    fn session<I>(chunks: I) -> Session<StreamTransport<ChunkStream>>
    where
        I: IntoIterator<Item = &'static str>,
    {
        Session::new(StreamTransport::from_chunks(chunks, GAP), SessionConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_output_between_prompts() {
        let mut session = session(["In: ready", "24", "In: ready"]);

        let response = session.evaluate("fact(4)").await.unwrap();
        assert_eq!(response.result, "24");
        assert!(response.is_complete());
        assert_eq!(session.transport().written(), b"fact(4)\n\r");
    }

    #[tokio::test(start_paused = true)]
    async fn test_banner_then_transaction() {
        let mut session = session([
            "Welcome to IRust\r\nIn: ",
            "In: 5+4\r\n",
            "Out: 9\r\n",
            "In: ",
        ]);

        session.await_ready().await.unwrap();
        assert!(session.is_ready());

        let response = session.evaluate("5+4").await.unwrap();
        assert_eq!(response.result, "9");
        assert_eq!(response.raw_result, "Out: 9\r\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_ready_stream_closed() {
        let mut session = session(["   Compiling irust\r\n", "error: could not compile\r\n"]);

        let err = session.await_ready().await.unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::StreamClosed)));
        assert!(!session.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_mid_collection_returns_partial() {
        let mut session = session(["In: 5+4\r\n", "Out: 9\r\n"]);

        let response = session.evaluate("5+4").await.unwrap();
        assert_eq!(response.result, "9");
        assert!(response.truncated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_before_output_is_error() {
        let mut session = session(["In: "]);

        let err = session.evaluate("5+4").await.unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::StreamClosed)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_line_then_evaluate() {
        let mut session = session(["In: ", "In: :type a\r\n", "Out: `&str`\r\n", "In: "]);

        session.send_line("let a = \"hello\";").await.unwrap();
        let response = session.evaluate(":type a").await.unwrap();

        assert_eq!(response.result, "`&str`");
        assert_eq!(
            session.transport().written_lossy(),
            "let a = \"hello\";\n\r:type a\n\r"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_markers_and_terminator() {
        let config = SessionConfig {
            prompt_marker: ">>>".to_string(),
            response_marker: None,
            line_terminator: "\n".to_string(),
            ..SessionConfig::default()
        };
        let transport = StreamTransport::from_chunks([">>> ", "4\r\n", ">>> "], GAP);
        let mut session = Session::new(transport, config);

        let response = session.evaluate("2+2").await.unwrap();
        assert_eq!(response.result, "4");
        assert_eq!(session.transport().written(), b"2+2\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_mocked_io_transaction() {
        let reader = tokio_test::io::Builder::new()
            .read(b"Welcome\r\nIn: ")
            .wait(Duration::from_millis(300))
            .read(b"\x1b[32mOut:\x1b[0m 9\r\n")
            .read(b"In: ")
            .build();
        let writer = tokio_test::io::Builder::new().write(b"5+4\n\r").build();
        let mut session = Session::new(IoTransport::new(reader, writer, 1024), SessionConfig::default());

        session.await_ready().await.unwrap();
        let response = session.evaluate("5+4").await.unwrap();
        assert_eq!(response.result, "9");
    }

    #[tokio::test]
    async fn test_back_to_back_reads_without_quiet_period() {
        let reader = tokio_test::io::Builder::new()
            .read(b"In: ready")
            .read(b"24")
            .read(b"In: ready")
            .build();
        let writer = tokio_test::io::Builder::new().write(b"fact(4)\n\r").build();
        let mut session = Session::new(IoTransport::new(reader, writer, 1024), SessionConfig::default());

        let response = session.evaluate("fact(4)").await.unwrap();
        assert_eq!(response.result, "24");
        assert!(response.is_complete());
    }

    #[tokio::test]
    async fn test_response_without_newline_then_prompt() {
        let reader = tokio_test::io::Builder::new()
            .read(b"In: 5+4\r\n")
            .read(b"Out: 9")
            .read(b"In: ")
            .build();
        let writer = tokio_test::io::Builder::new().write(b"5+4\n\r").build();
        let mut session = Session::new(IoTransport::new(reader, writer, 1024), SessionConfig::default());

        let response = session.evaluate("5+4").await.unwrap();
        assert_eq!(response.result, "9");
        assert_eq!(response.raw_result, "Out: 9");
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let transport = StreamTransport::from_chunks(["starting\r\n"], Duration::from_secs(30));
        let mut session = Session::new(transport, SessionConfig::default());

        let limit = Some(Duration::from_secs(5));
        let err = bounded(limit, session.await_ready()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::Timeout(d)) if d == Duration::from_secs(5)
        ));
    }

    #[tokio::test]
    async fn test_bounded_without_limit_passes_through() {
        let value = bounded(None, async { Ok::<_, Error>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }
}
