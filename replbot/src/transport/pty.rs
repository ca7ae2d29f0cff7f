//! Pseudo-terminal transport using portable-pty.
//!
//! The child process sees a real terminal, so it runs its interactive
//! front end (prompts, line editor) instead of pipe mode.

use std::io::{self, Read, Write};

use bytes::Bytes;
use log::{debug, trace, warn};
use portable_pty::{Child, ChildKiller, CommandBuilder, MasterPty, PtySize, native_pty_system};
use tokio::sync::mpsc;

use super::TerminalChannel;
use super::config::SpawnConfig;
use crate::error::{Result, TransportError};

/// Chunks buffered between the reader thread and the session.
const READ_QUEUE_DEPTH: usize = 256;

/// `EIO`: Linux reports it on the master once the child side is gone.
const EIO: i32 = 5;

/// Events forwarded from the blocking reader thread.
#[derive(Debug)]
enum ReadEvent {
    Data(Bytes),
    Eof,
    Error(io::Error),
}

/// Transport over the master side of a pseudo-terminal.
pub struct PtyTransport {
    /// Master side of the PTY, kept alive for the child's lifetime.
    _master: Box<dyn MasterPty + Send>,

    /// Writer into the child's terminal input.
    writer: Box<dyn Write + Send>,

    /// The spawned process.
    child: Box<dyn Child + Send + Sync>,

    /// Output chunks from the reader thread.
    output_rx: mpsc::Receiver<ReadEvent>,

    /// Set once EOF or a read error has been delivered.
    finished: bool,

    /// Set by `close()`.
    closed: bool,

    /// Configuration used to spawn the child.
    config: SpawnConfig,
}

impl PtyTransport {
    /// Open a PTY, spawn the configured command inside it, and start reading.
    pub fn spawn(config: SpawnConfig, read_buffer_size: usize) -> Result<Self> {
        let pty_system = native_pty_system();

        let pair = pty_system
            .openpty(PtySize {
                rows: config.terminal_height,
                cols: config.terminal_width,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| TransportError::PtyOpenFailed(e.to_string()))?;

        let mut cmd = CommandBuilder::new(&config.command);
        cmd.args(&config.args);
        for (key, value) in &config.env {
            cmd.env(key, value);
        }
        // portable-pty falls back to $HOME, not our working directory.
        match config.cwd {
            Some(ref cwd) => cmd.cwd(cwd),
            None => cmd.cwd(std::env::current_dir().map_err(TransportError::Io)?),
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| TransportError::SpawnFailed {
                command: config.command_line(),
                message: e.to_string(),
            })?;

        // The child holds its own handle; dropping ours lets EOF surface.
        drop(pair.slave);

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| TransportError::PtyOpenFailed(e.to_string()))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| TransportError::PtyOpenFailed(e.to_string()))?;

        let (output_tx, output_rx) = mpsc::channel(READ_QUEUE_DEPTH);
        spawn_reader(reader, output_tx, read_buffer_size.max(1));

        debug!(
            "spawned `{}` (pid {:?})",
            config.command_line(),
            child.process_id()
        );

        Ok(Self {
            _master: pair.master,
            writer,
            child,
            output_rx,
            finished: false,
            closed: false,
            config,
        })
    }

    /// Configuration the child was spawned with.
    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    /// OS process id of the child, if still known.
    pub fn process_id(&self) -> Option<u32> {
        self.child.process_id()
    }

    fn terminate(&mut self) -> io::Result<()> {
        if self.child.try_wait()?.is_none() {
            debug!("terminating `{}`", self.config.command);
            self.child.kill()?;
        }
        let status = self.child.wait()?;
        debug!("`{}` exited: {:?}", self.config.command, status);
        Ok(())
    }
}

/// Read the PTY on a dedicated thread; portable-pty readers are blocking.
fn spawn_reader(mut reader: Box<dyn Read + Send>, tx: mpsc::Sender<ReadEvent>, size: usize) {
    std::thread::spawn(move || {
        let mut buf = vec![0u8; size];
        loop {
            match reader.read(&mut buf) {
                Ok(0) => {
                    debug!("pty reader: EOF");
                    let _ = tx.blocking_send(ReadEvent::Eof);
                    break;
                }
                Ok(n) => {
                    let chunk = Bytes::copy_from_slice(&buf[..n]);
                    if tx.blocking_send(ReadEvent::Data(chunk)).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if e.raw_os_error() == Some(EIO) => {
                    debug!("pty reader: EIO, treating as EOF");
                    let _ = tx.blocking_send(ReadEvent::Eof);
                    break;
                }
                Err(e) => {
                    let _ = tx.blocking_send(ReadEvent::Error(e));
                    break;
                }
            }
        }
    });
}

impl TerminalChannel for PtyTransport {
    async fn read(&mut self) -> Result<Option<Bytes>> {
        if self.finished {
            return Ok(None);
        }

        match self.output_rx.recv().await {
            Some(ReadEvent::Data(chunk)) => {
                trace!("pty read {} bytes", chunk.len());
                Ok(Some(chunk))
            }
            Some(ReadEvent::Error(e)) => {
                self.finished = true;
                Err(TransportError::Io(e).into())
            }
            Some(ReadEvent::Eof) | None => {
                self.finished = true;
                Ok(None)
            }
        }
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data).map_err(TransportError::Io)?;
        self.writer.flush().map_err(TransportError::Io)?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.terminate().map_err(TransportError::Io)?;
        Ok(())
    }
}

impl Drop for PtyTransport {
    fn drop(&mut self) {
        if !self.closed {
            warn!(
                "PtyTransport for `{}` dropped without close(); killing child",
                self.config.command
            );
            if let Err(e) = self.terminate() {
                warn!("failed to terminate child: {}", e);
            }
        }
    }
}
