//! Transport layer: byte streams to the target process.
//!
//! The real transport is a pseudo-terminal wrapping a spawned child
//! ([`PtyTransport`]). [`IoTransport`] and [`StreamTransport`] carry the same
//! protocol over any async reader/writer pair or a synthetic chunk stream.

pub mod config;
mod io;
mod pty;
mod stream;

pub use config::SpawnConfig;
pub use io::IoTransport;
pub use pty::PtyTransport;
pub use stream::{ChunkStream, StreamTransport};

use std::future::Future;

use bytes::Bytes;

use crate::error::Result;

/// A bidirectional terminal stream to one target process.
///
/// `read` must be cancel-safe: the channel layer races it against a settle
/// timer and drops the future when the timer wins.
pub trait TerminalChannel: Send {
    /// Read the next chunk of output, or `None` once the stream has ended.
    fn read(&mut self) -> impl Future<Output = Result<Option<Bytes>>> + Send;

    /// Write raw bytes to the target. Returns once they were accepted.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Release the stream and anything it owns.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }
}
