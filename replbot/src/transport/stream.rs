//! Transport backed by a stream of pre-recorded or synthetic chunks.

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;

use super::TerminalChannel;
use crate::error::Result;

/// Boxed chunk stream produced by [`StreamTransport::from_chunks`].
pub type ChunkStream = Pin<Box<dyn Stream<Item = Bytes> + Send>>;

/// Reads from a chunk stream and records everything written.
///
/// Replays a captured session or feeds the protocol synthetic output.
pub struct StreamTransport<S> {
    chunks: S,
    written: Vec<u8>,
    ended: bool,
}

impl<S> StreamTransport<S>
where
    S: Stream<Item = Bytes> + Unpin + Send,
{
    /// Wrap an existing stream.
    pub fn new(chunks: S) -> Self {
        Self {
            chunks,
            written: Vec::new(),
            ended: false,
        }
    }

    /// Everything written to the transport so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Written bytes as text (lossy UTF-8).
    pub fn written_lossy(&self) -> String {
        String::from_utf8_lossy(&self.written).into_owned()
    }
}

impl StreamTransport<ChunkStream> {
    /// Emit `chunks` in order, waiting `gap` before each one.
    ///
    /// A gap longer than the session's settle interval makes every chunk
    /// arrive as a separate burst.
    pub fn from_chunks<I, C>(chunks: I, gap: Duration) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Bytes>,
    {
        let chunks: Vec<Bytes> = chunks.into_iter().map(Into::into).collect();
        let stream = futures_util::stream::iter(chunks)
            .then(move |chunk| async move {
                if !gap.is_zero() {
                    tokio::time::sleep(gap).await;
                }
                chunk
            })
            .boxed();
        Self::new(stream)
    }
}

impl<S> TerminalChannel for StreamTransport<S>
where
    S: Stream<Item = Bytes> + Unpin + Send,
{
    async fn read(&mut self) -> Result<Option<Bytes>> {
        if self.ended {
            return Ok(None);
        }
        let next = self.chunks.next().await;
        if next.is_none() {
            self.ended = true;
        }
        Ok(next)
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.written.extend_from_slice(data);
        Ok(())
    }
}
