//! Transport over any async reader/writer pair.

use bytes::Bytes;
use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::TerminalChannel;
use crate::error::{Result, TransportError};

/// Carries the protocol over an `AsyncRead` + `AsyncWrite`.
///
/// Useful for sockets, duplex pipes, and mocked I/O.
#[derive(Debug)]
pub struct IoTransport<R, W> {
    reader: R,
    writer: W,
    buf: Vec<u8>,
}

impl<R, W> IoTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Create a transport reading at most `read_buffer_size` bytes per chunk.
    pub fn new(reader: R, writer: W, read_buffer_size: usize) -> Self {
        Self {
            reader,
            writer,
            buf: vec![0u8; read_buffer_size.max(1)],
        }
    }

    /// Split back into the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R, W> TerminalChannel for IoTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn read(&mut self) -> Result<Option<Bytes>> {
        let n = self
            .reader
            .read(&mut self.buf)
            .await
            .map_err(TransportError::Io)?;
        if n == 0 {
            return Ok(None);
        }
        trace!("io read {} bytes", n);
        Ok(Some(Bytes::copy_from_slice(&self.buf[..n])))
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.writer
            .write_all(data)
            .await
            .map_err(TransportError::Io)?;
        self.writer.flush().await.map_err(TransportError::Io)?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.writer.shutdown().await.map_err(TransportError::Io)?;
        Ok(())
    }
}
