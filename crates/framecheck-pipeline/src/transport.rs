//! Transport seams for the pipeline.
//!
//! The core treats a transport purely as "a readable byte source that
//! eventually signals end-of-stream" on one side and "a byte sink" on the
//! other. Two object-safe traits capture that, with adapters so any tokio
//! byte stream (an in-process duplex, a TCP socket, an HTTP response body)
//! slots in, alongside [`crate::SynchronizedBuffer`] which implements both
//! traits directly.

use async_trait::async_trait;
use framecheck_core::Result;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Consumer side of a transport.
#[async_trait]
pub trait ChunkSource: Send {
    /// Pull available bytes into `buf`, returning how many arrived.
    ///
    /// A return of 0 for a non-empty `buf` signals end-of-stream. The
    /// amount and alignment of data per call is entirely up to the
    /// transport; callers must not assume any relationship to record
    /// boundaries.
    async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// Producer side of a transport.
#[async_trait]
pub trait RecordSink: Send {
    /// Write every byte of `buf`.
    async fn write_all(&mut self, buf: &[u8]) -> Result<()>;

    /// Signal that no further bytes will be written.
    async fn complete(&mut self) -> Result<()>;
}

/// Adapter exposing any [`AsyncRead`] as a [`ChunkSource`].
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
}

impl<R> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> ChunkSource for IoSource<R> {
    async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.inner.read(buf).await?)
    }
}

/// Adapter exposing any [`AsyncWrite`] as a [`RecordSink`].
#[derive(Debug)]
pub struct IoSink<W> {
    inner: W,
}

impl<W> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> RecordSink for IoSink<W> {
    async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        Ok(self.inner.write_all(buf).await?)
    }

    async fn complete(&mut self) -> Result<()> {
        Ok(self.inner.shutdown().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_io_adapters_round_trip_over_duplex() {
        let (producer_io, consumer_io) = tokio::io::duplex(64);
        let mut sink = IoSink::new(producer_io);
        let mut source = IoSource::new(consumer_io);

        sink.write_all(b"hello ").await.unwrap();
        sink.write_all(b"world").await.unwrap();
        sink.complete().await.unwrap();

        let mut received = Vec::new();
        let mut buf = [0u8; 8];
        loop {
            let n = source.read_chunk(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
        }
        assert_eq!(received, b"hello world");
    }
}
