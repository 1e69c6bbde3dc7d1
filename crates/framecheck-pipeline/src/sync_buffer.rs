//! Synchronized dual-cursor buffer.
//!
//! An in-process stream over one growing backing store with independent
//! read and write cursors. A single internal lock serializes every access,
//! so a producer task and a consumer task may use the buffer concurrently
//! without external coordination, and a read can never observe bytes the
//! writer has not committed.
//!
//! Used in two roles:
//!
//! - as a transport substitute for runs that want deterministic, non-network
//!   delivery (it implements both [`ChunkSource`] and [`RecordSink`]);
//! - as a reference oracle: an independent producer fills the buffer in
//!   parallel with the real transport, and every line received from the
//!   transport is cross-checked against the same-row line read from here.

use std::sync::Arc;

use async_trait::async_trait;
use framecheck_core::{Error, Result};
use tokio::sync::{Mutex, Notify};

use crate::transport::{ChunkSource, RecordSink};

#[derive(Debug)]
struct State {
    data: Vec<u8>,
    read_pos: u64,
    write_pos: u64,
    end_of_stream: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<State>,
    readable: Notify,
}

/// Cloneable handle to one shared buffer; producer and consumer tasks each
/// hold their own clone.
#[derive(Debug, Clone)]
pub struct SynchronizedBuffer {
    inner: Arc<Shared>,
}

impl SynchronizedBuffer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Shared {
                state: Mutex::new(State {
                    data: Vec::new(),
                    read_pos: 0,
                    write_pos: 0,
                    end_of_stream: false,
                }),
                readable: Notify::new(),
            }),
        }
    }

    /// Append `buf` at the write cursor and advance it.
    pub async fn write(&self, buf: &[u8]) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        if state.end_of_stream {
            return Err(Error::Config(
                "write to a synchronized buffer after end of stream".into(),
            ));
        }
        state.data.extend_from_slice(buf);
        state.write_pos += buf.len() as u64;
        drop(state);

        self.inner.readable.notify_one();
        Ok(())
    }

    /// Consume up to `buf.len()` bytes from the read cursor.
    ///
    /// Waits while no bytes are available and the stream is unfinished.
    /// Returns 0 only once end-of-stream is set and every written byte has
    /// been consumed. Designed for a single consumer task; the waiting
    /// handshake hands its wakeup to exactly one reader.
    pub async fn read(&self, buf: &mut [u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }
        loop {
            {
                let mut state = self.inner.state.lock().await;
                let available = (state.write_pos - state.read_pos) as usize;
                if available > 0 {
                    let n = available.min(buf.len());
                    let start = state.read_pos as usize;
                    buf[..n].copy_from_slice(&state.data[start..start + n]);
                    state.read_pos += n as u64;
                    return n;
                }
                if state.end_of_stream {
                    return 0;
                }
            }
            // A write between the lock release and this await leaves a
            // stored permit, so the wakeup cannot be lost.
            self.inner.readable.notified().await;
        }
    }

    /// Mark the stream complete and wake any waiting reader.
    pub async fn finish(&self) {
        let mut state = self.inner.state.lock().await;
        state.end_of_stream = true;
        drop(state);

        self.inner.readable.notify_one();
    }

    /// Current `(read_pos, write_pos)` cursor pair.
    pub async fn positions(&self) -> (u64, u64) {
        let state = self.inner.state.lock().await;
        (state.read_pos, state.write_pos)
    }
}

impl Default for SynchronizedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChunkSource for SynchronizedBuffer {
    async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(SynchronizedBuffer::read(self, buf).await)
    }
}

#[async_trait]
impl RecordSink for SynchronizedBuffer {
    async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        SynchronizedBuffer::write(self, buf).await
    }

    async fn complete(&mut self) -> Result<()> {
        self.finish().await;
        Ok(())
    }
}
