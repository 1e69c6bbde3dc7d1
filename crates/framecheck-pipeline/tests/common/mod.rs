//! Shared test doubles for pipeline integration tests.
#![allow(dead_code)]

use std::time::Duration;

use async_trait::async_trait;
use framecheck_core::{ReadOptions, ReadStrategy, RecordFormatter, Result};
use framecheck_pipeline::{ChunkSource, RecordSink, StreamProducer};
use tokio::sync::watch;

/// Sink that captures every byte written.
#[derive(Default)]
pub struct VecSink {
    pub data: Vec<u8>,
    pub completed: bool,
}

#[async_trait]
impl RecordSink for VecSink {
    async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.data.extend_from_slice(buf);
        Ok(())
    }

    async fn complete(&mut self) -> Result<()> {
        self.completed = true;
        Ok(())
    }
}

/// Source that replays a byte stream sliced into a scripted cycle of
/// fragment sizes, regardless of how much the caller asked for.
pub struct ScriptedSource {
    data: Vec<u8>,
    pos: usize,
    sizes: Vec<usize>,
    next: usize,
}

impl ScriptedSource {
    pub fn new(data: Vec<u8>, sizes: &[usize]) -> Self {
        assert!(sizes.iter().all(|&s| s > 0), "fragment sizes must be positive");
        Self {
            data,
            pos: 0,
            sizes: sizes.to_vec(),
            next: 0,
        }
    }
}

#[async_trait]
impl ChunkSource for ScriptedSource {
    async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.pos >= self.data.len() || buf.is_empty() {
            return Ok(0);
        }
        let want = self.sizes[self.next % self.sizes.len()];
        self.next += 1;
        let n = want.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// The canonical stream for rows `0..rows`, emitted through the real
/// producer (two adversarially split writes per record).
pub async fn canonical_stream(rows: u64) -> Vec<u8> {
    let mut sink = VecSink::default();
    let (_tx, rx) = watch::channel(false);
    StreamProducer::new(rows)
        .produce(&mut sink, rx)
        .await
        .unwrap();
    sink.data
}

/// Byte offset of `row`'s line within the canonical stream.
pub fn line_offset(row: u64) -> usize {
    let mut formatter = RecordFormatter::new();
    (0..row).map(|r| formatter.format(r, true).len()).sum()
}

/// Options tuned so short test runs never stall on the gate.
pub fn test_options(strategy: ReadStrategy) -> ReadOptions {
    ReadOptions {
        chunk_size: 256,
        batch_size: 1_000,
        io_delay: Duration::from_millis(1),
        strategy,
        max_rows: 0,
    }
}
