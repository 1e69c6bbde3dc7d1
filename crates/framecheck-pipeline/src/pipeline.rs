//! Pipeline runner.
//!
//! One configurable consumer loop replaces the family of near-identical
//! reader variants the investigation started from: the transport-adaptation
//! axis is covered by the [`ChunkSource`] seam and the fill axis by
//! [`framecheck_core::ReadStrategy`]. Every behavioral combination of the originals is a
//! configuration of this one loop.
//!
//! ## Control flow
//!
//! ```text
//! StreamProducer → transport → fill_window → LineFramer → RecordVerifier
//!                                                       → BackpressureGate
//! ```
//!
//! The cross-checked variant additionally runs a second, independent
//! producer into a [`SynchronizedBuffer`] and compares every framed line
//! against the same-row line pulled from that oracle, which localizes a
//! divergence to the transport (reference mismatch) as opposed to the
//! consumer's own buffering (canonical mismatch).
//!
//! All fatal errors propagate to the caller; the hosting process decides
//! how to stop. Cancellation unwinds every task without surfacing an
//! error.

use std::io;

use framecheck_core::{Error, LineFramer, ReadOptions, RecordVerifier, Result};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::fill::fill_window;
use crate::gate::BackpressureGate;
use crate::producer::StreamProducer;
use crate::sync_buffer::SynchronizedBuffer;
use crate::transport::{ChunkSource, IoSink, IoSource};

/// Rows between progress log lines.
const PROGRESS_INTERVAL: u64 = 10_000;

/// Capacity of the in-process duplex transport. Smaller than any sane
/// chunk size, so delivery is fragmented across many reads.
const DUPLEX_CAPACITY: usize = 8 * 1024;

/// Outcome of a completed (or cancelled) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Rows verified.
    pub rows: u64,
    /// Approximate bytes consumed, delimiters included.
    pub bytes_consumed: u64,
}

/// Builder for [`Pipeline`]. Validates options at `build`.
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    options: ReadOptions,
    cross_check: bool,
}

impl PipelineBuilder {
    pub fn options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    /// Enable the parallel reference-stream cross-check.
    pub fn cross_check(mut self, enabled: bool) -> Self {
        self.cross_check = enabled;
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        self.options.validate()?;
        Ok(Pipeline {
            options: self.options,
            cross_check: self.cross_check,
        })
    }
}

/// Configured runner; every `run_*` call owns fresh window, verifier and
/// cursor state, so runs never share mutable state.
#[derive(Debug)]
pub struct Pipeline {
    options: ReadOptions,
    cross_check: bool,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Consume `source` until end-of-stream, verifying every line against
    /// its canonical encoding.
    pub async fn run<S>(
        &self,
        source: &mut S,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<PipelineSummary>
    where
        S: ChunkSource + ?Sized,
    {
        let mut framer = LineFramer::new(self.options.chunk_size)?;
        let mut verifier = RecordVerifier::new();
        let gate = BackpressureGate::new(self.options.batch_size, self.options.io_delay);
        let mut row: u64 = 0;
        let mut bytes_consumed: u64 = 0;

        loop {
            if *shutdown.borrow() {
                debug!(row, "consumer cancelled");
                break;
            }

            let filled = tokio::select! {
                res = fill_window(self.options.strategy, source, &mut framer) => res?,
                _ = shutdown.changed() => break,
            };
            if filled == 0 {
                // A cancelled producer legitimately stops mid-record; that
                // must not surface as a truncation failure.
                if framer.is_empty() || *shutdown.borrow() {
                    break;
                }
                return Err(truncated_stream(row, bytes_consumed));
            }

            while let Some(line) = framer.next_line() {
                bytes_consumed += line.len() as u64 + 1;

                // An empty line is "no data", not a record: the row
                // counter does not move.
                if line.is_empty() {
                    continue;
                }

                if let Err(err) = verifier.verify(row, line, bytes_consumed) {
                    error!(row, bytes_consumed, %err, "verification failed");
                    return Err(err);
                }

                gate.after_record(row).await;
                row += 1;
                if row % PROGRESS_INTERVAL == 0 {
                    info!(rows = row, bytes_consumed, "verified");
                }
            }

            framer.carry_over(row, bytes_consumed)?;
        }

        Ok(PipelineSummary {
            rows: row,
            bytes_consumed,
        })
    }

    /// Consume `source` while cross-checking every line against a parallel
    /// reference stream produced independently into a
    /// [`SynchronizedBuffer`].
    pub async fn run_cross_checked<S>(
        &self,
        source: &mut S,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<PipelineSummary>
    where
        S: ChunkSource + ?Sized,
    {
        let reference = SynchronizedBuffer::new();
        let max_rows = self.options.max_rows;
        let ref_shutdown = shutdown.clone();
        let mut ref_sink = reference.clone();
        let ref_producer = tokio::spawn(async move {
            StreamProducer::new(max_rows)
                .produce(&mut ref_sink, ref_shutdown)
                .await
        });

        let result = self
            .cross_check_loop(source, &reference, &mut shutdown)
            .await;

        if result.is_err() {
            // The oracle producer has no reason to keep running once the
            // run is lost.
            ref_producer.abort();
        }
        match ref_producer.await {
            Ok(Ok(_)) | Err(_) => {}
            Ok(Err(err)) => {
                if result.is_ok() {
                    return Err(err);
                }
            }
        }
        result
    }

    async fn cross_check_loop<S>(
        &self,
        source: &mut S,
        reference: &SynchronizedBuffer,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<PipelineSummary>
    where
        S: ChunkSource + ?Sized,
    {
        let strategy = self.options.strategy;
        let mut framer = LineFramer::new(self.options.chunk_size)?;
        let mut ref_framer = LineFramer::new(self.options.chunk_size)?;
        let mut verifier = RecordVerifier::new();
        let gate = BackpressureGate::new(self.options.batch_size, self.options.io_delay);
        let mut row: u64 = 0;
        let mut bytes_consumed: u64 = 0;

        'run: loop {
            if *shutdown.borrow() {
                debug!(row, "consumer cancelled");
                break;
            }

            let filled = tokio::select! {
                res = fill_window(strategy, source, &mut framer) => res?,
                _ = shutdown.changed() => break,
            };
            if filled == 0 {
                if framer.is_empty() || *shutdown.borrow() {
                    break;
                }
                return Err(truncated_stream(row, bytes_consumed));
            }

            // Pull exactly `filled` bytes from the oracle so both windows
            // cover the same span of the stream. As long as the streams
            // agree, both framers also carry identical tails.
            let mut pulled = 0;
            while pulled < filled {
                let want = filled - pulled;
                let n = tokio::select! {
                    n = reference.read(&mut ref_framer.writable()[..want]) => n,
                    _ = shutdown.changed() => break 'run,
                };
                if n == 0 {
                    return Err(Error::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("reference stream ended at row {row} while the transport kept going"),
                    )));
                }
                ref_framer.advance(n);
                pulled += n;
            }

            while let Some(line) = framer.next_line() {
                bytes_consumed += line.len() as u64 + 1;

                let reference_line = ref_framer.next_line();
                if reference_line != Some(line) {
                    let err = Error::ReferenceMismatch {
                        row,
                        bytes_consumed,
                        actual: String::from_utf8_lossy(line).into_owned(),
                        reference: reference_line
                            .map(|r| String::from_utf8_lossy(r).into_owned())
                            .unwrap_or_default(),
                    };
                    error!(row, bytes_consumed, %err, "reference cross-check failed");
                    return Err(err);
                }

                if line.is_empty() {
                    continue;
                }

                if let Err(err) = verifier.verify(row, line, bytes_consumed) {
                    error!(row, bytes_consumed, %err, "verification failed");
                    return Err(err);
                }

                gate.after_record(row).await;
                row += 1;
                if row % PROGRESS_INTERVAL == 0 {
                    info!(rows = row, bytes_consumed, "verified against reference");
                }
            }

            framer.carry_over(row, bytes_consumed)?;
            ref_framer.carry_over(row, bytes_consumed)?;
        }

        Ok(PipelineSummary {
            rows: row,
            bytes_consumed,
        })
    }

    /// Full in-process run: producer and consumer as cooperative tasks over
    /// an in-memory duplex transport, joined at the end; either failure
    /// aborts the run.
    pub async fn run_in_process(
        &self,
        shutdown: watch::Receiver<bool>,
    ) -> Result<PipelineSummary> {
        let (producer_io, consumer_io) = tokio::io::duplex(DUPLEX_CAPACITY);
        let max_rows = self.options.max_rows;
        let producer_shutdown = shutdown.clone();
        let producer = tokio::spawn(async move {
            let mut sink = IoSink::new(producer_io);
            StreamProducer::new(max_rows)
                .produce(&mut sink, producer_shutdown)
                .await
        });

        let mut source = IoSource::new(consumer_io);
        let consumed = if self.cross_check {
            self.run_cross_checked(&mut source, shutdown).await
        } else {
            self.run(&mut source, shutdown).await
        };
        // Closing the consumer side unblocks a producer still writing.
        drop(source);

        let produced = producer.await.map_err(join_failure);
        match (consumed, produced) {
            (Err(err), _) => Err(err),
            (Ok(_), Err(err)) | (Ok(_), Ok(Err(err))) => Err(err),
            (Ok(summary), Ok(Ok(_))) => Ok(summary),
        }
    }
}

fn truncated_stream(row: u64, bytes_consumed: u64) -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("transport ended inside a record at row {row}, ~{bytes_consumed} bytes"),
    ))
}

/// A producer task that panicked or was aborted is a torn transport from
/// the consumer's point of view.
fn join_failure(err: tokio::task::JoinError) -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::Other,
        format!("producer task failed: {err}"),
    ))
}
