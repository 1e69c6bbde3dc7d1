//! Deterministic stream producer.
//!
//! Emits rows `0..max_rows` in canonical encoding, deliberately issuing
//! every record as **two** writes split at a row-dependent offset that is
//! never aligned with a delimiter or with any buffer boundary the consumer
//! controls. Uncontrolled network segmentation cannot be reproduced
//! faithfully, so this substitutes a deterministic, still-adversarial split
//! policy that exercises the same framing paths.

use framecheck_core::{RecordFormatter, Result};
use tokio::sync::watch;
use tracing::debug;

use crate::transport::RecordSink;

/// Producer of the canonical record stream.
///
/// Holds one reusable formatter; at no point is more than one record
/// buffered, so `max_rows` may be effectively unbounded.
#[derive(Debug)]
pub struct StreamProducer {
    formatter: RecordFormatter,
    max_rows: u64,
}

impl StreamProducer {
    pub fn new(max_rows: u64) -> Self {
        Self {
            formatter: RecordFormatter::new(),
            max_rows,
        }
    }

    /// Write rows `0..max_rows` to `sink`, then complete the stream.
    ///
    /// Returns the number of rows written. Observes `shutdown` at every
    /// suspension point and unwinds with `Ok` when it fires — cancellation
    /// is not an error.
    pub async fn produce<S>(
        &mut self,
        sink: &mut S,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<u64>
    where
        S: RecordSink + ?Sized,
    {
        for row in 0..self.max_rows {
            if *shutdown.borrow() {
                debug!(row, "producer cancelled");
                return Ok(row);
            }

            let line = self.formatter.format(row, true);
            // Split so the two writes never align with the delimiter: for
            // a line of length n the first write carries 1..=n/2 bytes.
            let split = (row as usize % (line.len() / 2)) + 1;

            // A write error that races with a cancellation request is part
            // of the unwind (the consumer tears the transport down), not a
            // failure of the run.
            tokio::select! {
                res = sink.write_all(&line[..split]) => {
                    if let Err(err) = res {
                        if *shutdown.borrow() {
                            debug!(row, "producer cancelled during write");
                            return Ok(row);
                        }
                        return Err(err);
                    }
                }
                _ = shutdown.changed() => return Ok(row),
            }
            tokio::select! {
                res = sink.write_all(&line[split..]) => {
                    if let Err(err) = res {
                        if *shutdown.borrow() {
                            debug!(row, "producer cancelled during write");
                            return Ok(row);
                        }
                        return Err(err);
                    }
                }
                _ = shutdown.changed() => return Ok(row),
            }
        }

        if let Err(err) = sink.complete().await {
            if *shutdown.borrow() {
                debug!(rows = self.max_rows, "producer cancelled at completion");
                return Ok(self.max_rows);
            }
            return Err(err);
        }
        debug!(rows = self.max_rows, "producer completed stream");
        Ok(self.max_rows)
    }
}
