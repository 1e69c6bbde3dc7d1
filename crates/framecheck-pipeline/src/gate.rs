//! Backpressure gate.
//!
//! Models a slow downstream consumer: after every full batch of verified
//! records the pipeline stalls on a batch of concurrent unit delays. The
//! gate runs strictly after verification, so it can shift timing without
//! ever touching the data correctness path.

use std::time::Duration;

use futures::future::join_all;

/// Periodic stall applied after every `batch_size` verified records.
#[derive(Debug, Clone)]
pub struct BackpressureGate {
    batch_size: u64,
    delay: Duration,
}

impl BackpressureGate {
    pub fn new(batch_size: u64, delay: Duration) -> Self {
        Self { batch_size, delay }
    }

    /// Stall iff `row` is a positive multiple of the batch size.
    ///
    /// The stall awaits `batch_size` unit delays jointly, emulating a batch
    /// of downstream operations issued concurrently.
    pub async fn after_record(&self, row: u64) {
        if self.batch_size == 0 || row == 0 || row % self.batch_size != 0 {
            return;
        }
        let delays = (0..self.batch_size).map(|_| tokio::time::sleep(self.delay));
        join_all(delays).await;
    }
}
