//! Byte-for-byte verification of received lines.
//!
//! For every framed line the verifier recomputes the canonical encoding of
//! the expected row and compares exactly. A mismatch is terminal for the
//! whole run: correctness of framing at one row is evidence the run's state
//! may already be corrupted, so nothing is retried or skipped.

use crate::error::{Error, Result};
use crate::formatter::RecordFormatter;
use crate::MAX_LINE_LENGTH;

/// Recomputes expected encodings and reports divergence.
///
/// Owns its own [`RecordFormatter`] so verification never shares mutable
/// state with the producing side — a shared defect could otherwise mask
/// itself.
#[derive(Debug, Default)]
pub struct RecordVerifier {
    formatter: RecordFormatter,
}

impl RecordVerifier {
    pub fn new() -> Self {
        Self {
            formatter: RecordFormatter::new(),
        }
    }

    /// Check `line` against the canonical encoding of `row`.
    ///
    /// `bytes_consumed` is the approximate offset into the stream, carried
    /// into diagnostics only. Returns [`Error::LengthExceeded`] for a line
    /// too long to ever be legal and [`Error::Corrupted`] on any byte
    /// divergence, with both sides rendered as text.
    pub fn verify(&mut self, row: u64, line: &[u8], bytes_consumed: u64) -> Result<()> {
        if line.len() > MAX_LINE_LENGTH {
            return Err(Error::LengthExceeded {
                row,
                bytes_consumed,
            });
        }

        let expected = self.formatter.format(row, false);
        if expected == line {
            return Ok(());
        }

        let offset = first_mismatch(line, expected);
        Err(Error::Corrupted {
            row,
            bytes_consumed,
            offset,
            actual: String::from_utf8_lossy(line).into_owned(),
            expected: String::from_utf8_lossy(expected).into_owned(),
        })
    }
}

/// Index of the first differing byte; the shorter length when one side is
/// a strict prefix of the other.
fn first_mismatch(actual: &[u8], expected: &[u8]) -> usize {
    actual
        .iter()
        .zip(expected)
        .position(|(a, e)| a != e)
        .unwrap_or_else(|| actual.len().min(expected.len()))
}
