//! Line framing over arbitrarily fragmented chunks.
//!
//! The transport delivers bytes in chunks whose size and alignment the
//! consumer does not control: a chunk may hold part of one line, several
//! whole lines, or a giant run of them. [`LineFramer`] reassembles complete
//! delimited lines regardless of how the bytes were sliced.
//!
//! ## Fill / extract cycle
//!
//! 1. The caller fills [`LineFramer::writable`] with fresh transport bytes
//!    and commits them with [`LineFramer::advance`].
//! 2. [`LineFramer::next_line`] yields each complete line in order,
//!    delimiter excluded. An empty slice between two consecutive delimiters
//!    is yielded as an empty line; callers treat it as "no data".
//! 3. [`LineFramer::carry_over`] moves the undelimited tail to the front of
//!    the window so the next fill appends after it, preserving exact byte
//!    content and order.
//!
//! A tail that outgrows [`MAX_LINE_LENGTH`] can never be completed within a
//! legal line, so `carry_over` reports it as fatal rather than letting the
//! window fill up and framing spin forever.

use crate::error::{Error, Result};
use crate::{DELIMITER, MAX_LINE_LENGTH};

/// Accumulating byte window with a `[0, filled)` occupied region and a
/// scan cursor over the not-yet-framed prefix.
#[derive(Debug)]
pub struct LineFramer {
    buf: Vec<u8>,
    filled: usize,
    consumed: usize,
}

impl LineFramer {
    /// Create a framer with a window of `chunk_size` bytes.
    ///
    /// `chunk_size` must exceed [`MAX_LINE_LENGTH`]: a line that does not
    /// fit in one window can never be framed, so a smaller window is a
    /// fatal configuration error rather than a runtime hazard.
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size <= MAX_LINE_LENGTH {
            return Err(Error::Config(format!(
                "chunk size {chunk_size} must exceed the max line length {MAX_LINE_LENGTH}"
            )));
        }
        Ok(Self {
            buf: vec![0; chunk_size],
            filled: 0,
            consumed: 0,
        })
    }

    /// Spare capacity for the next transport fill.
    pub fn writable(&mut self) -> &mut [u8] {
        &mut self.buf[self.filled..]
    }

    /// Commit `n` freshly filled bytes.
    pub fn advance(&mut self, n: usize) {
        debug_assert!(self.filled + n <= self.buf.len());
        self.filled += n;
    }

    /// Yield the next complete line, delimiter excluded, or `None` when no
    /// further delimiter is present in the window.
    pub fn next_line(&mut self) -> Option<&[u8]> {
        let haystack = &self.buf[self.consumed..self.filled];
        let at = haystack.iter().position(|&b| b == DELIMITER)?;
        let start = self.consumed;
        self.consumed += at + 1;
        Some(&self.buf[start..start + at])
    }

    /// Move the undelimited tail to the front of the window.
    ///
    /// `row` and `bytes_consumed` only provide diagnostic context for the
    /// fatal case where the tail has outgrown the maximum line length.
    pub fn carry_over(&mut self, row: u64, bytes_consumed: u64) -> Result<()> {
        let tail = self.filled - self.consumed;
        if tail > MAX_LINE_LENGTH {
            return Err(Error::LengthExceeded {
                row,
                bytes_consumed,
            });
        }
        self.buf.copy_within(self.consumed..self.filled, 0);
        self.filled = tail;
        self.consumed = 0;
        Ok(())
    }

    /// True when the window holds no unframed bytes.
    pub fn is_empty(&self) -> bool {
        self.consumed == self.filled
    }

    /// Bytes currently held but not yet framed.
    pub fn pending(&self) -> usize {
        self.filled - self.consumed
    }
}
