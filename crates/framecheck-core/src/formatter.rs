//! Canonical record encoding.
//!
//! Every record in the stream is identified by a non-negative row index and
//! has exactly one correct byte encoding, derived from the row alone:
//!
//! ```text
//! abc,{row},def,{time1},ghi,{row % 1000},jkl,{time2},mno
//! ```
//!
//! `time1` is the calendar timestamp `row` milliseconds after
//! 0001-01-01T00:00:00Z and `time2` is `row` seconds after the same epoch,
//! both rendered to whole-second precision as `MM/DD/YYYY HH:MM:SS +00:00`.
//! The same function is used by the producer to emit the stream and by the
//! verifier to recompute the expected bytes, so any divergence between the
//! two is evidence of corruption in between, never of a formatting skew.
//!
//! The encoding is pure: identical rows always yield byte-identical output,
//! and the output never exceeds [`MAX_LINE_LENGTH`] minus one byte, leaving
//! room for the line delimiter.

use std::fmt::Write as _;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::DELIMITER;

/// Maximum length of an encoded line, delimiter included.
pub const MAX_LINE_LENGTH: usize = 128;

/// 100-nanosecond ticks per millisecond. Tick values count from
/// 0001-01-01T00:00:00Z; tick math runs in `i128` so no row a caller can
/// supply overflows it.
const TICKS_PER_MILLISECOND: i128 = 10_000;

/// 100-nanosecond ticks per second.
const TICKS_PER_SECOND: i128 = 1_000 * TICKS_PER_MILLISECOND;

/// Seconds between 0001-01-01T00:00:00Z and the Unix epoch.
const SECONDS_FROM_CE_TO_UNIX: i128 = 62_135_596_800;

/// Rendering applied to both timestamp fields.
const TIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S +00:00";

/// Stateless-by-contract encoder with a reusable scratch buffer.
///
/// The scratch buffer only amortizes allocation; it never carries data from
/// one call into the next. Producer and verifier each own a separate
/// instance so the two call sites share no mutable state.
#[derive(Debug, Default)]
pub struct RecordFormatter {
    scratch: String,
}

impl RecordFormatter {
    pub fn new() -> Self {
        Self {
            scratch: String::with_capacity(MAX_LINE_LENGTH),
        }
    }

    /// Encode `row`, optionally with the trailing delimiter, and return the
    /// encoded bytes. The returned slice is valid until the next call.
    pub fn format(&mut self, row: u64, eol: bool) -> &[u8] {
        let time1 = field_time(row as i128 * TICKS_PER_MILLISECOND);
        let time2 = field_time(row as i128 * TICKS_PER_SECOND);

        self.scratch.clear();
        let _ = write!(
            self.scratch,
            "abc,{row},def,{},ghi,{},jkl,{},mno",
            time1.format(TIME_FORMAT),
            row % 1_000,
            time2.format(TIME_FORMAT),
        );
        if eol {
            self.scratch.push(DELIMITER as char);
        }

        debug_assert!(self.scratch.len() <= MAX_LINE_LENGTH);
        self.scratch.as_bytes()
    }

    /// Owned copy of the encoding of `row`, without the delimiter.
    pub fn format_owned(row: u64) -> Bytes {
        let mut formatter = Self::new();
        Bytes::copy_from_slice(formatter.format(row, false))
    }
}

/// Calendar timestamp for a tick count since 0001-01-01T00:00:00Z,
/// truncated to whole seconds.
///
/// Total for every row up to [`max_representable_row`]; the row counter
/// would have to pass 8 * 10^12 before `time2` left the representable
/// calendar range.
fn field_time(ticks: i128) -> DateTime<Utc> {
    let seconds = ticks / TICKS_PER_SECOND - SECONDS_FROM_CE_TO_UNIX;
    i64::try_from(seconds)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .expect("tick value within the representable calendar range")
}

/// Highest row index whose `time2` field, `row` seconds after
/// 0001-01-01T00:00:00Z, is still a representable calendar timestamp.
pub fn max_representable_row() -> u64 {
    (DateTime::<Utc>::MAX_UTC.timestamp() + SECONDS_FROM_CE_TO_UNIX as i64) as u64
}
