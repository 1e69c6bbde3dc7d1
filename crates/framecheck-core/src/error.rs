//! Error types for framecheck operations.
//!
//! The taxonomy is deliberately small and deliberately fatal: every variant
//! except `Config` aborts the pipeline run that raised it. There are no
//! retry or skip semantics anywhere in the system — a detected divergence
//! must stop the run immediately so the triggering condition is preserved
//! for diagnosis instead of being masked by recovery logic.
//!
//! ## Error Categories
//!
//! - **Transport**: `Io` — an underlying read or write failed
//! - **Framing**: `LengthExceeded` — an undelimited run of bytes grew past
//!   the maximum line length, so framing can never complete
//! - **Verification**: `Corrupted` — the received bytes for a row diverged
//!   from the canonical encoding; `ReferenceMismatch` — the received bytes
//!   diverged from the parallel reference stream
//! - **Setup**: `Config` — invalid options; raised before any I/O happens
//!
//! Cancellation is *not* an error. A cancelled run unwinds with `Ok`, and
//! failures that are mere side effects of cancellation are suppressed by
//! the pipeline rather than surfaced through this enum.

use thiserror::Error;

/// Convenience type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An underlying transport read or write failed.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// An in-progress line grew past the maximum line length without a
    /// delimiter. `bytes_consumed` is the approximate offset into the
    /// stream where the run of bytes started.
    #[error("length exceeded max line size at row {row}, ~{bytes_consumed} bytes")]
    LengthExceeded { row: u64, bytes_consumed: u64 },

    /// A received line did not match the canonical encoding for its row.
    ///
    /// Carries lossy text renderings of both sides so the corruption shape
    /// is visible in logs, plus the offset of the first differing byte.
    #[error(
        "line was corrupted at row {row}, ~{bytes_consumed} bytes \
         (first mismatch at byte {offset}):\nactual:   '{actual}'\nexpected: '{expected}'"
    )]
    Corrupted {
        row: u64,
        bytes_consumed: u64,
        offset: usize,
        actual: String,
        expected: String,
    },

    /// A received line did not match the same-row line pulled from the
    /// parallel reference stream. Distinct from [`Error::Corrupted`] so the
    /// divergence can be localized: a reference mismatch implicates the
    /// transport, a canonical mismatch could also implicate the consumer's
    /// own buffering.
    #[error(
        "line diverged from reference stream at row {row}, ~{bytes_consumed} bytes:\
         \nactual:    '{actual}'\nreference: '{reference}'"
    )]
    ReferenceMismatch {
        row: u64,
        bytes_consumed: u64,
        actual: String,
        reference: String,
    },

    /// Invalid configuration, detected before the run starts.
    #[error("configuration error: {0}")]
    Config(String),
}
