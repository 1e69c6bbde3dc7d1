//! Configuration for a pipeline run.
//!
//! Parsing and loading belong to the host process; this module only defines
//! the recognized options, their defaults, and validation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::formatter::max_representable_row;
use crate::MAX_LINE_LENGTH;

fn default_chunk_size() -> usize {
    65_536
}

fn default_batch_size() -> u64 {
    100
}

fn default_io_delay() -> Duration {
    Duration::from_millis(15)
}

fn default_max_rows() -> u64 {
    1_000_000_000
}

/// Options recognized by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadOptions {
    /// Bytes pulled from the transport per fill.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Records processed between backpressure pauses.
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,

    /// Duration of one backpressure pause.
    #[serde(default = "default_io_delay")]
    pub io_delay: Duration,

    /// How the window is filled from the transport.
    #[serde(default)]
    pub strategy: ReadStrategy,

    /// Rows the in-process producer emits before completing the stream.
    #[serde(default = "default_max_rows")]
    pub max_rows: u64,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            batch_size: default_batch_size(),
            io_delay: default_io_delay(),
            strategy: ReadStrategy::default(),
            max_rows: default_max_rows(),
        }
    }
}

impl ReadOptions {
    /// Reject configurations under which the pipeline cannot make progress.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size <= MAX_LINE_LENGTH {
            return Err(Error::Config(format!(
                "chunk_size {} must exceed the max line length {MAX_LINE_LENGTH}",
                self.chunk_size
            )));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be positive".into()));
        }
        if self.max_rows > max_representable_row() {
            return Err(Error::Config(format!(
                "max_rows {} exceeds the highest encodable row {}",
                self.max_rows,
                max_representable_row()
            )));
        }
        Ok(())
    }
}

/// Strategy for pulling available bytes into the working window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadStrategy {
    /// One underlying read per fill; returns whatever is available.
    SingleRead,
    /// Loop reads until the window's spare capacity is exhausted or the
    /// transport signals end-of-stream.
    #[default]
    FillUntilFull,
}

impl std::fmt::Display for ReadStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadStrategy::SingleRead => write!(f, "single-read"),
            ReadStrategy::FillUntilFull => write!(f, "fill-until-full"),
        }
    }
}

impl std::str::FromStr for ReadStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "single-read" => Ok(ReadStrategy::SingleRead),
            "fill-until-full" => Ok(ReadStrategy::FillUntilFull),
            other => Err(Error::Config(format!("unknown read strategy '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ReadOptions::default();
        assert_eq!(options.chunk_size, 65_536);
        assert_eq!(options.batch_size, 100);
        assert_eq!(options.io_delay, Duration::from_millis(15));
        assert_eq!(options.strategy, ReadStrategy::FillUntilFull);
        options.validate().unwrap();
    }

    #[test]
    fn test_rejects_undersized_chunk() {
        let options = ReadOptions {
            chunk_size: MAX_LINE_LENGTH,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_zero_batch() {
        let options = ReadOptions {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_max_rows_past_calendar_range() {
        let options = ReadOptions {
            max_rows: u64::MAX,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_strategy_parses_from_kebab_case() {
        assert_eq!(
            "single-read".parse::<ReadStrategy>().unwrap(),
            ReadStrategy::SingleRead
        );
        assert_eq!(
            "fill-until-full".parse::<ReadStrategy>().unwrap(),
            ReadStrategy::FillUntilFull
        );
        assert!("pipe".parse::<ReadStrategy>().is_err());
    }

    #[test]
    fn test_deserializes_with_defaults_filled_in() {
        let options: ReadOptions = serde_json::from_str(r#"{"chunk_size": 4096}"#).unwrap();
        assert_eq!(options.chunk_size, 4096);
        assert_eq!(options.batch_size, 100);
    }
}
