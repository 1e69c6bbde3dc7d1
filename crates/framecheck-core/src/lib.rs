pub mod config;
pub mod error;
pub mod formatter;
pub mod framer;
pub mod verifier;

pub use config::{ReadOptions, ReadStrategy};
pub use error::{Error, Result};
pub use formatter::{RecordFormatter, MAX_LINE_LENGTH};
pub use framer::LineFramer;
pub use verifier::RecordVerifier;

/// The single-byte record delimiter.
pub const DELIMITER: u8 = b'\n';
