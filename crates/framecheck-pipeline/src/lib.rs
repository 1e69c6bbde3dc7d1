//! Async pipeline for producing, framing and verifying a delimited record
//! stream under adversarial fragmentation.
//!
//! The crate wires the pure building blocks from `framecheck-core` into a
//! set of cooperative tasks: a [`producer::StreamProducer`] that emits the
//! canonical stream while deliberately splitting every record across two
//! writes, a consumer loop ([`pipeline::Pipeline`]) that refills a window
//! via a configurable [`fill`] strategy and verifies every framed line, and
//! a [`sync_buffer::SynchronizedBuffer`] usable both as an in-process
//! transport and as a parallel cross-check oracle.

pub mod fill;
pub mod gate;
pub mod pipeline;
pub mod producer;
pub mod sync_buffer;
pub mod transport;

pub use gate::BackpressureGate;
pub use pipeline::{Pipeline, PipelineBuilder, PipelineSummary};
pub use producer::StreamProducer;
pub use sync_buffer::SynchronizedBuffer;
pub use transport::{ChunkSource, IoSink, IoSource, RecordSink};
