//! Round-trip tests: however the canonical stream is sliced into delivery
//! chunks, strategy + framer must reproduce every row exactly and in order.

mod common;

use common::{canonical_stream, test_options, ScriptedSource};
use framecheck_core::ReadStrategy;
use framecheck_pipeline::Pipeline;
use tokio::sync::watch;

async fn roundtrip(rows: u64, fragment_sizes: &[usize], strategy: ReadStrategy) {
    let stream = canonical_stream(rows).await;
    let total_bytes = stream.len() as u64;
    let mut source = ScriptedSource::new(stream, fragment_sizes);

    let pipeline = Pipeline::builder()
        .options(test_options(strategy))
        .build()
        .unwrap();
    let (_tx, shutdown) = watch::channel(false);
    let summary = pipeline.run(&mut source, shutdown).await.unwrap_or_else(|err| {
        panic!("roundtrip failed for fragments {fragment_sizes:?} ({strategy}): {err}")
    });

    assert_eq!(summary.rows, rows, "fragments {fragment_sizes:?} ({strategy})");
    assert_eq!(summary.bytes_consumed, total_bytes);
}

#[tokio::test]
async fn test_seven_byte_fragments_reproduce_first_rows() {
    // Adversarial 7-byte delivery over a stream whose records were already
    // split in two by the producer: no boundary ever aligns.
    roundtrip(5, &[7], ReadStrategy::FillUntilFull).await;
    roundtrip(5, &[7], ReadStrategy::SingleRead).await;
}

#[tokio::test]
async fn test_single_byte_fragments() {
    roundtrip(20, &[1], ReadStrategy::FillUntilFull).await;
    roundtrip(20, &[1], ReadStrategy::SingleRead).await;
}

#[tokio::test]
async fn test_prime_sized_fragments() {
    for strategy in [ReadStrategy::SingleRead, ReadStrategy::FillUntilFull] {
        roundtrip(100, &[13], strategy).await;
        roundtrip(100, &[31], strategy).await;
    }
}

#[tokio::test]
async fn test_one_giant_fragment() {
    // Larger than the whole stream; every read drains what fits.
    roundtrip(50, &[1 << 20], ReadStrategy::SingleRead).await;
    roundtrip(50, &[1 << 20], ReadStrategy::FillUntilFull).await;
}

#[tokio::test]
async fn test_uneven_fragment_cycle() {
    // Mixes tiny and record-straddling deliveries.
    for strategy in [ReadStrategy::SingleRead, ReadStrategy::FillUntilFull] {
        roundtrip(200, &[5, 1, 2, 97, 3], strategy).await;
    }
}

#[tokio::test]
async fn test_empty_line_is_skipped_without_consuming_a_row() {
    let mut formatter = framecheck_core::RecordFormatter::new();
    let mut stream = Vec::new();
    stream.extend_from_slice(formatter.format(0, true));
    stream.push(b'\n'); // stray delimiter: an empty line, not a record
    stream.extend_from_slice(formatter.format(1, true));

    let expected_bytes = stream.len() as u64;
    let mut source = ScriptedSource::new(stream, &[9]);
    let pipeline = Pipeline::builder()
        .options(test_options(ReadStrategy::FillUntilFull))
        .build()
        .unwrap();
    let (_tx, shutdown) = watch::channel(false);
    let summary = pipeline.run(&mut source, shutdown).await.unwrap();

    assert_eq!(summary.rows, 2);
    assert_eq!(summary.bytes_consumed, expected_bytes);
}
