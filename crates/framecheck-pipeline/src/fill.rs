//! Chunk read strategies.
//!
//! Both strategies share one contract: pull bytes from the transport into
//! the framer's spare window capacity and return how many arrived, with 0
//! meaning end-of-stream. They differ only in how hard they try per fill —
//! which changes the size and alignment of the reads the consumer issues,
//! the axis along which framing defects historically hide.

use framecheck_core::{LineFramer, ReadStrategy, Result};

use crate::transport::ChunkSource;

/// Fill the framer's window from `source` according to `strategy`.
pub async fn fill_window<S>(
    strategy: ReadStrategy,
    source: &mut S,
    framer: &mut LineFramer,
) -> Result<usize>
where
    S: ChunkSource + ?Sized,
{
    match strategy {
        ReadStrategy::SingleRead => {
            let n = source.read_chunk(framer.writable()).await?;
            framer.advance(n);
            Ok(n)
        }
        ReadStrategy::FillUntilFull => {
            let mut total = 0;
            loop {
                let writable = framer.writable();
                if writable.is_empty() {
                    break;
                }
                let n = source.read_chunk(writable).await?;
                if n == 0 {
                    break;
                }
                framer.advance(n);
                total += n;
            }
            Ok(total)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::IoSource;
    use framecheck_core::MAX_LINE_LENGTH;

    #[tokio::test]
    async fn test_single_read_takes_one_bite() {
        // A duplex with a 4-byte internal buffer delivers at most 4 bytes
        // per read even though more is pending.
        let (mut tx, rx) = tokio::io::duplex(4);
        let writer = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            tx.write_all(b"abcdefgh").await.unwrap();
        });

        let mut source = IoSource::new(rx);
        let mut framer = LineFramer::new(MAX_LINE_LENGTH + 64).unwrap();
        let n = fill_window(ReadStrategy::SingleRead, &mut source, &mut framer)
            .await
            .unwrap();
        assert!(n > 0 && n <= 4, "single read returned {n}");
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_fill_until_full_accumulates_partial_reads() {
        let (mut tx, rx) = tokio::io::duplex(4);
        let writer = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            tx.write_all(&vec![b'z'; MAX_LINE_LENGTH + 72]).await.unwrap();
        });

        let mut source = IoSource::new(rx);
        let mut framer = LineFramer::new(MAX_LINE_LENGTH + 72).unwrap();
        let n = fill_window(ReadStrategy::FillUntilFull, &mut source, &mut framer)
            .await
            .unwrap();
        // The window is exhausted despite the transport trickling 4 bytes
        // per read.
        assert_eq!(n, MAX_LINE_LENGTH + 72);
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_fill_until_full_stops_at_end_of_stream() {
        let data = b"short".to_vec();
        let mut source = IoSource::new(&data[..]);
        let mut framer = LineFramer::new(MAX_LINE_LENGTH + 64).unwrap();
        let n = fill_window(ReadStrategy::FillUntilFull, &mut source, &mut framer)
            .await
            .unwrap();
        assert_eq!(n, 5);

        let n = fill_window(ReadStrategy::FillUntilFull, &mut source, &mut framer)
            .await
            .unwrap();
        assert_eq!(n, 0);
    }
}
