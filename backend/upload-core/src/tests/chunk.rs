// Unit tests for chunk windowing
// Ranges must cover [0, size) exactly once, in order, with full windows except the last

use crate::CHUNK_SIZE;
use crate::upload::chunk::{Chunk, ChunkReader, ContentRange};

use std::io::Cursor;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

const ONE_MIB: usize = 1024 * 1024;

fn source(size: usize) -> Cursor<Vec<u8>> {
    Cursor::new((0..size).map(|i| (i % 251) as u8).collect())
}

async fn collect_chunks<R>(mut reader: ChunkReader<R>) -> Vec<Chunk>
where
    R: AsyncRead + Unpin,
{
    let mut chunks = Vec::new();
    while let Some(chunk) = reader.next_chunk().await.unwrap() {
        chunks.push(chunk);
    }
    chunks
}

/// Hands out at most `max_read` bytes per poll, like a slow pipe or network mount.
struct TrickleReader {
    data: Vec<u8>,
    position: usize,
    max_read: usize,
}

impl AsyncRead for TrickleReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let available = self.data.len() - self.position;
        let n = available.min(self.max_read).min(buf.remaining());
        let start = self.position;
        buf.put_slice(&self.data[start..start + n]);
        self.position += n;
        Poll::Ready(Ok(()))
    }
}

/// **VALUE**: Verifies the 1 MiB scenario produces the four documented ranges.
///
/// **WHY THIS MATTERS**: The service rejects any window whose Content-Range does not
/// match what it expects next. These four ranges are the canonical example.
///
/// **BUG THIS CATCHES**: Would catch off-by-one errors in the inclusive end, or a
/// last window padded to the full chunk size.
#[tokio::test]
async fn given_one_mib_source_when_chunked_then_produces_four_documented_ranges() {
    // GIVEN: A 1 MiB source
    let reader = ChunkReader::new(source(ONE_MIB), ONE_MIB as u64, CHUNK_SIZE);

    // WHEN: Reading every window
    let chunks = collect_chunks(reader).await;

    // THEN: Four windows with the expected ranges, the last one 64 KiB
    let ranges: Vec<String> = chunks
        .iter()
        .map(|c| c.content_range().to_string())
        .collect();
    assert_eq!(
        ranges,
        vec![
            "bytes 0-327679/1048576",
            "bytes 327680-655359/1048576",
            "bytes 655360-983039/1048576",
            "bytes 983040-1048575/1048576",
        ]
    );
    assert_eq!(chunks[3].len(), 65536);
    assert!(chunks[3].is_last());
    assert!(!chunks[2].is_last());
}

/// **VALUE**: Verifies that an exact multiple of the chunk size ends on a full window.
///
/// **WHY THIS MATTERS**: A trailing zero-length window would be sent as an invalid
/// `bytes N-(N-1)/N` range and fail the whole upload.
///
/// **BUG THIS CATCHES**: Would catch termination logic that relies on a short read
/// instead of a zero-byte read.
#[tokio::test]
async fn given_exact_multiple_when_chunked_then_last_window_is_full() {
    // GIVEN: A source of exactly two windows
    let size = 2 * CHUNK_SIZE;
    let reader = ChunkReader::new(source(size), size as u64, CHUNK_SIZE);

    // WHEN: Reading every window
    let chunks = collect_chunks(reader).await;

    // THEN: Two full windows, nothing after
    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| c.len() == CHUNK_SIZE));
    assert_eq!(
        chunks[1].content_range(),
        ContentRange {
            start: 327680,
            end: 655359,
            total: 655360,
        }
    );
}

/// **VALUE**: Verifies that an empty source yields no windows at all.
///
/// **WHY THIS MATTERS**: An empty range cannot be expressed in Content-Range, so the
/// loop must stop before producing one.
///
/// **BUG THIS CATCHES**: Would catch a reader that returns an empty `Chunk`.
#[tokio::test]
async fn given_empty_source_when_chunked_then_yields_nothing() {
    // GIVEN: An empty source
    let mut reader = ChunkReader::new(source(0), 0, CHUNK_SIZE);

    // WHEN: Reading the first window
    let first = reader.next_chunk().await.unwrap();

    // THEN: Nothing is produced
    assert!(first.is_none());
    assert_eq!(reader.offset(), 0);
}

/// **VALUE**: Verifies contiguity and coverage across awkward sizes.
///
/// **WHY THIS MATTERS**: The service requires strictly increasing, non-overlapping
/// ranges that end exactly at the declared total.
///
/// **BUG THIS CATCHES**: Would catch offset drift (advancing by the chunk size
/// instead of the bytes actually read).
#[tokio::test]
async fn given_various_sizes_when_chunked_then_ranges_cover_source_exactly_once() {
    for size in [1, CHUNK_SIZE - 1, CHUNK_SIZE, CHUNK_SIZE + 1, 3 * CHUNK_SIZE + 5] {
        // GIVEN: A source of `size` bytes
        let data = source(size);
        let expected = data.get_ref().clone();
        let reader = ChunkReader::new(data, size as u64, CHUNK_SIZE);

        // WHEN: Reading every window
        let chunks = collect_chunks(reader).await;

        // THEN: Ranges are contiguous, full except the last, and reassemble the source
        let mut next_start = 0u64;
        let mut reassembled = Vec::with_capacity(size);
        for (index, chunk) in chunks.iter().enumerate() {
            let range = chunk.content_range();
            assert_eq!(range.start, next_start, "size {size}: gap or overlap");
            assert_eq!(range.end, range.start + chunk.len() as u64 - 1);
            assert_eq!(range.total, size as u64);
            if index + 1 < chunks.len() {
                assert_eq!(chunk.len(), CHUNK_SIZE, "size {size}: short inner window");
            }
            next_start = range.end + 1;
            reassembled.extend(chunk.clone().into_data());
        }
        assert_eq!(next_start, size as u64);
        assert_eq!(reassembled, expected);
    }
}

/// **VALUE**: Verifies that short reads are accumulated into full windows.
///
/// **WHY THIS MATTERS**: A single `read` may return fewer bytes than asked for. Sending
/// each short read as its own window would break the multiple-of-320-KiB rule.
///
/// **BUG THIS CATCHES**: Would catch a reader that issues one `read` per window.
#[tokio::test]
async fn given_trickling_source_when_chunked_then_windows_are_still_full() {
    // GIVEN: A source that returns at most 1000 bytes per read
    let size = CHUNK_SIZE + 10;
    let trickle = TrickleReader {
        data: source(size).into_inner(),
        position: 0,
        max_read: 1000,
    };
    let reader = ChunkReader::new(trickle, size as u64, CHUNK_SIZE);

    // WHEN: Reading every window
    let chunks = collect_chunks(reader).await;

    // THEN: One full window and one 10-byte tail
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].len(), CHUNK_SIZE);
    assert_eq!(chunks[1].len(), 10);
}

/// **VALUE**: Verifies that reading stops at the declared total even if the source grew.
///
/// **WHY THIS MATTERS**: The session was opened for a fixed size; bytes past it would
/// produce a range beyond the total and get rejected.
///
/// **BUG THIS CATCHES**: Would catch removal of the read bound.
#[tokio::test]
async fn given_source_longer_than_declared_when_chunked_then_stops_at_total() {
    // GIVEN: 200 bytes available but 100 declared
    let reader = ChunkReader::new(source(200), 100, CHUNK_SIZE);

    // WHEN: Reading every window
    let chunks = collect_chunks(reader).await;

    // THEN: Exactly the declared bytes are produced
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].content_range().to_string(), "bytes 0-99/100");
}

#[tokio::test]
async fn given_zero_chunk_size_when_reader_created_then_uses_default() {
    let reader = ChunkReader::new(source(10), 10, 0);
    assert_eq!(reader.chunk_size(), CHUNK_SIZE);
    assert_eq!(reader.total_size(), 10);
}

/// **VALUE**: Verifies that a source shorter than declared ends the windows early
/// at the short offset.
///
/// **WHY THIS MATTERS**: A file that shrank after it was stat'ed must leave the reader
/// short of its total, so the upload can report the truncation instead of success.
///
/// **BUG THIS CATCHES**: Would catch zero-padding of the last window up to the
/// declared size, or an offset that advances past the bytes actually read.
#[tokio::test]
async fn given_source_shorter_than_declared_when_chunked_then_stops_at_short_offset() {
    // GIVEN: 1000 bytes available but 4000 declared
    let mut reader = ChunkReader::new(source(1000), 4000, CHUNK_SIZE);

    // WHEN: Reading until the reader is exhausted
    let first = reader.next_chunk().await.unwrap().unwrap();
    let second = reader.next_chunk().await.unwrap();

    // THEN: One short window framed against the declared total, then nothing
    assert_eq!(first.len(), 1000);
    assert_eq!(first.content_range().to_string(), "bytes 0-999/4000");
    assert!(!first.is_last());
    assert!(second.is_none());
    assert_eq!(reader.offset(), 1000);
    assert!(reader.offset() < reader.total_size());
}
