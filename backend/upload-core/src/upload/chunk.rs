//! Fixed-size byte windows over a local file.
//!
//! Windows are contiguous, non-overlapping and cover `[0, total_size)` in order.
//! Every window is full except possibly the last. Reading is bounded to the size
//! observed when the file was stat'ed, so a growing file never produces a range
//! past the declared total.

use crate::CHUNK_SIZE;

use std::fmt;
use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, Take};

/// Byte range of one chunk in `Content-Range` form: `bytes {start}-{end}/{total}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    pub start: u64,
    /// Inclusive.
    pub end: u64,
    pub total: u64,
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// One window of the source file. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    offset: u64,
    total_size: u64,
    data: Vec<u8>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Whether this window ends exactly at the end of the file.
    pub fn is_last(&self) -> bool {
        self.offset + self.data.len() as u64 == self.total_size
    }

    pub fn content_range(&self) -> ContentRange {
        ContentRange {
            start: self.offset,
            end: self.offset + self.data.len() as u64 - 1,
            total: self.total_size,
        }
    }
}

/// Reads a source in fixed-size windows, tracking the running offset.
pub struct ChunkReader<R> {
    reader: Take<R>,
    chunk_size: usize,
    offset: u64,
    total_size: u64,
}

impl<R> ChunkReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Wrap `reader`, reading at most `total_size` bytes.
    ///
    /// If `chunk_size` is 0, [`CHUNK_SIZE`] is used.
    pub fn new(reader: R, total_size: u64, chunk_size: usize) -> Self {
        let chunk_size = if chunk_size == 0 {
            CHUNK_SIZE
        } else {
            chunk_size
        };

        Self {
            reader: reader.take(total_size),
            chunk_size,
            offset: 0,
            total_size,
        }
    }

    /// Read the next window. Returns `None` once a read yields no further bytes.
    ///
    /// Short reads are retried until the window is full, so only the final
    /// window can be shorter than the chunk size.
    pub async fn next_chunk(&mut self) -> io::Result<Option<Chunk>> {
        let remaining = self.total_size.saturating_sub(self.offset);
        let window = remaining.min(self.chunk_size as u64) as usize;

        let mut buffer = vec![0u8; window];
        let mut filled = 0;
        while filled < window {
            let n = self.reader.read(&mut buffer[filled..]).await?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled == 0 {
            return Ok(None);
        }
        buffer.truncate(filled);

        let chunk = Chunk {
            offset: self.offset,
            total_size: self.total_size,
            data: buffer,
        };
        self.offset += filled as u64;

        Ok(Some(chunk))
    }

    /// Bytes handed out so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}
