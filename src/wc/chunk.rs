use crate::common::io::{ByteSource, read_full_at};

use super::error::{Result, WcError};
use super::plan::ChunkRange;
use super::scan::{CharTally, count_lines, count_word_starts};

/// Size of the sub-buffer each task reads its chunk through.
pub const READ_BUF_SIZE: usize = 1024 * 1024;

/// What `chars` counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountMode {
    /// One character per byte.
    #[default]
    Bytes,
    /// One character per decoded Unicode scalar value; each malformed
    /// sequence counts as one character.
    Chars,
}

/// Counts for one chunk scanned in isolation.
///
/// `words` counts a word cut by either chunk edge as a whole word; the
/// reducer uses `first_byte`/`last_byte` to undo that. Both are `None` only
/// for an empty chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialCount {
    pub words: u64,
    pub lines: u64,
    pub chars: u64,
    pub bytes: u64,
    pub first_byte: Option<u8>,
    pub last_byte: Option<u8>,
}

impl PartialCount {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.first_byte.is_none()
    }
}

/// Incremental scanner for one chunk, fed buffer by buffer in file order.
#[derive(Debug, Clone)]
pub(crate) struct ChunkScanner {
    partial: PartialCount,
    prev_delim: u8,
    tally: Option<CharTally>,
}

impl ChunkScanner {
    pub(crate) fn new(mode: CountMode) -> Self {
        Self {
            partial: PartialCount::default(),
            prev_delim: 1,
            tally: match mode {
                CountMode::Bytes => None,
                CountMode::Chars => Some(CharTally::new()),
            },
        }
    }

    pub(crate) fn feed(&mut self, data: &[u8]) {
        let (Some(&first), Some(&last)) = (data.first(), data.last()) else {
            return;
        };
        let p = &mut self.partial;
        p.first_byte.get_or_insert(first);
        p.last_byte = Some(last);
        p.bytes += data.len() as u64;
        p.lines += count_lines(data);
        p.words += count_word_starts(data, &mut self.prev_delim);
        match self.tally.as_mut() {
            Some(tally) => tally.feed(data),
            None => p.chars += data.len() as u64,
        }
    }

    pub(crate) fn finish(self) -> PartialCount {
        let mut partial = self.partial;
        if let Some(tally) = &self.tally {
            partial.chars = tally.finish();
        }
        partial
    }
}

/// Count one chunk of `source`, reading it in [`READ_BUF_SIZE`] pieces via
/// positioned reads.
///
/// Touches nothing but its own buffer and result. A read error, or the
/// source ending before `range.end()`, fails the chunk.
pub fn count_chunk<S: ByteSource + ?Sized>(
    range: ChunkRange,
    source: &S,
    mode: CountMode,
) -> Result<PartialCount> {
    let mut scanner = ChunkScanner::new(mode);
    let buf_len = range.size.min(READ_BUF_SIZE as u64) as usize;
    let mut buf = vec![0u8; buf_len];

    let mut done = 0u64;
    while done < range.size {
        let want = (range.size - done).min(buf_len as u64) as usize;
        let offset = range.offset + done;
        let n = read_full_at(source, &mut buf[..want], offset)
            .map_err(|source| WcError::Read { offset, source })?;
        if n < want {
            return Err(WcError::ShortRead {
                offset,
                expected: want as u64,
                actual: n as u64,
            });
        }
        scanner.feed(&buf[..n]);
        done += n as u64;
    }

    Ok(scanner.finish())
}

/// Count an in-memory slice in one unchunked pass.
pub fn count_slice(data: &[u8], mode: CountMode) -> PartialCount {
    let mut scanner = ChunkScanner::new(mode);
    scanner.feed(data);
    scanner.finish()
}
