use crate::common::io::{ByteSource, read_full_at};

use super::error::{Result, WcError};
use super::scan::is_utf8_continuation;

/// Inputs smaller than this are counted as a single chunk.
/// Below ~16MB the cost of spinning up workers outweighs the parallel scan.
pub const SINGLE_CHUNK_THRESHOLD: u64 = 4000 * 4000;

/// A contiguous byte range of the input, assigned to one counting task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkRange {
    pub offset: u64,
    pub size: u64,
}

impl ChunkRange {
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    /// One past the last byte of the range.
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Split `total_size` bytes into `parallelism` ranges, or a single range for
/// inputs below [`SINGLE_CHUNK_THRESHOLD`].
pub fn plan(total_size: u64, parallelism: usize) -> Vec<ChunkRange> {
    plan_with_threshold(total_size, parallelism, SINGLE_CHUNK_THRESHOLD)
}

/// [`plan`] with an explicit single-chunk threshold.
///
/// Ranges are ascending, contiguous and sum to `total_size`. The last range
/// absorbs the division remainder. An empty input yields one empty range.
pub fn plan_with_threshold(total_size: u64, parallelism: usize, threshold: u64) -> Vec<ChunkRange> {
    let parallelism = parallelism.max(1) as u64;
    if total_size == 0 || total_size < threshold || parallelism == 1 {
        return vec![ChunkRange::new(0, total_size)];
    }

    let chunk_size = total_size / parallelism;
    let remainder = total_size % parallelism;

    (0..parallelism)
        .map(|i| {
            let size = if i == parallelism - 1 {
                chunk_size + remainder
            } else {
                chunk_size
            };
            ChunkRange::new(i * chunk_size, size)
        })
        .collect()
}

/// Move every interior boundary forward so no chunk starts inside a
/// multi-byte sequence.
///
/// A boundary skips at most three continuation bytes: a decoder never folds a
/// non-continuation byte into the preceding sequence, and no sequence has more
/// than three continuation bytes, so the realigned chunks decode to the same
/// number of characters as the whole input. Only those few boundary bytes are
/// read. Ranges may become empty; the total size is unchanged.
pub fn align_to_char_starts<S: ByteSource + ?Sized>(
    ranges: &[ChunkRange],
    source: &S,
) -> Result<Vec<ChunkRange>> {
    let Some((first, rest)) = ranges.split_first() else {
        return Ok(Vec::new());
    };
    if rest.is_empty() {
        return Ok(vec![*first]);
    }

    let end = ranges[ranges.len() - 1].end();
    let mut bounds = Vec::with_capacity(ranges.len() + 1);
    bounds.push(first.offset);

    for range in rest {
        let prev = bounds[bounds.len() - 1];
        let mut at = range.offset.max(prev);
        let mut peek = [0u8; 3];
        let want = (end - at).min(3) as usize;
        let n = read_full_at(source, &mut peek[..want], at)
            .map_err(|source| WcError::Read { offset: at, source })?;
        at += peek[..n]
            .iter()
            .take_while(|&&b| is_utf8_continuation(b))
            .count() as u64;
        bounds.push(at);
    }
    bounds.push(end);

    Ok(bounds
        .windows(2)
        .map(|w| ChunkRange::new(w[0], w[1] - w[0]))
        .collect())
}
