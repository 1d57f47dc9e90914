use std::num::NonZeroUsize;

use log::debug;
use rayon::prelude::*;

use crate::common::io::ByteSource;

use super::chunk::{CountMode, PartialCount, count_chunk};
use super::error::{Result, WcError};
use super::plan::{SINGLE_CHUNK_THRESHOLD, align_to_char_starts, plan_with_threshold};
use super::reduce::{FinalCount, merge};

/// How to count one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountOptions {
    /// Number of chunks, and of worker threads, for inputs above `threshold`.
    pub parallelism: usize,
    pub mode: CountMode,
    /// Inputs smaller than this are counted as one chunk.
    pub threshold: u64,
}

impl Default for CountOptions {
    fn default() -> Self {
        Self {
            parallelism: available_parallelism(),
            mode: CountMode::Bytes,
            threshold: SINGLE_CHUNK_THRESHOLD,
        }
    }
}

/// Number of CPUs the process may use, at least 1.
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Count `source` in parallel chunks and stitch the results.
///
/// Plans the chunks (realigned to character starts in [`CountMode::Chars`]),
/// counts each on its own worker of a pool sized to the plan, waits for all
/// of them and merges the results in offset order. The first failing chunk
/// fails the whole count.
pub fn count_source<S: ByteSource + ?Sized>(
    source: &S,
    options: &CountOptions,
) -> Result<FinalCount> {
    let total = source.size().map_err(|source| WcError::Probe { source })?;

    let mut ranges = plan_with_threshold(total, options.parallelism, options.threshold);
    if options.mode == CountMode::Chars {
        ranges = align_to_char_starts(&ranges, source)?;
    }
    debug!(
        "counting {} bytes in {} chunk(s), mode {:?}",
        total,
        ranges.len(),
        options.mode
    );

    let partials: Vec<PartialCount> = if let [range] = ranges.as_slice() {
        vec![count_chunk(*range, source, options.mode)?]
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(ranges.len())
            .thread_name(|i| format!("pwc-chunk-{}", i))
            .build()?;
        // Indexed collect keeps offset order whatever order tasks finish in.
        pool.install(|| {
            ranges
                .par_iter()
                .map(|&range| count_chunk(range, source, options.mode))
                .collect::<Result<Vec<_>>>()
        })?
    };

    Ok(merge(&partials))
}
