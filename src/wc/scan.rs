use memchr::memchr_iter;

use super::delim::{DELIM_TABLE, LINE_TERMINATOR};

/// Count newlines using SIMD-accelerated memchr.
/// Counts newline bytes (`\n`), not logical lines.
#[inline]
pub fn count_lines(data: &[u8]) -> u64 {
    memchr_iter(LINE_TERMINATOR, data).count() as u64
}

/// Count word starts in `data`, continuing from the delimiter state left by
/// the previous buffer of the same chunk.
///
/// `prev_delim` is 1 when the byte before `data` was a delimiter (or there
/// was none), 0 otherwise, and is updated to the state after the last byte.
/// Counting starts rather than ends means a word still open at the end of
/// the data has already been counted.
///
/// Branchless: the lookup table and XOR/AND avoid all branches in the hot loop.
pub fn count_word_starts(data: &[u8], prev_delim: &mut u8) -> u64 {
    let mut words = 0u64;
    let mut prev = *prev_delim;

    for &b in data {
        let curr = DELIM_TABLE[b as usize];
        // 1 only when the previous byte was a delimiter and this one is not.
        words += (prev & (curr ^ 1)) as u64;
        prev = curr;
    }
    *prev_delim = prev;
    words
}

/// Count Unicode scalar values in `data`.
///
/// Malformed input is not an error: each maximal invalid subpart (the unit
/// `String::from_utf8_lossy` replaces with one U+FFFD) counts as exactly one
/// character. A truncated sequence at the end of `data` is therefore one
/// character too.
pub fn count_chars(data: &[u8]) -> u64 {
    data.utf8_chunks()
        .map(|chunk| chunk.valid().chars().count() as u64 + u64::from(!chunk.invalid().is_empty()))
        .sum()
}

/// `10xxxxxx`: a byte that can only continue a multi-byte sequence.
#[inline]
pub fn is_utf8_continuation(b: u8) -> bool {
    (b & 0xC0) == 0x80
}

/// True if `data` is a valid-so-far prefix of a multi-byte sequence that
/// more bytes could still complete.
fn is_incomplete(data: &[u8]) -> bool {
    matches!(std::str::from_utf8(data), Err(e) if e.error_len().is_none())
}

/// Length of the incomplete multi-byte sequence at the end of `data`, if any.
/// A sequence is at most 4 bytes, so only the last 3 bytes can hold one.
fn incomplete_suffix_len(data: &[u8]) -> usize {
    let floor = data.len().saturating_sub(3);
    for start in (floor..data.len()).rev() {
        if !is_utf8_continuation(data[start]) {
            return if is_incomplete(&data[start..]) {
                data.len() - start
            } else {
                0
            };
        }
    }
    0
}

/// Streaming scalar-value counter.
///
/// Sequences cut by a buffer edge are held back (at most 3 bytes, 4 once
/// extended) and decoded together with the next buffer, so feeding a slice
/// in pieces gives the same total as `count_chars` on the whole slice.
#[derive(Debug, Clone, Default)]
pub struct CharTally {
    chars: u64,
    pending: [u8; 4],
    pending_len: usize,
}

impl CharTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, mut data: &[u8]) {
        if self.pending_len > 0 {
            while is_incomplete(&self.pending[..self.pending_len]) {
                match data.split_first() {
                    None => return,
                    Some((&b, rest)) if is_utf8_continuation(b) => {
                        self.pending[self.pending_len] = b;
                        self.pending_len += 1;
                        data = rest;
                    }
                    Some(_) => break,
                }
            }
            self.chars += count_chars(&self.pending[..self.pending_len]);
            self.pending_len = 0;
        }

        let tail = incomplete_suffix_len(data);
        let (body, rest) = data.split_at(data.len() - tail);
        self.chars += count_chars(body);
        self.pending[..tail].copy_from_slice(rest);
        self.pending_len = tail;
    }

    /// Characters seen so far, counting a dangling partial sequence as one.
    pub fn finish(&self) -> u64 {
        self.chars + u64::from(self.pending_len > 0)
    }
}
