use std::ops::AddAssign;

use super::chunk::PartialCount;
use super::delim::is_delimiter;

/// Final counts for one input.
///
/// `chars` follows the count mode; `bytes` is always the raw byte total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FinalCount {
    pub words: u64,
    pub lines: u64,
    pub chars: u64,
    pub bytes: u64,
}

/// Sums independent inputs (the "total" row). Not a boundary merge.
impl AddAssign for FinalCount {
    fn add_assign(&mut self, rhs: Self) {
        self.words += rhs.words;
        self.lines += rhs.lines;
        self.chars += rhs.chars;
        self.bytes += rhs.bytes;
    }
}

/// Combine partial counts, given in ascending offset order, into the count
/// a single left-to-right scan would produce.
///
/// Lines, chars and bytes add up directly. Words are summed, then one is
/// taken back for every boundary where the previous non-empty chunk ends in a
/// non-delimiter and the next non-empty chunk starts with one: both sides
/// counted the same word. Empty chunks are skipped when pairing neighbours.
pub fn merge(partials: &[PartialCount]) -> FinalCount {
    let mut total = FinalCount::default();
    let mut prev_last: Option<u8> = None;

    for p in partials {
        total.lines += p.lines;
        total.chars += p.chars;
        total.bytes += p.bytes;
        total.words += p.words;

        if let (Some(last), Some(first)) = (prev_last, p.first_byte) {
            if !is_delimiter(last) && !is_delimiter(first) {
                total.words = total.words.saturating_sub(1);
            }
        }
        if p.last_byte.is_some() {
            prev_last = p.last_byte;
        }
    }
    total
}
