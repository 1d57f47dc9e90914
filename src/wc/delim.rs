/// The line terminator. Only `\n` ends a line; `\r` does not.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Word-delimiter lookup table for branchless word boundary detection.
///
/// Every counting path shares this one table, so the delimiter class cannot
/// drift between the chunked and the single-pass code.
const fn make_delim_table() -> [u8; 256] {
    let mut t = [0u8; 256];
    t[0x09] = 1; // \t  horizontal tab
    t[0x0A] = 1; // \n  newline
    t[0x0B] = 1; // \v  vertical tab
    t[0x0C] = 1; // \f  form feed
    t[0x0D] = 1; // \r  carriage return
    t[0x20] = 1; //     space
    t[0x85] = 1; //     NEL (next line)
    t[0xA0] = 1; //     NBSP (no-break space)
    t
}

/// Precomputed delimiter lookup: `DELIM_TABLE[byte] == 1` if the byte
/// separates words, `0` otherwise.
pub(crate) const DELIM_TABLE: [u8; 256] = make_delim_table();

/// Is `b` a word delimiter?
#[inline]
pub fn is_delimiter(b: u8) -> bool {
    DELIM_TABLE[b as usize] == 1
}

/// Is `b` a line terminator?
#[inline]
pub fn is_line_terminator(b: u8) -> bool {
    b == LINE_TERMINATOR
}
