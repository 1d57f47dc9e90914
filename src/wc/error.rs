use std::io;

use thiserror::Error;

/// Errors from counting a byte source.
///
/// Any of these aborts the whole count: there is no partial result and no retry.
#[derive(Debug, Error)]
pub enum WcError {
    /// The size of the source could not be determined.
    #[error("cannot determine input size: {source}")]
    Probe { source: io::Error },

    /// A positioned read failed.
    #[error("read failed at offset {offset}: {source}")]
    Read { offset: u64, source: io::Error },

    /// The source ended before its declared size.
    #[error("unexpected end of input at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: u64,
        actual: u64,
    },

    #[error("cannot start counting threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl WcError {
    /// The underlying I/O error, if this error carries one.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            WcError::Probe { source } | WcError::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WcError>;
