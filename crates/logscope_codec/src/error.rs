//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Unexpected end of input.
    #[error("unexpected end of input: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        /// Bytes the decoder needed.
        needed: usize,
        /// Bytes that were left.
        available: usize,
    },

    /// A value cannot be represented in the requested encoding.
    #[error("value out of range for {encoding}: {value}")]
    OutOfRange {
        /// Name of the encoding.
        encoding: &'static str,
        /// The rejected value.
        value: i64,
    },
}

impl CodecError {
    /// Create an unexpected end of input error.
    pub fn unexpected_eof(needed: usize, available: usize) -> Self {
        Self::UnexpectedEof { needed, available }
    }

    /// Create an out of range error.
    pub fn out_of_range(encoding: &'static str, value: i64) -> Self {
        Self::OutOfRange { encoding, value }
    }
}
