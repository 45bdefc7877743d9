//! Error types for logscope core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while reading a log.
///
/// Field and operation errors are absorbed by the payload decoder and
/// reported inline. Frame and stream errors stop the walk and end up in
/// the report's error node. Report errors abort the walk itself.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] logscope_storage::StorageError),

    /// Codec error.
    #[error("codec error: {0}")]
    Codec(#[from] logscope_codec::CodecError),

    /// I/O error while writing the report.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended in the middle of a frame.
    #[error("truncated frame at offset {offset}: expected {expected} bytes, {available} available")]
    TruncatedFrame {
        /// Byte offset of the frame in the log.
        offset: u64,
        /// Bytes the frame still needed.
        expected: usize,
        /// Bytes that were actually available.
        available: usize,
    },

    /// A frame declares a length no frame can have.
    #[error("invalid frame length {length} at offset {offset}")]
    InvalidFrameLength {
        /// Byte offset of the frame in the log.
        offset: u64,
        /// The forward length read from the log.
        length: i32,
    },

    /// The stream ended inside the file header.
    #[error("truncated file header: expected {expected} bytes, {available} available")]
    TruncatedHeader {
        /// Size of the file header.
        expected: usize,
        /// Bytes that were actually available.
        available: usize,
    },

    /// A payload sub-field could not be decoded.
    #[error("cannot decode {field}: {message}")]
    FieldDecode {
        /// Name of the field.
        field: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// The payload decoder could not render an operation.
    #[error("cannot decode operation: {message}")]
    OperationDecode {
        /// Description of the failure.
        message: String,
    },

    /// Decryption failed.
    #[error("decryption failed: {message}")]
    Decryption {
        /// Description of the failure.
        message: String,
    },

    /// The report writer closed more tags than it opened.
    #[error("unbalanced tag: close() called with no open tag")]
    UnbalancedTag,

    /// Forward and backward frame lengths differ.
    #[error("length mismatch at offset {offset}: forward length {forward}, backward length {backward}")]
    LengthMismatch {
        /// Byte offset of the frame in the log.
        offset: u64,
        /// Length before the payload.
        forward: i32,
        /// Length after the payload.
        backward: i32,
    },

    /// The file is not in the expected format.
    #[error("invalid log format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// The requested start offset lies outside the file.
    #[error("start offset {offset} is beyond the end of the log ({size} bytes)")]
    InvalidStartOffset {
        /// Requested offset.
        offset: u64,
        /// Size of the log.
        size: u64,
    },

    /// Invalid key size.
    #[error("invalid key size: expected one of {expected:?} bytes, got {actual}")]
    InvalidKeySize {
        /// Accepted sizes in bytes.
        expected: &'static [usize],
        /// Actual size in bytes.
        actual: usize,
    },
}

impl CoreError {
    /// Creates a field decode error.
    pub fn field_decode(field: &'static str, message: impl Into<String>) -> Self {
        Self::FieldDecode {
            field,
            message: message.into(),
        }
    }

    /// Creates an operation decode error.
    pub fn operation_decode(message: impl Into<String>) -> Self {
        Self::OperationDecode {
            message: message.into(),
        }
    }

    /// Creates a decryption error.
    pub fn decryption(message: impl Into<String>) -> Self {
        Self::Decryption {
            message: message.into(),
        }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates an invalid key size error.
    pub fn invalid_key_size(actual: usize, expected: &'static [usize]) -> Self {
        Self::InvalidKeySize { expected, actual }
    }

    /// Stable name of the error kind, written to the report's error node.
    #[must_use]
    pub fn classification(&self) -> &'static str {
        match self {
            Self::Storage(_) => "StorageError",
            Self::Codec(_) => "CodecError",
            Self::Io(_) => "IoError",
            Self::TruncatedFrame { .. } => "TruncatedFrame",
            Self::InvalidFrameLength { .. } => "InvalidFrameLength",
            Self::TruncatedHeader { .. } => "TruncatedHeader",
            Self::FieldDecode { .. } => "FieldDecodeError",
            Self::OperationDecode { .. } => "OperationDecodeError",
            Self::Decryption { .. } => "DecryptionError",
            Self::UnbalancedTag => "UnbalancedTagError",
            Self::LengthMismatch { .. } => "LengthMismatch",
            Self::InvalidFormat { .. } => "InvalidFormat",
            Self::InvalidStartOffset { .. } => "InvalidStartOffset",
            Self::InvalidKeySize { .. } => "InvalidKeySize",
        }
    }
}
