//! # logscope Core
//!
//! Forensic reader for write-ahead log files.
//!
//! This crate provides:
//! - Frame decoding with forward/backward length checks ([`frame`])
//! - Optional payload decryption with leading block padding ([`crypto`])
//! - Payload structure decoding behind an injected [`PayloadDecoder`]
//! - A single-pass log walk rendered as an XML report ([`LogReader`])
//!
//! The reader never modifies the log. It stops at the first frame it
//! cannot read, and everything decoded up to that point stays in the report.
//!
//! ## Example
//!
//! ```
//! use logscope_core::{DecodeDepth, FormatRegistry, LogReader, ReaderConfig, ReportWriter};
//! use logscope_storage::InMemoryBackend;
//!
//! let config = ReaderConfig::new().depth(DecodeDepth::HeaderOnly).max_records(Some(10));
//! let reader = LogReader::new(config, Box::new(FormatRegistry::builtin()));
//!
//! let mut report = ReportWriter::new(Vec::new());
//! let result = reader.walk(&InMemoryBackend::new(), &mut report).unwrap();
//!
//! // An empty file has no header.
//! assert!(result.terminal_error.is_some());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod crypto;
mod error;
pub mod frame;
pub mod payload;
mod reader;
pub mod report;

pub use config::{DecodeDepth, IntegrityPolicy, ReaderConfig};
pub use crypto::{BlockCipher, DecryptionContext, IdentityCipher};
#[cfg(feature = "encryption")]
pub use crypto::{AesCbcCipher, EncryptionKey, AES_BLOCK_SIZE};
pub use error::{CoreError, CoreResult};
pub use frame::{FrameDecoder, FrameHeader, FrameIterator, LogCursor, RecordFrame};
pub use payload::{
    decode_payload, DecodedPayload, FormatRegistry, GroupFlags, OperationDescription,
    OperationSummary, PayloadDecoder, TransactionId,
};
pub use reader::{LogReader, WalkResult, WalkState};
pub use report::ReportWriter;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
