//! # logscope Codec
//!
//! Primitive encodings of the write-ahead log format.
//!
//! This crate provides the bit-exact building blocks the log reader decodes:
//! - [`LogPosition`]: a 64-bit instant split into file number and offset
//! - Format ids: two-byte type tags in front of stored objects
//! - Compressed numbers: variable-width non-negative ints and longs
//! - [`ByteReader`]: a big-endian cursor over a payload
//!
//! Writers exist for every reader so that test fixtures can be built
//! byte-for-byte.
//!
//! ## Usage
//!
//! ```
//! use logscope_codec::{read_compressed_long, write_compressed_long, ByteReader};
//!
//! let mut buf = Vec::new();
//! write_compressed_long(&mut buf, 1_000_000).unwrap();
//!
//! let mut reader = ByteReader::new(&buf);
//! assert_eq!(read_compressed_long(&mut reader).unwrap(), 1_000_000);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod compressed;
mod error;
mod format_id;
mod position;
mod reader;

pub use compressed::{
    read_compressed_int, read_compressed_long, write_compressed_int, write_compressed_long,
    MAX_FOUR_BYTE_LONG, MAX_ONE_BYTE_INT, MAX_TWO_BYTE,
};
pub use error::{CodecError, CodecResult};
pub use format_id::{
    read_format_id, write_format_id, FILE_STREAM_LOG_FILE, FORMAT_ID_SIZE, LOG_RECORD,
    NULL_FORMAT_ID, RAW_STORE_XACT_ID,
};
pub use position::LogPosition;
pub use reader::ByteReader;
