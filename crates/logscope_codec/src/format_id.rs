//! Format identifiers.
//!
//! Every stored object starts with a format id naming its type. Format ids
//! are written as a two-byte unsigned big-endian integer.

use crate::error::CodecResult;
use crate::reader::ByteReader;

/// Encoded size of a format id in bytes.
pub const FORMAT_ID_SIZE: usize = 2;

/// Format id written for an absent (null) object.
pub const NULL_FORMAT_ID: u16 = 0;

/// Format id at the start of every log file header.
pub const FILE_STREAM_LOG_FILE: u16 = 128;

/// Format id at the start of every log record payload.
pub const LOG_RECORD: u16 = 129;

/// Format id of a raw-store transaction identifier.
pub const RAW_STORE_XACT_ID: u16 = 147;

/// Reads a format id.
pub fn read_format_id(reader: &mut ByteReader<'_>) -> CodecResult<u16> {
    reader.read_u16()
}

/// Appends an encoded format id to `buf`.
pub fn write_format_id(buf: &mut Vec<u8>, format_id: u16) {
    buf.extend_from_slice(&format_id.to_be_bytes());
}
