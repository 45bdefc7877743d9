//! Compressed (variable-width) non-negative integers.
//!
//! The width of a value is selected by the top bits of its first byte:
//!
//! ```text
//! int:   00xxxxxx                      1 byte,  0 ..= 0x3f
//!        01xxxxxx b                    2 bytes, 0 ..= 0x3fff
//!        1xxxxxxx b b b                4 bytes, 0 ..= 0x7fff_ffff
//!
//! long:  00xxxxxx b                    2 bytes, 0 ..= 0x3fff
//!        01xxxxxx b b b                4 bytes, 0 ..= 0x3fff_ffff
//!        1xxxxxxx b b b b b b b        8 bytes, 0 ..= i64::MAX
//! ```
//!
//! The layout is fixed by the existing on-disk format.

use crate::error::{CodecError, CodecResult};
use crate::reader::ByteReader;

/// Largest value with a one-byte int encoding.
pub const MAX_ONE_BYTE_INT: i32 = 0x3f;
/// Largest value with a two-byte int or long encoding.
pub const MAX_TWO_BYTE: i64 = 0x3fff;
/// Largest value with a four-byte long encoding.
pub const MAX_FOUR_BYTE_LONG: i64 = 0x3fff_ffff;

/// Reads a compressed int.
///
/// On error the reader is left where it was.
pub fn read_compressed_int(reader: &mut ByteReader<'_>) -> CodecResult<i32> {
    let rest = reader.remaining();
    let first = *rest.first().ok_or(CodecError::unexpected_eof(1, 0))?;

    let width = if first & !0x3f == 0 {
        1
    } else if first & 0x80 == 0 {
        2
    } else {
        4
    };
    let bytes = reader.read_bytes(width)?;

    let value = match width {
        1 => i32::from(first),
        2 => (i32::from(first & 0x3f) << 8) | i32::from(bytes[1]),
        _ => {
            (i32::from(first & 0x7f) << 24)
                | (i32::from(bytes[1]) << 16)
                | (i32::from(bytes[2]) << 8)
                | i32::from(bytes[3])
        }
    };
    Ok(value)
}

/// Reads a compressed long.
///
/// On error the reader is left where it was.
pub fn read_compressed_long(reader: &mut ByteReader<'_>) -> CodecResult<i64> {
    let rest = reader.remaining();
    let first = *rest.first().ok_or(CodecError::unexpected_eof(2, 0))?;

    let (width, mask) = if first & !0x3f == 0 {
        (2, 0x3f)
    } else if first & 0x80 == 0 {
        (4, 0x3f)
    } else {
        (8, 0x7f)
    };
    let bytes = reader.read_bytes(width)?;

    let value = bytes[1..]
        .iter()
        .fold(i64::from(first & mask), |acc, &b| (acc << 8) | i64::from(b));
    Ok(value)
}

/// Appends the compressed form of `value` to `buf`.
///
/// # Errors
///
/// Returns an error if `value` is negative.
pub fn write_compressed_int(buf: &mut Vec<u8>, value: i32) -> CodecResult<usize> {
    if value < 0 {
        return Err(CodecError::out_of_range("compressed int", i64::from(value)));
    }
    let v = value as u32;

    if value <= MAX_ONE_BYTE_INT {
        buf.push(v as u8);
        Ok(1)
    } else if i64::from(value) <= MAX_TWO_BYTE {
        buf.push(((v >> 8) as u8) | 0x40);
        buf.push(v as u8);
        Ok(2)
    } else {
        let mut bytes = v.to_be_bytes();
        bytes[0] |= 0x80;
        buf.extend_from_slice(&bytes);
        Ok(4)
    }
}

/// Appends the compressed form of `value` to `buf`.
///
/// # Errors
///
/// Returns an error if `value` is negative.
pub fn write_compressed_long(buf: &mut Vec<u8>, value: i64) -> CodecResult<usize> {
    if value < 0 {
        return Err(CodecError::out_of_range("compressed long", value));
    }
    let v = value as u64;

    if value <= MAX_TWO_BYTE {
        buf.extend_from_slice(&(v as u16).to_be_bytes());
        Ok(2)
    } else if value <= MAX_FOUR_BYTE_LONG {
        let mut bytes = (v as u32).to_be_bytes();
        bytes[0] |= 0x40;
        buf.extend_from_slice(&bytes);
        Ok(4)
    } else {
        let mut bytes = v.to_be_bytes();
        bytes[0] |= 0x80;
        buf.extend_from_slice(&bytes);
        Ok(8)
    }
}
