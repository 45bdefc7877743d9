//! Big-endian byte reader over a borrowed slice.

use crate::error::{CodecError, CodecResult};

/// A forward-only reader over a byte slice.
///
/// All multi-byte integers are big-endian, matching the on-disk log format.
/// A failed read does not advance the position.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a new reader for the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current position within the slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Check if all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Read one unsigned byte.
    #[inline]
    pub fn read_u8(&mut self) -> CodecResult<u8> {
        if self.pos >= self.data.len() {
            return Err(CodecError::unexpected_eof(1, 0));
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Read exactly `len` bytes.
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        let available = self.data.len() - self.pos;
        if len > available {
            return Err(CodecError::unexpected_eof(len, available));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a big-endian u16.
    pub fn read_u16(&mut self) -> CodecResult<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    /// Read a big-endian i32.
    pub fn read_i32(&mut self) -> CodecResult<i32> {
        self.read_array().map(i32::from_be_bytes)
    }

    /// Read a big-endian i64.
    pub fn read_i64(&mut self) -> CodecResult<i64> {
        self.read_array().map(i64::from_be_bytes)
    }

    /// Read a big-endian u64.
    pub fn read_u64(&mut self) -> CodecResult<u64> {
        self.read_array().map(u64::from_be_bytes)
    }
}
