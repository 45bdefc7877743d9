//! Buffered sequential cursor over a storage backend.

use crate::error::{CoreError, CoreResult};
use logscope_storage::StorageBackend;

/// Read buffer size for sequential reads.
/// Reads are chunked to keep syscalls down while memory stays bounded.
const READ_BUFFER_SIZE: usize = 64 * 1024; // 64 KB

/// A forward-only cursor over a log held in a [`StorageBackend`].
///
/// Unlike the backend's `read_at`, the cursor never fails because the
/// stream ended: [`take`](Self::take) returns however many bytes were left,
/// which lets the frame decoder tell a clean end from a truncated frame.
///
/// # Buffering
///
/// - Small reads are served from a fixed-size buffer
/// - A read larger than the buffer grows it to fit
/// - Consumed bytes are discarded on the next refill
pub struct LogCursor<'a> {
    backend: &'a dyn StorageBackend,
    /// Total size of the log.
    total_size: u64,
    /// Offset in the log of the next unread byte.
    position: u64,
    /// Buffered bytes; `buffer[buffer_pos]` sits at `position`.
    buffer: Vec<u8>,
    buffer_pos: usize,
}

impl<'a> LogCursor<'a> {
    /// Creates a cursor positioned at `start_offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend size cannot be determined or the
    /// offset lies beyond the end of the log.
    pub fn new(backend: &'a dyn StorageBackend, start_offset: u64) -> CoreResult<Self> {
        let total_size = backend.size()?;
        if start_offset > total_size {
            return Err(CoreError::InvalidStartOffset {
                offset: start_offset,
                size: total_size,
            });
        }

        Ok(Self {
            backend,
            total_size,
            position: start_offset,
            buffer: Vec::with_capacity(READ_BUFFER_SIZE),
            buffer_pos: 0,
        })
    }

    /// Offset in the log of the next unread byte.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Bytes left between the cursor and the end of the log.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.total_size - self.position
    }

    /// Returns true if every byte has been consumed.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.total_size
    }

    fn buffered(&self) -> usize {
        self.buffer.len() - self.buffer_pos
    }

    /// Buffers at least `min_bytes` bytes, or everything left if the log is
    /// shorter. Returns the number of buffered bytes.
    fn ensure_buffered(&mut self, min_bytes: usize) -> CoreResult<usize> {
        let available = self.buffered();
        if available >= min_bytes {
            return Ok(available);
        }

        // Drop consumed bytes
        if self.buffer_pos > 0 {
            self.buffer.drain(..self.buffer_pos);
            self.buffer_pos = 0;
        }

        let read_offset = self.position + available as u64;
        let unbuffered = self.total_size - read_offset;
        let wanted = (min_bytes - available).max(READ_BUFFER_SIZE.saturating_sub(available));
        let to_read = usize::try_from(unbuffered).map_or(wanted, |left| wanted.min(left));

        if to_read > 0 {
            let data = self.backend.read_at(read_offset, to_read)?;
            self.buffer.extend_from_slice(&data);
        }

        Ok(self.buffered())
    }

    /// Consumes up to `len` bytes.
    ///
    /// Returns fewer than `len` bytes only when the log ends first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    pub fn take(&mut self, len: usize) -> CoreResult<Vec<u8>> {
        let available = self.ensure_buffered(len)?;
        let n = len.min(available);

        let bytes = self.buffer[self.buffer_pos..self.buffer_pos + n].to_vec();
        self.buffer_pos += n;
        self.position += n as u64;

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logscope_storage::InMemoryBackend;

    #[test]
    fn take_sequential() {
        let backend = InMemoryBackend::with_data(b"hello world".to_vec());
        let mut cursor = LogCursor::new(&backend, 0).unwrap();

        assert_eq!(cursor.take(5).unwrap(), b"hello".to_vec());
        assert_eq!(cursor.position(), 5);
        assert_eq!(cursor.take(1).unwrap(), b" ".to_vec());
        assert_eq!(cursor.take(5).unwrap(), b"world".to_vec());
        assert!(cursor.is_at_end());
    }

    #[test]
    fn take_short_at_end() {
        let backend = InMemoryBackend::with_data(vec![1, 2, 3]);
        let mut cursor = LogCursor::new(&backend, 1).unwrap();

        assert_eq!(cursor.take(8).unwrap(), vec![2, 3]);
        assert!(cursor.take(4).unwrap().is_empty());
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn start_offset_beyond_end_fails() {
        let backend = InMemoryBackend::with_data(vec![0; 10]);
        let result = LogCursor::new(&backend, 11);
        assert!(matches!(
            result,
            Err(CoreError::InvalidStartOffset { offset: 11, size: 10 })
        ));
    }

    #[test]
    fn start_offset_at_end_is_empty() {
        let backend = InMemoryBackend::with_data(vec![0; 10]);
        let mut cursor = LogCursor::new(&backend, 10).unwrap();
        assert_eq!(cursor.remaining(), 0);
        assert!(cursor.take(4).unwrap().is_empty());
    }

    #[test]
    fn reads_larger_than_buffer() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let backend = InMemoryBackend::with_data(data.clone());
        let mut cursor = LogCursor::new(&backend, 0).unwrap();

        assert_eq!(cursor.take(3).unwrap(), data[..3].to_vec());
        let big = cursor.take(150_000).unwrap();
        assert_eq!(big, data[3..150_003].to_vec());
        let rest = cursor.take(usize::MAX).unwrap();
        assert_eq!(rest, data[150_003..].to_vec());
        assert!(cursor.is_at_end());
    }

    #[test]
    fn many_small_reads_cross_buffer_boundary() {
        let data: Vec<u8> = (0..(READ_BUFFER_SIZE as u32 * 2 + 7))
            .map(|i| i as u8)
            .collect();
        let backend = InMemoryBackend::with_data(data.clone());
        let mut cursor = LogCursor::new(&backend, 0).unwrap();

        let mut collected = Vec::new();
        loop {
            let chunk = cursor.take(12).unwrap();
            if chunk.is_empty() {
                break;
            }
            collected.extend(chunk);
        }
        assert_eq!(collected, data);
    }
}
