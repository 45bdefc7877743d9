//! In-memory storage backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;

/// An in-memory storage backend.
///
/// This backend holds the whole log in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Logs received over a pipe or already loaded by the caller
///
/// # Example
///
/// ```rust
/// use logscope_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::with_data(b"test data".to_vec());
/// assert_eq!(backend.size().unwrap(), 9);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<Vec<u8>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with pre-existing data.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Returns a copy of all data in the backend.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let data = self.data.read();
        let size = data.len() as u64;
        let offset_usize = offset as usize;
        let end = offset_usize.saturating_add(len);

        if offset > size || end > data.len() {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        Ok(data[offset_usize..end].to_vec())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.read().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_backend() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(backend.read_at(0, 0).unwrap().is_empty());
    }

    #[test]
    fn read_partial() {
        let backend = InMemoryBackend::with_data(b"hello world".to_vec());
        assert_eq!(&backend.read_at(0, 5).unwrap(), b"hello");
        assert_eq!(&backend.read_at(6, 5).unwrap(), b"world");
    }

    #[test]
    fn read_past_end_fails() {
        let backend = InMemoryBackend::with_data(b"hello".to_vec());
        let result = backend.read_at(3, 5);
        assert!(matches!(
            result,
            Err(StorageError::ReadPastEnd {
                offset: 3,
                len: 5,
                size: 5
            })
        ));
    }

    #[test]
    fn offset_beyond_size_fails() {
        let backend = InMemoryBackend::with_data(b"hello".to_vec());
        assert!(backend.read_at(6, 0).is_err());
    }

    #[test]
    fn data_returns_copy() {
        let backend = InMemoryBackend::with_data(vec![1, 2, 3]);
        assert_eq!(backend.data(), vec![1, 2, 3]);
    }

    proptest! {
        #[test]
        fn read_at_matches_slice(data in prop::collection::vec(any::<u8>(), 0..256), a in 0usize..256, b in 0usize..256) {
            let backend = InMemoryBackend::with_data(data.clone());
            let (start, end) = if a <= b { (a, b) } else { (b, a) };
            let result = backend.read_at(start as u64, end - start);
            if end <= data.len() {
                prop_assert_eq!(result.unwrap(), data[start..end].to_vec());
            } else {
                prop_assert!(result.is_err());
            }
        }
    }
}
