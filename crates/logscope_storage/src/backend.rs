//! Storage backend trait definition.

use crate::error::StorageResult;

/// A read-only storage backend holding one log file.
///
/// Storage backends are **opaque byte stores**. The log reader owns all
/// format interpretation - backends do not understand frames or payloads.
///
/// # Invariants
///
/// - `read_at` returns exactly `len` bytes or fails; it never returns a short read
/// - `size` is stable for the lifetime of the backend
/// - Backends must be `Send + Sync`
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For log files on disk
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The offset is beyond the current size
    /// - The read would extend beyond the current size
    /// - An I/O error occurs
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Returns the size of the storage in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;
}
