//! # logscope Storage
//!
//! Read-only storage backends for logscope.
//!
//! This crate provides the lowest-level byte access for the log reader.
//! Storage backends are **opaque byte stores** - they do not interpret
//! the data they hold.
//!
//! ## Design Principles
//!
//! - Backends are simple positional byte stores (read, size)
//! - No knowledge of log file formats, frames, or payloads
//! - Must be `Send + Sync`
//! - The reader never writes; a forensic tool must not modify its evidence
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and for logs already held in memory
//! - [`FileBackend`] - For log files on disk
//!
//! ## Example
//!
//! ```rust
//! use logscope_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::with_data(b"hello world".to_vec());
//! let data = backend.read_at(6, 5).unwrap();
//! assert_eq!(&data, b"world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
