//! Record framing.
//!
//! A log file is a 24-byte file header followed by frames:
//!
//! ```text
//! ┌────────────────┬─────────────┬──────────────────────┬─────────────────┐
//! │ forward len: 4 │ instant: 8  │ payload: stored len  │ backward len: 4 │
//! └────────────────┴─────────────┴──────────────────────┴─────────────────┘
//! ```
//!
//! All integers are big-endian. The stored payload length equals the
//! forward length, or the forward length rounded up to the cipher block
//! size when the log is encrypted. A forward length of zero marks the end
//! of the log.

mod cursor;
mod iterator;
mod record;

pub use cursor::LogCursor;
pub use iterator::FrameIterator;
pub use record::{
    read_file_header, FrameDecoder, FrameHeader, FrameOutcome, PartialFrame, RecordFrame,
    FILE_HEADER_SIZE,
};
