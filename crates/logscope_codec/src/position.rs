//! Log positions packed into 64-bit counters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in the log: the log file number and the byte offset in it.
///
/// On disk an instant is a single 64-bit counter whose high 32 bits hold
/// the file number and whose low 32 bits hold the offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogPosition {
    /// Log file number.
    pub file_number: u32,
    /// Byte offset within the log file.
    pub offset: u32,
}

impl LogPosition {
    /// Creates a position from its parts.
    #[must_use]
    pub const fn new(file_number: u32, offset: u32) -> Self {
        Self {
            file_number,
            offset,
        }
    }

    /// Splits a packed counter into file number and offset.
    #[must_use]
    pub const fn split(counter: u64) -> Self {
        Self {
            file_number: (counter >> 32) as u32,
            offset: counter as u32,
        }
    }

    /// Packs the position back into a counter.
    #[must_use]
    pub const fn join(self) -> u64 {
        ((self.file_number as u64) << 32) | self.offset as u64
    }
}

impl From<u64> for LogPosition {
    fn from(counter: u64) -> Self {
        Self::split(counter)
    }
}

impl From<LogPosition> for u64 {
    fn from(position: LogPosition) -> Self {
        position.join()
    }
}

impl fmt::Display for LogPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.file_number, self.offset)
    }
}
