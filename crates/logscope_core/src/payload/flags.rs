//! Group flags of a logged operation.

use serde::Serialize;
use std::fmt;

/// Bitmask classifying a logged operation's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct GroupFlags(u32);

impl GroupFlags {
    /// First operation of a transaction.
    pub const FIRST: Self = Self(0x1);
    /// Last operation of a transaction.
    pub const LAST: Self = Self(0x2);
    /// Compensation (undo) operation.
    pub const COMPENSATION: Self = Self(0x4);
    /// Before-image log operation.
    pub const BI_LOG: Self = Self(0x8);
    /// Commit.
    pub const COMMIT: Self = Self(0x10);
    /// Abort.
    pub const ABORT: Self = Self(0x20);
    /// Prepare of a distributed transaction.
    pub const PREPARE: Self = Self(0x40);
    /// Distributed transaction needs its locks reclaimed on recovery.
    pub const XA_NEEDLOCK: Self = Self(0x80);
    /// Raw store operation.
    pub const RAWSTORE: Self = Self(0x100);
    /// File resource operation.
    pub const FILE_RESOURCE: Self = Self(0x400);
    /// Checksum record.
    pub const CHECKSUM: Self = Self(0x800);

    /// Every known flag with its name, in rendering order.
    pub const ALL: [(Self, &'static str); 11] = [
        (Self::FIRST, "FIRST"),
        (Self::LAST, "LAST"),
        (Self::COMPENSATION, "COMPENSATION"),
        (Self::BI_LOG, "BI_LOG"),
        (Self::COMMIT, "COMMIT"),
        (Self::ABORT, "ABORT"),
        (Self::PREPARE, "PREPARE"),
        (Self::XA_NEEDLOCK, "XA_NEEDLOCK"),
        (Self::RAWSTORE, "RAWSTORE"),
        (Self::FILE_RESOURCE, "FILE_RESOURCE"),
        (Self::CHECKSUM, "CHECKSUM"),
    ];

    /// Wraps raw bits. Unknown bits are kept.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Names of the known flags that are set.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::ALL
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl std::ops::BitOr for GroupFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Lowercase hex without prefix, as written in the report.
impl fmt::LowerHex for GroupFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
