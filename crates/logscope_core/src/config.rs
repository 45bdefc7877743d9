//! Reader configuration.

/// How much of each logged operation to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeDepth {
    /// Decode the operation's format id and look up its type name.
    #[default]
    HeaderOnly,
    /// Hand the operation bytes to the payload decoder for a full description.
    Full,
}

/// What to do when a consistency check fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrityPolicy {
    /// Do not check.
    Ignore,
    /// Log a warning and annotate the report, then keep reading.
    #[default]
    Warn,
    /// Stop the walk with an error.
    Fail,
}

/// Configuration for walking a log file.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Byte offset of the first frame to read.
    ///
    /// Zero means "start of file": the file header is decoded first.
    /// Any other value skips the header.
    pub start_offset: u64,

    /// Maximum number of frames to decode (`None` = all).
    pub max_records: Option<usize>,

    /// How deeply to decode each operation.
    pub depth: DecodeDepth,

    /// Policy for frames whose forward and backward lengths differ.
    pub length_check: IntegrityPolicy,

    /// Policy for a file header that does not carry the log file format id.
    pub header_check: IntegrityPolicy,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            start_offset: 0,
            max_records: None,
            depth: DecodeDepth::HeaderOnly,
            length_check: IntegrityPolicy::Warn,
            header_check: IntegrityPolicy::Warn,
        }
    }
}

impl ReaderConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the start offset.
    #[must_use]
    pub const fn start_offset(mut self, offset: u64) -> Self {
        self.start_offset = offset;
        self
    }

    /// Sets the maximum number of frames to read.
    #[must_use]
    pub const fn max_records(mut self, limit: Option<usize>) -> Self {
        self.max_records = limit;
        self
    }

    /// Sets the decode depth.
    #[must_use]
    pub const fn depth(mut self, depth: DecodeDepth) -> Self {
        self.depth = depth;
        self
    }

    /// Sets the forward/backward length policy.
    #[must_use]
    pub const fn length_check(mut self, policy: IntegrityPolicy) -> Self {
        self.length_check = policy;
        self
    }

    /// Sets the file header policy.
    #[must_use]
    pub const fn header_check(mut self, policy: IntegrityPolicy) -> Self {
        self.header_check = policy;
        self
    }

    /// Returns true if the walk starts at the file header.
    #[must_use]
    pub const fn reads_header(&self) -> bool {
        self.start_offset == 0
    }
}
