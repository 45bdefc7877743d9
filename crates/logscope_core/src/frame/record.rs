//! Frame and file header decoding.

use crate::crypto::DecryptionContext;
use crate::error::{CoreError, CoreResult};
use crate::frame::cursor::LogCursor;
use logscope_codec::{ByteReader, LogPosition};
use serde::Serialize;
use tracing::{debug, warn};

/// Size of the file header.
/// format id (4) + obsolete version (4) + log file number (8) + previous instant (8)
pub const FILE_HEADER_SIZE: usize = 24;

/// Size of a forward or backward length field.
const LENGTH_SIZE: usize = 4;

/// Size of an instant.
const INSTANT_SIZE: usize = 8;

/// The header at the start of every log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameHeader {
    /// Format id of the file (normally `FILE_STREAM_LOG_FILE`).
    pub format_id: i32,
    /// Version field kept for compatibility; no longer meaningful.
    pub obsolete_version: i32,
    /// Number of this log file.
    pub log_file_number: i64,
    /// End of the last record written to the previous log file.
    pub previous_record_end: LogPosition,
}

impl FrameHeader {
    /// Parses a header from exactly [`FILE_HEADER_SIZE`] bytes.
    pub fn parse(data: &[u8]) -> CoreResult<Self> {
        let mut reader = ByteReader::new(data);
        Ok(Self {
            format_id: reader.read_i32()?,
            obsolete_version: reader.read_i32()?,
            log_file_number: reader.read_i64()?,
            previous_record_end: LogPosition::split(reader.read_u64()?),
        })
    }
}

/// Reads the file header at the cursor.
///
/// # Errors
///
/// Returns [`CoreError::TruncatedHeader`] if the log is shorter than a
/// header, or a storage error if the read fails.
pub fn read_file_header(cursor: &mut LogCursor<'_>) -> CoreResult<FrameHeader> {
    let bytes = cursor.take(FILE_HEADER_SIZE)?;
    if bytes.len() < FILE_HEADER_SIZE {
        return Err(CoreError::TruncatedHeader {
            expected: FILE_HEADER_SIZE,
            available: bytes.len(),
        });
    }
    FrameHeader::parse(&bytes)
}

/// One complete frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFrame {
    /// Offset of the frame in the log file.
    pub offset: u64,
    /// Payload length written before the payload.
    pub forward_length: i32,
    /// Log instant of the record.
    pub instant: LogPosition,
    /// Decrypted, de-padded payload (`forward_length` bytes).
    pub payload: Vec<u8>,
    /// Payload length written after the payload; 0 if it could not be read.
    pub backward_length: i32,
}

impl RecordFrame {
    /// Returns true if the forward and backward lengths agree.
    #[must_use]
    pub fn lengths_match(&self) -> bool {
        self.forward_length == self.backward_length
    }
}

/// What could be read of a frame cut off by the end of the log.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartialFrame {
    /// Offset of the frame in the log file.
    pub offset: u64,
    /// Forward length, if it was read.
    pub forward_length: Option<i32>,
    /// Instant, if it was read.
    pub instant: Option<LogPosition>,
    /// Payload bytes present before the log ended.
    pub payload_bytes: usize,
}

/// Result of reading one frame.
#[derive(Debug)]
pub enum FrameOutcome {
    /// A complete frame.
    Frame(RecordFrame),
    /// No more frames: the log ended cleanly or a zero length was found.
    EndOfStream,
    /// The log ended inside a frame.
    Truncated {
        /// Fields read before the log ended.
        partial: PartialFrame,
        /// A [`CoreError::TruncatedFrame`] describing the shortfall.
        error: CoreError,
    },
}

/// Decodes frames from a cursor, decrypting payloads when a context is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDecoder<'c> {
    decryption: Option<&'c DecryptionContext>,
}

impl<'c> FrameDecoder<'c> {
    /// Creates a decoder; `None` reads payloads as plaintext.
    #[must_use]
    pub fn new(decryption: Option<&'c DecryptionContext>) -> Self {
        Self { decryption }
    }

    /// Bytes a payload of `plain_len` bytes occupies on disk.
    #[must_use]
    pub fn stored_length(&self, plain_len: usize) -> usize {
        self.decryption
            .map_or(plain_len, |ctx| ctx.required_ciphertext_length(plain_len))
    }

    /// Reads one frame.
    ///
    /// A truncated frame is not an `Err`: it comes back as
    /// [`FrameOutcome::Truncated`] so the caller can still report it.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails, decryption fails, or the
    /// forward length is negative ([`CoreError::InvalidFrameLength`]).
    pub fn read_frame(&self, cursor: &mut LogCursor<'_>) -> CoreResult<FrameOutcome> {
        let offset = cursor.position();
        let mut partial = PartialFrame {
            offset,
            ..PartialFrame::default()
        };

        let length_bytes = cursor.take(LENGTH_SIZE)?;
        if length_bytes.is_empty() {
            return Ok(FrameOutcome::EndOfStream);
        }
        if length_bytes.len() < LENGTH_SIZE {
            return Ok(truncated(partial, LENGTH_SIZE, length_bytes.len()));
        }

        let forward_length = ByteReader::new(&length_bytes).read_i32()?;
        if forward_length == 0 {
            return Ok(FrameOutcome::EndOfStream);
        }
        if forward_length < 0 {
            warn!(offset, forward_length, "negative frame length");
            return Err(CoreError::InvalidFrameLength {
                offset,
                length: forward_length,
            });
        }
        partial.forward_length = Some(forward_length);

        let instant_bytes = cursor.take(INSTANT_SIZE)?;
        if instant_bytes.len() < INSTANT_SIZE {
            return Ok(truncated(partial, INSTANT_SIZE, instant_bytes.len()));
        }
        let instant = LogPosition::split(ByteReader::new(&instant_bytes).read_u64()?);
        partial.instant = Some(instant);

        // forward_length > 0 here
        let plain_len = forward_length as usize;
        let stored_len = self.stored_length(plain_len);
        let stored = cursor.take(stored_len)?;
        if stored.len() < stored_len {
            partial.payload_bytes = stored.len();
            return Ok(truncated(partial, stored_len, stored.len()));
        }

        let payload = match self.decryption {
            Some(ctx) => ctx.decrypt(&stored, plain_len)?,
            None => stored,
        };

        let trailer = cursor.take(LENGTH_SIZE)?;
        let backward_length = if trailer.len() == LENGTH_SIZE {
            ByteReader::new(&trailer).read_i32()?
        } else {
            debug!(offset, available = trailer.len(), "frame has no backward length");
            0
        };

        Ok(FrameOutcome::Frame(RecordFrame {
            offset,
            forward_length,
            instant,
            payload,
            backward_length,
        }))
    }
}

fn truncated(partial: PartialFrame, expected: usize, available: usize) -> FrameOutcome {
    let error = CoreError::TruncatedFrame {
        offset: partial.offset,
        expected,
        available,
    };
    FrameOutcome::Truncated { partial, error }
}
