//! Streaming iterator over log frames.

use crate::error::CoreResult;
use crate::frame::cursor::LogCursor;
use crate::frame::record::{FrameDecoder, FrameOutcome, RecordFrame};

/// Iterator over the frames of a log.
///
/// Yields frames until the end of the log. A truncated frame or a read
/// failure is yielded once as an `Err`, after which the iterator is done.
///
/// The file header is not read here: position the cursor past it first
/// (see [`read_file_header`](crate::frame::read_file_header)).
pub struct FrameIterator<'a, 'c> {
    cursor: LogCursor<'a>,
    decoder: FrameDecoder<'c>,
    finished: bool,
}

impl<'a, 'c> FrameIterator<'a, 'c> {
    /// Creates an iterator reading frames from the cursor's position.
    #[must_use]
    pub fn new(cursor: LogCursor<'a>, decoder: FrameDecoder<'c>) -> Self {
        Self {
            cursor,
            decoder,
            finished: false,
        }
    }

    /// Offset of the next frame.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    fn read_next(&mut self) -> CoreResult<Option<RecordFrame>> {
        match self.decoder.read_frame(&mut self.cursor)? {
            FrameOutcome::Frame(frame) => Ok(Some(frame)),
            FrameOutcome::EndOfStream => Ok(None),
            FrameOutcome::Truncated { error, .. } => Err(error),
        }
    }
}

impl Iterator for FrameIterator<'_, '_> {
    type Item = CoreResult<RecordFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_next() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
