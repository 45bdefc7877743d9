//! Log walking and report rendering.

use crate::config::{IntegrityPolicy, ReaderConfig};
use crate::crypto::DecryptionContext;
use crate::error::{CoreError, CoreResult};
use crate::frame::{
    read_file_header, FrameDecoder, FrameHeader, FrameOutcome, LogCursor, PartialFrame,
    RecordFrame,
};
use crate::payload::{decode_payload, DecodedPayload, OperationSummary, PayloadDecoder};
use crate::report::ReportWriter;
use logscope_codec::{LogPosition, FILE_STREAM_LOG_FILE};
use logscope_storage::StorageBackend;
use std::io::Write;
use tracing::{debug, info, warn};

/// Placeholder for an operation type that could not be determined.
const NULL_TYPE: &str = "NULL";

/// State of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    /// Frames are still being read.
    Reading,
    /// The walk ended: limit reached, end of log, or an error.
    Stopped,
}

/// Outcome of a walk.
#[derive(Debug)]
pub struct WalkResult {
    /// Complete frames decoded and rendered.
    pub records_processed: usize,
    /// The error that stopped the walk, if any.
    pub terminal_error: Option<CoreError>,
}

impl WalkResult {
    /// Returns true if the walk ended without an error.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.terminal_error.is_none()
    }
}

#[derive(Debug)]
struct Progress {
    state: WalkState,
    records: usize,
}

/// Reads a log from start to finish and renders it as a report.
///
/// # Example
///
/// ```
/// use logscope_core::{FormatRegistry, LogReader, ReaderConfig, ReportWriter};
/// use logscope_storage::InMemoryBackend;
///
/// // A file header followed by the end-of-log marker.
/// let mut log = vec![0, 0, 0, 128, 0, 0, 0, 9];
/// log.extend_from_slice(&[0; 16]);
/// log.extend_from_slice(&[0; 4]);
///
/// let reader = LogReader::new(ReaderConfig::default(), Box::new(FormatRegistry::new()));
/// let mut report = ReportWriter::new(Vec::new());
/// let result = reader
///     .walk(&InMemoryBackend::with_data(log), &mut report)
///     .unwrap();
///
/// assert_eq!(result.records_processed, 0);
/// assert!(result.is_clean());
/// ```
pub struct LogReader {
    config: ReaderConfig,
    decryption: Option<DecryptionContext>,
    decoder: Box<dyn PayloadDecoder>,
}

impl LogReader {
    /// Creates a reader for unencrypted logs.
    #[must_use]
    pub fn new(config: ReaderConfig, decoder: Box<dyn PayloadDecoder>) -> Self {
        Self {
            config,
            decryption: None,
            decoder,
        }
    }

    /// Sets the context used to decrypt payloads.
    #[must_use]
    pub fn with_decryption(mut self, decryption: DecryptionContext) -> Self {
        self.decryption = Some(decryption);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Walks the log and writes the report.
    ///
    /// The report is always complete: on a framing or decryption error,
    /// open elements are closed, the record count is written, and the
    /// error is appended. That error is returned in
    /// [`WalkResult::terminal_error`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the report itself cannot be written.
    pub fn walk<W: Write>(
        &self,
        backend: &dyn StorageBackend,
        report: &mut ReportWriter<W>,
    ) -> CoreResult<WalkResult> {
        let mut progress = Progress {
            state: WalkState::Reading,
            records: 0,
        };

        report.declaration()?;
        let root = report.depth();
        report.open("logFile", &[])?;

        let terminal_error = match self.read_log(backend, report, &mut progress) {
            Ok(()) => None,
            Err(e) if is_report_error(&e) => return Err(e),
            Err(e) => {
                warn!(error = %e, records = progress.records, "log walk stopped");
                Some(e)
            }
        };
        progress.state = WalkState::Stopped;

        report.close_to(root + 1)?;
        report.leaf("recordCount", &[], &progress.records.to_string())?;
        if let Some(err) = &terminal_error {
            report.open("error", &[])?;
            report.leaf("classification", &[], err.classification())?;
            report.leaf("detail", &[], &err.to_string())?;
            report.close()?;
        }
        report.close()?;

        info!(records = progress.records, clean = terminal_error.is_none(), "log walk finished");
        Ok(WalkResult {
            records_processed: progress.records,
            terminal_error,
        })
    }

    fn read_log<W: Write>(
        &self,
        backend: &dyn StorageBackend,
        report: &mut ReportWriter<W>,
        progress: &mut Progress,
    ) -> CoreResult<()> {
        let mut cursor = LogCursor::new(backend, self.config.start_offset)?;

        if self.config.reads_header() {
            let header = read_file_header(&mut cursor)?;
            render_header(report, &header)?;
            self.check_header(report, &header)?;
        } else {
            debug!(offset = self.config.start_offset, "skipping file header");
        }

        report.open("logRecords", &[])?;
        let frames = FrameDecoder::new(self.decryption.as_ref());

        while progress.state == WalkState::Reading {
            if self
                .config
                .max_records
                .is_some_and(|max| progress.records >= max)
            {
                debug!(records = progress.records, "record limit reached");
                progress.state = WalkState::Stopped;
                break;
            }

            match frames.read_frame(&mut cursor)? {
                FrameOutcome::Frame(frame) => {
                    let warning = self.check_lengths(&frame)?;
                    let payload =
                        decode_payload(&frame.payload, self.config.depth, &*self.decoder);
                    render_wrapper(report, &frame, &payload, warning.as_deref())?;
                    progress.records += 1;
                }
                FrameOutcome::EndOfStream => {
                    debug!(offset = cursor.position(), "end of log");
                    progress.state = WalkState::Stopped;
                }
                FrameOutcome::Truncated { partial, error } => {
                    render_partial(report, &partial)?;
                    return Err(error);
                }
            }
        }

        report.close()?;
        Ok(())
    }

    fn check_header<W: Write>(
        &self,
        report: &mut ReportWriter<W>,
        header: &FrameHeader,
    ) -> CoreResult<()> {
        if header.format_id == i32::from(FILE_STREAM_LOG_FILE) {
            return Ok(());
        }

        let message = format!(
            "file header should start with format id {FILE_STREAM_LOG_FILE}, found {}",
            header.format_id
        );
        match self.config.header_check {
            IntegrityPolicy::Ignore => Ok(()),
            IntegrityPolicy::Warn => {
                warn!(format_id = header.format_id, "unexpected file header format id");
                report.leaf("warning", &[], &message)
            }
            IntegrityPolicy::Fail => Err(CoreError::invalid_format(message)),
        }
    }

    /// Applies the length policy; returns a warning to render, if any.
    fn check_lengths(&self, frame: &RecordFrame) -> CoreResult<Option<String>> {
        if frame.lengths_match() {
            return Ok(None);
        }

        match self.config.length_check {
            IntegrityPolicy::Ignore => Ok(None),
            IntegrityPolicy::Warn => {
                warn!(
                    offset = frame.offset,
                    forward = frame.forward_length,
                    backward = frame.backward_length,
                    "frame lengths differ"
                );
                Ok(Some(format!(
                    "forward length {} does not match backward length {}",
                    frame.forward_length, frame.backward_length
                )))
            }
            IntegrityPolicy::Fail => Err(CoreError::LengthMismatch {
                offset: frame.offset,
                forward: frame.forward_length,
                backward: frame.backward_length,
            }),
        }
    }
}

impl std::fmt::Debug for LogReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogReader")
            .field("config", &self.config)
            .field("decryption", &self.decryption)
            .finish_non_exhaustive()
    }
}

/// Errors raised by the report writer rather than the log.
fn is_report_error(err: &CoreError) -> bool {
    matches!(err, CoreError::Io(_) | CoreError::UnbalancedTag)
}

fn render_header<W: Write>(report: &mut ReportWriter<W>, header: &FrameHeader) -> CoreResult<()> {
    report.leaf("formatableID", &[], &header.format_id.to_string())?;
    report.leaf("obsoleteVersion", &[], &header.obsolete_version.to_string())?;
    report.leaf("logFileNumber", &[], &header.log_file_number.to_string())?;
    render_position(report, "previousLogRecordEndInstant", header.previous_record_end)
}

fn render_position<W: Write>(
    report: &mut ReportWriter<W>,
    tag: &str,
    position: LogPosition,
) -> CoreResult<()> {
    report.open(tag, &[])?;
    report.leaf("logFileNumber", &[], &position.file_number.to_string())?;
    report.leaf("position", &[], &position.offset.to_string())?;
    report.close()
}

fn render_wrapper<W: Write>(
    report: &mut ReportWriter<W>,
    frame: &RecordFrame,
    payload: &DecodedPayload,
    warning: Option<&str>,
) -> CoreResult<()> {
    report.open("wrapper", &[("offset", &frame.offset.to_string())])?;
    report.leaf("forwardLength", &[], &frame.forward_length.to_string())?;
    render_position(report, "logInstant", frame.instant)?;
    render_record(report, payload)?;
    report.leaf("backwardLength", &[], &frame.backward_length.to_string())?;
    if let Some(warning) = warning {
        report.leaf("warning", &[], warning)?;
    }
    report.close()
}

fn render_record<W: Write>(
    report: &mut ReportWriter<W>,
    payload: &DecodedPayload,
) -> CoreResult<()> {
    report.open("logRecord", &[])?;
    report.leaf("formatableID", &[], &payload.record_format_id.to_string())?;

    report.open("groups", &[("hexvalue", &format!("{:x}", payload.group_flags))])?;
    for name in payload.group_flags.names() {
        report.leaf("flag", &[], name)?;
    }
    report.close()?;

    report.empty_tag(
        "transactionID",
        &[("value", &payload.transaction_id.to_string())],
    )?;

    let type_name = payload.operation.type_name().unwrap_or(NULL_TYPE);
    match &payload.operation {
        OperationSummary::Header { .. }
        | OperationSummary::Full { detail: None, .. } => {
            report.empty_tag("operation", &[("type", type_name)])?;
        }
        OperationSummary::Full {
            detail: Some(detail),
            ..
        } => {
            report.open("operation", &[("type", type_name)])?;
            report.leaf("details", &[], detail)?;
            report.close()?;
        }
    }

    for err in &payload.field_errors {
        report.leaf("fieldError", &[("field", err.field)], &err.message)?;
    }
    report.close()
}

fn render_partial<W: Write>(report: &mut ReportWriter<W>, partial: &PartialFrame) -> CoreResult<()> {
    report.open("partialWrapper", &[("offset", &partial.offset.to_string())])?;
    if let Some(forward) = partial.forward_length {
        report.leaf("forwardLength", &[], &forward.to_string())?;
    }
    if let Some(instant) = partial.instant {
        render_position(report, "logInstant", instant)?;
    }
    report.leaf("payloadBytes", &[], &partial.payload_bytes.to_string())?;
    report.close()
}
