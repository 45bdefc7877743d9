//! Scan command implementation.

use crate::keys::decryption_context;
use logscope_codec::LogPosition;
use logscope_core::frame::{read_file_header, FrameDecoder, FrameHeader, FrameIterator, LogCursor};
use logscope_core::DecryptionContext;
use logscope_storage::{FileBackend, StorageBackend};
use serde::Serialize;
use std::path::Path;

/// Frame representation for output.
#[derive(Debug, Serialize)]
pub struct FrameInfo {
    /// Offset in the log file.
    pub offset: u64,
    /// Log instant.
    pub instant: LogPosition,
    /// Payload length before the payload.
    pub forward_length: i32,
    /// Payload length after the payload.
    pub backward_length: i32,
}

/// Frames found in a log file.
#[derive(Debug, Serialize)]
pub struct ScanSummary {
    /// File header, if read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<FrameHeader>,
    /// Frames in file order.
    pub frames: Vec<FrameInfo>,
    /// Error that stopped the scan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs the scan command.
///
/// Returns `false` if the scan stopped on an error.
pub fn run(
    path: &Path,
    offset: u64,
    limit: Option<usize>,
    key: Option<&str>,
    iv: Option<&str>,
    format: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("log file not found: {}", path.display()).into());
    }

    let backend = FileBackend::open(path)?;
    let decryption = key.map(|key| decryption_context(key, iv)).transpose()?;
    let summary = scan(&backend, offset, limit, decryption.as_ref())?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => {
            print_text_output(&summary);
        }
    }

    Ok(summary.error.is_none())
}

/// Reads frame boundaries without decoding payloads.
pub fn scan(
    backend: &dyn StorageBackend,
    offset: u64,
    limit: Option<usize>,
    decryption: Option<&DecryptionContext>,
) -> Result<ScanSummary, Box<dyn std::error::Error>> {
    let mut cursor = LogCursor::new(backend, offset)?;
    let mut summary = ScanSummary {
        header: None,
        frames: Vec::new(),
        error: None,
    };

    if offset == 0 {
        match read_file_header(&mut cursor) {
            Ok(header) => summary.header = Some(header),
            Err(e) => {
                summary.error = Some(e.to_string());
                return Ok(summary);
            }
        }
    }

    let frames = FrameIterator::new(cursor, FrameDecoder::new(decryption));
    for item in frames.take(limit.unwrap_or(usize::MAX)) {
        match item {
            Ok(frame) => summary.frames.push(FrameInfo {
                offset: frame.offset,
                instant: frame.instant,
                forward_length: frame.forward_length,
                backward_length: frame.backward_length,
            }),
            Err(e) => {
                summary.error = Some(e.to_string());
                break;
            }
        }
    }

    Ok(summary)
}

fn print_text_output(summary: &ScanSummary) {
    if let Some(header) = &summary.header {
        println!(
            "Log file {} (format id {}, previous end {})",
            header.log_file_number, header.format_id, header.previous_record_end
        );
    }
    println!("Frames ({} total)", summary.frames.len());
    println!("================");
    println!();

    for frame in &summary.frames {
        print!(
            "[{:08}] len={:<8} instant={}",
            frame.offset, frame.forward_length, frame.instant
        );
        if frame.forward_length != frame.backward_length {
            print!(" backward={} MISMATCH", frame.backward_length);
        }
        println!();
    }

    if let Some(error) = &summary.error {
        println!();
        println!("Error: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logscope_storage::InMemoryBackend;
    use logscope_testkit::{LogFileBuilder, PayloadBuilder};

    #[test]
    fn scans_frames() {
        let log = LogFileBuilder::new()
            .frame(&PayloadBuilder::new(1).build())
            .frame_with_backward(&PayloadBuilder::new(2).build(), Some(0))
            .end_marker()
            .build();
        let summary = scan(&InMemoryBackend::with_data(log), 0, None, None).unwrap();

        assert_eq!(summary.header.map(|h| h.log_file_number), Some(1));
        assert_eq!(summary.frames.len(), 2);
        assert_eq!(summary.frames[0].offset, 24);
        assert_eq!(summary.frames[1].instant, LogPosition::new(1, 24 + 23));
        assert_eq!(summary.frames[1].backward_length, 0);
        assert!(summary.error.is_none());
    }

    #[test]
    fn scan_respects_limit() {
        let log = LogFileBuilder::new()
            .frame(b"a")
            .frame(b"b")
            .frame(b"c")
            .build();
        let summary = scan(&InMemoryBackend::with_data(log), 0, Some(2), None).unwrap();
        assert_eq!(summary.frames.len(), 2);
    }

    #[test]
    fn scan_records_truncation() {
        let log = LogFileBuilder::new().frame(b"abc").raw(&[0, 0, 0, 9]).build();
        let summary = scan(&InMemoryBackend::with_data(log), 0, None, None).unwrap();
        assert_eq!(summary.frames.len(), 1);
        assert!(summary.error.unwrap().contains("truncated frame"));
    }

    #[test]
    fn short_header_is_recorded() {
        let summary = scan(&InMemoryBackend::with_data(vec![0; 7]), 0, None, None).unwrap();
        assert!(summary.header.is_none());
        assert!(summary.error.is_some());
    }

    #[test]
    fn json_shape() {
        let log = LogFileBuilder::new().frame(b"abc").build();
        let summary = scan(&InMemoryBackend::with_data(log), 0, None, None).unwrap();
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["header"]["format_id"], 128);
        assert_eq!(json["frames"][0]["forward_length"], 3);
        assert_eq!(json["frames"][0]["instant"]["offset"], 24);
        assert!(json.get("error").is_none());
    }
}
