//! Log file and payload builders.
//!
//! Builds byte-exact log files for tests, including encrypted ones, and
//! provides canned payload decoders.

use aes_gcm::aes::{Aes128, Aes256};
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockEncryptMut, KeyIvInit};
use logscope_codec::{
    write_compressed_int, write_compressed_long, write_format_id, LogPosition,
    FILE_STREAM_LOG_FILE, LOG_RECORD, NULL_FORMAT_ID, RAW_STORE_XACT_ID,
};
use logscope_core::{CoreError, CoreResult, OperationDescription, PayloadDecoder};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tempfile::TempDir;

/// Encrypts a padded payload; input length is a multiple of the block size.
pub type Encryptor = Box<dyn Fn(&[u8]) -> Vec<u8>>;

/// Builds a log file frame by frame.
///
/// # Example
///
/// ```
/// use logscope_testkit::{LogFileBuilder, PayloadBuilder};
///
/// let log = LogFileBuilder::new()
///     .frame(&PayloadBuilder::new(300).transaction(7).build())
///     .end_marker()
///     .build();
/// assert_eq!(&log[..4], &[0, 0, 0, 128]);
/// ```
pub struct LogFileBuilder {
    with_header: bool,
    format_id: i32,
    obsolete_version: i32,
    log_file_number: i64,
    previous_record_end: LogPosition,
    encryption: Option<(usize, Encryptor)>,
    frames: Vec<u8>,
}

impl Default for LogFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LogFileBuilder {
    /// Header size in bytes.
    pub const HEADER_SIZE: usize = 24;

    /// Creates a builder for log file 1 with a standard header.
    pub fn new() -> Self {
        Self {
            with_header: true,
            format_id: i32::from(FILE_STREAM_LOG_FILE),
            obsolete_version: 9,
            log_file_number: 1,
            previous_record_end: LogPosition::new(0, 0),
            encryption: None,
            frames: Vec::new(),
        }
    }

    /// Omits the file header.
    pub fn without_header(mut self) -> Self {
        self.with_header = false;
        self
    }

    /// Sets the header format id.
    pub fn format_id(mut self, format_id: i32) -> Self {
        self.format_id = format_id;
        self
    }

    /// Sets the log file number.
    pub fn log_file_number(mut self, number: i64) -> Self {
        self.log_file_number = number;
        self
    }

    /// Sets the previous log record end instant.
    pub fn previous_record_end(mut self, position: LogPosition) -> Self {
        self.previous_record_end = position;
        self
    }

    /// Pads payloads to `block_size` with leading zeros and passes them
    /// through `encryptor`. Affects frames added afterwards.
    pub fn encrypted(mut self, block_size: usize, encryptor: Encryptor) -> Self {
        self.encryption = Some((block_size, encryptor));
        self
    }

    /// Pads payloads to `block_size` without encrypting them.
    pub fn padded(self, block_size: usize) -> Self {
        self.encrypted(block_size, Box::new(|plain: &[u8]| plain.to_vec()))
    }

    /// Offset the next frame will start at.
    pub fn next_offset(&self) -> u64 {
        let header = if self.with_header { Self::HEADER_SIZE } else { 0 };
        (header + self.frames.len()) as u64
    }

    /// Appends a frame with matching lengths.
    pub fn frame(self, payload: &[u8]) -> Self {
        let len = payload.len() as i32;
        self.frame_with_backward(payload, Some(len))
    }

    /// Appends a frame with an explicit backward length, or none at all.
    pub fn frame_with_backward(mut self, payload: &[u8], backward: Option<i32>) -> Self {
        let instant = LogPosition::new(self.log_file_number as u32, self.next_offset() as u32);
        let stored = self.stored_payload(payload);

        self.frames
            .extend_from_slice(&(payload.len() as i32).to_be_bytes());
        self.frames.extend_from_slice(&instant.join().to_be_bytes());
        self.frames.extend_from_slice(&stored);
        if let Some(len) = backward {
            self.frames.extend_from_slice(&len.to_be_bytes());
        }
        self
    }

    /// Appends the zero forward length that ends a log.
    pub fn end_marker(self) -> Self {
        self.raw(&[0, 0, 0, 0])
    }

    /// Appends arbitrary bytes.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.frames.extend_from_slice(bytes);
        self
    }

    /// Returns the log file bytes.
    pub fn build(self) -> Vec<u8> {
        let mut log = Vec::with_capacity(Self::HEADER_SIZE + self.frames.len());
        if self.with_header {
            log.extend_from_slice(&self.format_id.to_be_bytes());
            log.extend_from_slice(&self.obsolete_version.to_be_bytes());
            log.extend_from_slice(&self.log_file_number.to_be_bytes());
            log.extend_from_slice(&self.previous_record_end.join().to_be_bytes());
        }
        log.extend_from_slice(&self.frames);
        log
    }

    fn stored_payload(&self, payload: &[u8]) -> Vec<u8> {
        match &self.encryption {
            Some((block_size, encrypt)) => {
                let padding = (block_size - payload.len() % block_size) % block_size;
                let mut plain = vec![0u8; padding];
                plain.extend_from_slice(payload);
                encrypt(&plain)
            }
            None => payload.to_vec(),
        }
    }
}

/// Builds a payload: record format id, group flags, transaction id and
/// operation.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    record_format_id: u16,
    groups: i32,
    transaction: Option<i64>,
    operation_id: u16,
    body: Vec<u8>,
}

impl PayloadBuilder {
    /// Creates a payload for an operation with no transaction and no flags.
    pub fn new(operation_id: u16) -> Self {
        Self {
            record_format_id: LOG_RECORD,
            groups: 0,
            transaction: None,
            operation_id,
            body: Vec::new(),
        }
    }

    /// Sets the record format id.
    pub fn record_format_id(mut self, id: u16) -> Self {
        self.record_format_id = id;
        self
    }

    /// Sets the group flags.
    pub fn groups(mut self, groups: i32) -> Self {
        self.groups = groups;
        self
    }

    /// Sets the transaction number.
    pub fn transaction(mut self, id: i64) -> Self {
        self.transaction = Some(id);
        self
    }

    /// Sets the bytes following the operation format id.
    pub fn body(mut self, body: &[u8]) -> Self {
        self.body = body.to_vec();
        self
    }

    /// Returns the payload bytes.
    pub fn build(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        write_format_id(&mut buf, self.record_format_id);
        write_compressed_int(&mut buf, self.groups).expect("group flags out of range");
        match self.transaction {
            Some(id) => {
                write_format_id(&mut buf, RAW_STORE_XACT_ID);
                write_compressed_long(&mut buf, id).expect("transaction id out of range");
            }
            None => write_format_id(&mut buf, NULL_FORMAT_ID),
        }
        write_format_id(&mut buf, self.operation_id);
        buf.extend_from_slice(&self.body);
        buf
    }
}

/// A decoder that knows every operation by the same name.
#[derive(Debug, Clone)]
pub struct StubDecoder {
    type_name: String,
    detail: Option<String>,
}

impl StubDecoder {
    /// Creates a stub returning `type_name` and `detail` for every operation.
    pub fn new(type_name: impl Into<String>, detail: Option<&str>) -> Self {
        Self {
            type_name: type_name.into(),
            detail: detail.map(str::to_owned),
        }
    }
}

impl PayloadDecoder for StubDecoder {
    fn decode_header(&self, _format_id: u16) -> CoreResult<String> {
        Ok(self.type_name.clone())
    }

    fn decode_full(&self, _bytes: &[u8]) -> CoreResult<OperationDescription> {
        Ok(OperationDescription::new(self.type_name.clone(), self.detail.clone()))
    }
}

/// A decoder that fails on every operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingDecoder;

impl PayloadDecoder for FailingDecoder {
    fn decode_header(&self, format_id: u16) -> CoreResult<String> {
        Err(CoreError::operation_decode(format!("no name for {format_id}")))
    }

    fn decode_full(&self, _bytes: &[u8]) -> CoreResult<OperationDescription> {
        Err(CoreError::operation_decode("cannot decode"))
    }
}

/// Encrypts with AES-CBC, restarting from `iv`. `key` is 16 or 32 bytes
/// and `plaintext` a whole number of blocks.
pub fn aes_cbc_encrypt(key: &[u8], iv: [u8; 16], plaintext: &[u8]) -> Vec<u8> {
    assert_eq!(plaintext.len() % 16, 0, "plaintext must be whole blocks");

    match key.len() {
        16 => cbc::Encryptor::<Aes128>::new_from_slices(key, &iv)
            .expect("AES-128 key and IV")
            .encrypt_padded_vec_mut::<NoPadding>(plaintext),
        32 => cbc::Encryptor::<Aes256>::new_from_slices(key, &iv)
            .expect("AES-256 key and IV")
            .encrypt_padded_vec_mut::<NoPadding>(plaintext),
        n => panic!("unsupported AES key size: {n}"),
    }
}

/// Renders a format registry as JSON.
pub fn registry_json(entries: &[(u16, &str)]) -> String {
    let map: BTreeMap<String, &str> = entries
        .iter()
        .map(|(id, name)| (id.to_string(), *name))
        .collect();
    serde_json::to_string(&map).expect("registry serializes")
}

/// A log file in a temporary directory.
pub struct TempLog {
    /// Path of the log file.
    pub path: PathBuf,
    _dir: TempDir,
}

impl TempLog {
    /// Writes `bytes` to a fresh temporary log file.
    pub fn new(bytes: &[u8]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join("log1.dat");
        std::fs::write(&path, bytes).expect("Failed to write log file");
        Self { path, _dir: dir }
    }
}
