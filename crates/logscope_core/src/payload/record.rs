//! Payload structure decoding.

use crate::config::DecodeDepth;
use crate::payload::decoder::PayloadDecoder;
use crate::payload::flags::GroupFlags;
use logscope_codec::{
    read_compressed_int, read_compressed_long, read_format_id, ByteReader, NULL_FORMAT_ID,
    RAW_STORE_XACT_ID,
};
use std::fmt;
use tracing::debug;

/// Field name of the record format id.
pub const FIELD_RECORD_FORMAT: &str = "formatableID";
/// Field name of the group flags.
pub const FIELD_GROUPS: &str = "groups";
/// Field name of the transaction id.
pub const FIELD_TRANSACTION: &str = "transactionID";
/// Field name of the operation.
pub const FIELD_OPERATION: &str = "operation";

/// Transaction that logged an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionId {
    /// Logged outside a transaction.
    Null,
    /// A transaction number.
    Id(i64),
    /// The tag was read but the number could not be.
    Unreadable,
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Id(id) => write!(f, "{id}"),
            Self::Unreadable => f.write_str("UNKNOWN"),
        }
    }
}

/// What was decoded of the operation body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationSummary {
    /// Only the format id was read and looked up.
    Header {
        /// Operation format id (0 if unreadable).
        format_id: u16,
        /// Registered name, if the decoder knew the id.
        type_name: Option<String>,
    },
    /// The decoder reconstructed the operation.
    Full {
        /// Type name, absent if decoding failed.
        type_name: Option<String>,
        /// Rendered content, absent if decoding failed or produced none.
        detail: Option<String>,
    },
}

impl OperationSummary {
    /// Type name, if known.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Header { type_name, .. } | Self::Full { type_name, .. } => type_name.as_deref(),
        }
    }

    /// Rendered content, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Header { .. } => None,
            Self::Full { detail, .. } => detail.as_deref(),
        }
    }
}

/// A payload field that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the field.
    pub field: &'static str,
    /// Description of the failure.
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, err: impl fmt::Display) -> Self {
        Self {
            field,
            message: err.to_string(),
        }
    }
}

/// The leading fields of a payload and its operation summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    /// Format id of the record (normally `LOG_RECORD`).
    pub record_format_id: u16,
    /// Group flags.
    pub group_flags: GroupFlags,
    /// Logging transaction.
    pub transaction_id: TransactionId,
    /// Operation body.
    pub operation: OperationSummary,
    /// Fields that fell back to defaults, in payload order.
    pub field_errors: Vec<FieldError>,
}

/// Decodes a frame payload.
///
/// Never fails: a field that cannot be read takes its default and is
/// listed in [`DecodedPayload::field_errors`].
pub fn decode_payload(
    payload: &[u8],
    depth: DecodeDepth,
    decoder: &dyn PayloadDecoder,
) -> DecodedPayload {
    let mut reader = ByteReader::new(payload);
    let mut field_errors = Vec::new();

    let record_format_id = read_format_id(&mut reader).unwrap_or_else(|e| {
        field_errors.push(FieldError::new(FIELD_RECORD_FORMAT, e));
        0
    });

    let group_flags = read_compressed_int(&mut reader)
        .map(|bits| GroupFlags::from_bits(bits as u32))
        .unwrap_or_else(|e| {
            field_errors.push(FieldError::new(FIELD_GROUPS, e));
            GroupFlags::default()
        });

    let transaction_id = decode_transaction_id(&mut reader, &mut field_errors);

    let operation = match depth {
        DecodeDepth::HeaderOnly => {
            let format_id = read_format_id(&mut reader).unwrap_or_else(|e| {
                field_errors.push(FieldError::new(FIELD_OPERATION, e));
                0
            });
            let type_name = match decoder.decode_header(format_id) {
                Ok(name) => Some(name),
                Err(e) => {
                    field_errors.push(FieldError::new(FIELD_OPERATION, e));
                    None
                }
            };
            OperationSummary::Header {
                format_id,
                type_name,
            }
        }
        DecodeDepth::Full => match decoder.decode_full(reader.remaining()) {
            Ok(desc) => OperationSummary::Full {
                type_name: Some(desc.type_name),
                detail: desc.detail,
            },
            Err(e) => {
                field_errors.push(FieldError::new(FIELD_OPERATION, e));
                OperationSummary::Full {
                    type_name: None,
                    detail: None,
                }
            }
        },
    };

    DecodedPayload {
        record_format_id,
        group_flags,
        transaction_id,
        operation,
        field_errors,
    }
}

fn decode_transaction_id(
    reader: &mut ByteReader<'_>,
    field_errors: &mut Vec<FieldError>,
) -> TransactionId {
    let tag = read_format_id(reader).unwrap_or_else(|e| {
        field_errors.push(FieldError::new(FIELD_TRANSACTION, e));
        NULL_FORMAT_ID
    });

    if tag == NULL_FORMAT_ID {
        return TransactionId::Null;
    }
    if tag != RAW_STORE_XACT_ID {
        debug!(tag, "unexpected transaction id tag");
    }

    match read_compressed_long(reader) {
        Ok(id) => TransactionId::Id(id),
        Err(e) => {
            field_errors.push(FieldError::new(FIELD_TRANSACTION, e));
            TransactionId::Unreadable
        }
    }
}
