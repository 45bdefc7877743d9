//! Payload structure decoding.
//!
//! A decrypted payload starts with a fixed sequence of fields:
//!
//! | Field | Encoding |
//! |-------|----------|
//! | record format id | format id |
//! | group flags | compressed int |
//! | transaction id tag | format id (`NULL_FORMAT_ID` for no transaction) |
//! | transaction number | compressed long, absent for the null tag |
//! | operation | format id, then the operation's own serialization |
//!
//! The operation is handed to a [`PayloadDecoder`]. Every field falls back
//! to a default when it cannot be read, so a damaged payload still renders.

mod decoder;
mod flags;
mod record;

pub use decoder::{DetailFn, FormatRegistry, OperationDescription, PayloadDecoder};
pub use flags::GroupFlags;
pub use record::{
    decode_payload, DecodedPayload, FieldError, OperationSummary, TransactionId,
    FIELD_GROUPS, FIELD_OPERATION, FIELD_RECORD_FORMAT, FIELD_TRANSACTION,
};
