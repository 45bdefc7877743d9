//! The payload decoder interface and its table-driven implementation.

use crate::error::{CoreError, CoreResult};
use logscope_codec::{read_format_id, ByteReader, FILE_STREAM_LOG_FILE, LOG_RECORD, RAW_STORE_XACT_ID};
use std::collections::HashMap;
use std::path::Path;

/// Full description of a logged operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescription {
    /// Human-readable type name.
    pub type_name: String,
    /// Rendered content of the operation, if the decoder produced one.
    pub detail: Option<String>,
}

impl OperationDescription {
    /// Creates a description.
    pub fn new(type_name: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            type_name: type_name.into(),
            detail,
        }
    }
}

/// Turns operation format ids and bytes into readable descriptions.
///
/// The reader never interprets operation bodies itself. Failures from
/// either method are recorded on the decoded payload and the walk goes on.
pub trait PayloadDecoder: Send + Sync {
    /// Returns the type name registered for an operation format id.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown.
    fn decode_header(&self, format_id: u16) -> CoreResult<String>;

    /// Reconstructs an operation from its serialized bytes, starting at
    /// the operation's format id.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be decoded.
    fn decode_full(&self, bytes: &[u8]) -> CoreResult<OperationDescription>;
}

/// Renders an operation body (the bytes after its format id).
pub type DetailFn = fn(&[u8]) -> CoreResult<String>;

/// A [`PayloadDecoder`] backed by a table of format ids.
///
/// Names can be registered in code or loaded from a JSON object mapping
/// ids to names:
///
/// ```
/// use logscope_core::payload::{FormatRegistry, PayloadDecoder};
///
/// let registry = FormatRegistry::from_json(r#"{ "101": "InsertOperation" }"#).unwrap();
/// assert_eq!(registry.decode_header(101).unwrap(), "InsertOperation");
/// assert!(registry.decode_header(102).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    names: HashMap<u16, String>,
    details: HashMap<u16, DetailFn>,
}

impl FormatRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the format ids of the log structure itself.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(FILE_STREAM_LOG_FILE, "LogFile");
        registry.register(LOG_RECORD, "LogRecord");
        registry.register(RAW_STORE_XACT_ID, "TransactionId");
        registry
    }

    /// Parses a registry from a JSON object of `"<format id>": "<name>"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a key is not a
    /// 16-bit format id.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let names: HashMap<u16, String> = serde_json::from_str(json)
            .map_err(|e| CoreError::invalid_format(format!("format registry: {e}")))?;
        Ok(Self {
            names,
            details: HashMap::new(),
        })
    }

    /// Loads a registry from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Registers a type name, replacing any previous one.
    pub fn register(&mut self, format_id: u16, name: impl Into<String>) -> &mut Self {
        self.names.insert(format_id, name.into());
        self
    }

    /// Registers a type name and a function rendering its body.
    pub fn register_detail(
        &mut self,
        format_id: u16,
        name: impl Into<String>,
        detail: DetailFn,
    ) -> &mut Self {
        self.names.insert(format_id, name.into());
        self.details.insert(format_id, detail);
        self
    }

    /// Merges another registry into this one; entries of `other` win.
    pub fn extend(&mut self, other: Self) -> &mut Self {
        self.names.extend(other.names);
        self.details.extend(other.details);
        self
    }

    /// Name registered for a format id.
    #[must_use]
    pub fn name(&self, format_id: u16) -> Option<&str> {
        self.names.get(&format_id).map(String::as_str)
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no names are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl PayloadDecoder for FormatRegistry {
    fn decode_header(&self, format_id: u16) -> CoreResult<String> {
        self.name(format_id)
            .map(str::to_owned)
            .ok_or_else(|| CoreError::operation_decode(format!("unregistered format id {format_id}")))
    }

    fn decode_full(&self, bytes: &[u8]) -> CoreResult<OperationDescription> {
        let mut reader = ByteReader::new(bytes);
        let format_id = read_format_id(&mut reader)
            .map_err(|e| CoreError::operation_decode(format!("missing format id: {e}")))?;
        let type_name = self.decode_header(format_id)?;

        let detail = match self.details.get(&format_id) {
            Some(render) => Some(render(reader.remaining())?),
            None => None,
        };

        Ok(OperationDescription { type_name, detail })
    }
}
