//! Dump command implementation.

use crate::keys::decryption_context;
use logscope_core::{
    DecodeDepth, FormatRegistry, IntegrityPolicy, LogReader, ReaderConfig, ReportWriter,
};
use logscope_storage::FileBackend;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Options for the dump command.
#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
    /// Offset of the first frame; 0 reads the file header.
    pub offset: u64,
    /// Maximum number of frames.
    pub limit: Option<usize>,
    /// Decode operations fully instead of by type name.
    pub full: bool,
    /// Policy for length and header checks.
    pub checks: IntegrityPolicy,
    /// JSON file of additional format names.
    pub registry: Option<PathBuf>,
    /// AES key in hex.
    pub key: Option<String>,
    /// AES IV in hex.
    pub iv: Option<String>,
}

/// Runs the dump command, writing the report to stdout.
///
/// Returns `false` if the walk stopped on an error.
pub fn run(path: &Path, options: &DumpOptions) -> Result<bool, Box<dyn std::error::Error>> {
    let stdout = io::stdout();
    write_report(path, options, BufWriter::new(stdout.lock()))
}

/// Runs the dump command, writing the report to `out`.
pub fn write_report<W: Write>(
    path: &Path,
    options: &DumpOptions,
    out: W,
) -> Result<bool, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("log file not found: {}", path.display()).into());
    }

    let backend = FileBackend::open(path)?;

    let mut registry = FormatRegistry::builtin();
    if let Some(file) = &options.registry {
        let loaded = FormatRegistry::load(file)?;
        info!(path = %file.display(), formats = loaded.len(), "loaded format registry");
        registry.extend(loaded);
    }

    let depth = if options.full {
        DecodeDepth::Full
    } else {
        DecodeDepth::HeaderOnly
    };
    let config = ReaderConfig::new()
        .start_offset(options.offset)
        .max_records(options.limit)
        .depth(depth)
        .length_check(options.checks)
        .header_check(options.checks);

    let mut reader = LogReader::new(config, Box::new(registry));
    if let Some(key) = &options.key {
        reader = reader.with_decryption(decryption_context(key, options.iv.as_deref())?);
    }

    let mut report = ReportWriter::new(out);
    let result = reader.walk(&backend, &mut report)?;
    report.finish()?;

    if let Some(err) = &result.terminal_error {
        error!(
            error = %err,
            records = result.records_processed,
            "log could not be read to the end"
        );
    }
    Ok(result.is_clean())
}
