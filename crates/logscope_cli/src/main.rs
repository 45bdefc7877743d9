//! logscope CLI
//!
//! Command-line reader for write-ahead log files.
//!
//! # Commands
//!
//! - `dump` - Render a log file as an XML report
//! - `scan` - List frame boundaries without decoding payloads
//! - `version` - Show version information

mod commands;
mod keys;

use clap::{Parser, Subcommand, ValueEnum};
use commands::dump::DumpOptions;
use logscope_core::IntegrityPolicy;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Forensic reader for write-ahead log files.
#[derive(Parser)]
#[command(name = "logscope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a log file as an XML report
    Dump {
        /// Log file to read
        path: PathBuf,

        /// Decode operations fully instead of just their type names
        #[arg(short, long)]
        full: bool,

        /// Start at this byte offset instead of the file header
        #[arg(short = 'p', long, default_value = "0")]
        offset: u64,

        /// Maximum number of records to read
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// JSON file mapping format ids to operation names
        #[arg(short, long)]
        registry: Option<PathBuf>,

        /// What to do when frame lengths or the file header look wrong
        #[arg(long, value_enum, default_value_t = Checks::Warn)]
        checks: Checks,

        #[command(flatten)]
        encryption: EncryptionArgs,
    },

    /// List frame boundaries without decoding payloads
    Scan {
        /// Log file to read
        path: PathBuf,

        /// Start at this byte offset instead of the file header
        #[arg(short = 'p', long, default_value = "0")]
        offset: u64,

        /// Maximum number of frames to list
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        #[command(flatten)]
        encryption: EncryptionArgs,
    },

    /// Show version information
    Version,
}

#[derive(clap::Args)]
struct EncryptionArgs {
    /// AES key in hex (128 or 256 bits) for encrypted logs
    #[arg(long)]
    key: Option<String>,

    /// AES-CBC initialization vector in hex (defaults to zeros)
    #[arg(long, requires = "key")]
    iv: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Checks {
    /// Skip the checks
    Ignore,
    /// Report problems as warnings and keep reading
    Warn,
    /// Stop at the first problem
    Fail,
}

impl From<Checks> for IntegrityPolicy {
    fn from(checks: Checks) -> Self {
        match checks {
            Checks::Ignore => IntegrityPolicy::Ignore,
            Checks::Warn => IntegrityPolicy::Warn,
            Checks::Fail => IntegrityPolicy::Fail,
        }
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the report
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let clean = match cli.command {
        Commands::Dump {
            path,
            full,
            offset,
            limit,
            registry,
            checks,
            encryption,
        } => {
            let options = DumpOptions {
                offset,
                limit,
                full,
                checks: checks.into(),
                registry,
                key: encryption.key,
                iv: encryption.iv,
            };
            commands::dump::run(&path, &options)?
        }
        Commands::Scan {
            path,
            offset,
            limit,
            format,
            encryption,
        } => commands::scan::run(
            &path,
            offset,
            limit,
            encryption.key.as_deref(),
            encryption.iv.as_deref(),
            &format,
        )?,
        Commands::Version => {
            println!("logscope CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("logscope Core v{}", logscope_core::VERSION);
            true
        }
    };

    Ok(if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
