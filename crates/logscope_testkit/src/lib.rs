//! # logscope Testkit
//!
//! Test utilities for logscope.
//!
//! This crate provides:
//! - Byte-exact log file and payload builders
//! - Stub payload decoders
//! - Property-based test generators using proptest
//! - Golden report comparison
//!
//! ## Usage
//!
//! ```rust
//! use logscope_testkit::prelude::*;
//!
//! let log = LogFileBuilder::new()
//!     .frame(&PayloadBuilder::new(300).groups(0x1).build())
//!     .end_marker()
//!     .build();
//! let decoder = StubDecoder::new("Foo", Some("bar=1"));
//! # let _ = (log, decoder);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod golden;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::golden::*;
}

pub use fixtures::*;
pub use generators::*;
pub use golden::*;
