//! Safe single-entry ZIP validation and FB2 metadata extraction.
//!
//! `fb2drop-core` takes an untrusted ZIP archive, verifies it against a
//! strict structural and size policy (exactly one entry, safe bare name,
//! bounded compression ratio and payload size), extracts that one payload
//! under a caller-chosen root with zip-slip and decompression-bomb
//! defenses, and derives best-effort title/author metadata from the
//! payload's FictionBook XML.
//!
//! The crate is a library for an embedding transport: it owns no network,
//! CLI, or user-facing text, and every failure carries a distinct
//! classification the transport can render.
//!
//! # Examples
//!
//! ```no_run
//! use fb2drop_core::{DestDir, PolicyConfig, process_archive};
//! use std::io::Cursor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = std::fs::read("book.zip")?;
//! let dest = DestDir::new("/tmp/request")?;
//! let config = PolicyConfig::default();
//!
//! let book = process_archive(Cursor::new(archive), &dest, &config)?;
//! println!("extracted {}", book.suggested_filename);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod extract;
pub mod io;
pub mod metadata;
pub mod pipeline;
pub mod policy;
pub mod source;
pub mod test_utils;
pub mod types;

// Re-export main API types
pub use config::PolicyConfig;
pub use error::PipelineError;
pub use error::Result;
pub use extract::ExtractionResult;
pub use metadata::BookMetadata;
pub use pipeline::PipelineState;
pub use pipeline::ProcessedBook;
pub use pipeline::process_archive;
pub use pipeline::process_archive_file;
pub use pipeline::process_reference;
pub use policy::ValidatedEntry;
pub use source::ByteSource;
pub use source::FsByteSource;
pub use types::DestDir;
