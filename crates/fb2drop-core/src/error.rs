//! Failure classification for the archive processing pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PipelineError`.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can halt the archive processing pipeline.
///
/// This is a closed set: every variant maps to a distinct caller-visible
/// classification, and the embedding transport is expected to render a
/// distinct message per variant rather than a generic failure. Metadata
/// extraction degradation is deliberately *not* represented here; it is
/// recovered locally and only logged.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The byte source could not produce the archive bytes.
    ///
    /// Retry/backoff for transient fetch failures belongs to the
    /// embedding transport, never to this engine.
    #[error("failed to fetch archive bytes: {0}")]
    TransportFetchFailed(String),

    /// The container could not be parsed as a ZIP archive.
    #[error("invalid archive: {0}")]
    MalformedArchive(String),

    /// The archive does not contain exactly the required number of entries.
    #[error("archive must contain exactly {required} entry, found {found}")]
    WrongEntryCount {
        /// Number of entries found in the central directory.
        found: usize,
        /// Number of entries the policy requires.
        required: usize,
    },

    /// The single entry does not carry the required payload extension.
    #[error("entry {name:?} does not have the required .{required} extension")]
    WrongFileType {
        /// Declared entry name.
        name: String,
        /// Required extension, without the leading dot.
        required: String,
    },

    /// The declared entry name is not a bare, safe base name.
    #[error("unsafe entry name: {name:?}")]
    UnsafeEntryName {
        /// Declared entry name as stored in the archive.
        name: String,
    },

    /// Declared sizes indicate a potential decompression bomb.
    #[error(
        "suspicious compression ratio: compressed={compressed} bytes, uncompressed={uncompressed} bytes (ratio: {ratio:.2})"
    )]
    SuspiciousCompressionRatio {
        /// Declared compressed size in bytes.
        compressed: u64,
        /// Declared uncompressed size in bytes.
        uncompressed: u64,
        /// Declared compression ratio.
        ratio: f64,
    },

    /// The declared uncompressed size exceeds the configured maximum.
    #[error("payload too large: {size} bytes exceeds maximum of {max} bytes")]
    PayloadTooLarge {
        /// Declared uncompressed size in bytes.
        size: u64,
        /// Configured maximum payload size in bytes.
        max: u64,
    },

    /// The extraction path escapes the destination root after
    /// canonicalization.
    #[error("extraction path escapes destination root: {path}")]
    PathEscape {
        /// The offending candidate path.
        path: PathBuf,
    },

    /// Actual decompressed bytes exceeded the declared size.
    #[error("decompressed size mismatch: declared {declared} bytes, aborted after {written} bytes")]
    DecompressionMismatch {
        /// Size declared in the central directory.
        declared: u64,
        /// Bytes written before the guard aborted.
        written: u64,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Returns `true` if this error represents a security policy violation
    /// (as opposed to a malformed input or an environmental failure).
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::UnsafeEntryName { .. }
                | Self::SuspiciousCompressionRatio { .. }
                | Self::PayloadTooLarge { .. }
                | Self::PathEscape { .. }
                | Self::DecompressionMismatch { .. }
        )
    }

    /// Returns `true` if the failure originated outside the engine
    /// (byte source fetch or filesystem I/O).
    #[must_use]
    pub const fn is_external(&self) -> bool {
        matches!(self, Self::TransportFetchFailed(_) | Self::Io(_))
    }
}
