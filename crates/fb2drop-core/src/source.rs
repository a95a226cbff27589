//! Byte source seam for the embedding transport.
//!
//! The engine never fetches anything itself; the transport hands it a
//! [`ByteSource`] that resolves an opaque content reference (a chat file
//! id, a URL token, a local path) into archive bytes. Retry and backoff
//! for transient fetch failures live entirely on the transport side.

use std::path::Path;
use std::path::PathBuf;

use crate::PipelineError;
use crate::Result;

/// Produces raw archive bytes for an opaque content reference.
pub trait ByteSource {
    /// Fetches the full archive byte stream for `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::TransportFetchFailed`] when the bytes
    /// cannot be produced; the engine propagates this verbatim without
    /// retrying.
    fn fetch(&mut self, reference: &str) -> Result<Vec<u8>>;
}

/// Byte source backed by the local filesystem.
///
/// Resolves references as paths relative to a base directory. Useful for
/// embeddings where the transport has already downloaded the archive to a
/// spool directory, and for tests.
#[derive(Debug, Clone)]
pub struct FsByteSource {
    base: PathBuf,
}

impl FsByteSource {
    /// Creates a source rooted at `base`.
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl ByteSource for FsByteSource {
    fn fetch(&mut self, reference: &str) -> Result<Vec<u8>> {
        let path = self.base.join(Path::new(reference));
        std::fs::read(&path).map_err(|e| {
            PipelineError::TransportFetchFailed(format!("{}: {e}", path.display()))
        })
    }
}
