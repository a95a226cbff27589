//! Validated destination root for payload extraction.

use crate::PipelineError;
use crate::Result;
use std::path::Path;
use std::path::PathBuf;

/// A validated, canonicalized extraction root.
///
/// The type guarantees the wrapped path:
/// - exists on the filesystem,
/// - is a directory (not a file),
/// - is stored in absolute canonical form (symlinks resolved).
///
/// Callers must allocate a distinct, request-scoped root per pipeline run
/// (typically a fresh temporary directory) so concurrent requests never
/// share extraction state.
///
/// # Security Properties
///
/// Canonicalizing the root up front is what makes the containment check in
/// the extractor reliable: a candidate output path is compared against this
/// canonical form, so a symlinked root cannot be used to smuggle the payload
/// outside the directory the caller intended.
///
/// # Examples
///
/// ```no_run
/// use fb2drop_core::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/extraction")?;
/// println!("extracting under {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates a new `DestDir` after validating the path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the path does not exist,
    /// - the path exists but is not a directory,
    /// - the path cannot be canonicalized.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            return Err(PipelineError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("destination directory does not exist: {}", path.display()),
            )));
        }

        if !path.is_dir() {
            return Err(PipelineError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("path is not a directory: {}", path.display()),
            )));
        }

        let canonical = path.canonicalize().map_err(|e| {
            PipelineError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to canonicalize path {}: {}", path.display(), e),
            ))
        })?;

        Ok(Self(canonical))
    }

    /// Returns the canonical root as a `&Path`.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a relative path onto the root.
    ///
    /// This performs no validation on its own; the extractor re-verifies
    /// containment on the joined result.
    #[must_use]
    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.0.join(rel)
    }
}
