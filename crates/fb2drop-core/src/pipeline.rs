//! Single-shot processing pipeline.
//!
//! Stages run strictly in sequence, each one fully completing before the
//! next begins: `Received → Validated → Extracted → MetadataResolved →
//! Completed`. Any classified failure is terminal for the run; there are
//! no retries and no re-entry of the same pipeline instance. The engine
//! is stateless between calls apart from the caller-supplied read-only
//! configuration, so it can be driven from any concurrency model as long
//! as each request gets its own destination root.

use std::fs::File;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use std::path::PathBuf;

use crate::BookMetadata;
use crate::PolicyConfig;
use crate::Result;
use crate::extract;
use crate::metadata;
use crate::policy;
use crate::source::ByteSource;
use crate::types::DestDir;

/// Pipeline stage marker.
///
/// `Failed` is represented by the `Err` arm of the pipeline result; every
/// other state is entered exactly once, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Archive bytes are available, nothing verified yet.
    Received,
    /// The sole entry passed the acceptance policy.
    Validated,
    /// The payload was written under the destination root.
    Extracted,
    /// A `BookMetadata` value exists (possibly all-absent).
    MetadataResolved,
    /// Terminal success state.
    Completed,
}

/// Input contract of the transport-owned result composer.
///
/// Owned by the caller for the rest of the request; the engine holds no
/// reference to the payload after returning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedBook {
    /// Canonical path of the extracted payload.
    pub payload_path: PathBuf,

    /// Original entry name, suitable as an outgoing document filename.
    pub suggested_filename: String,

    /// Best-effort descriptive metadata.
    pub metadata: BookMetadata,
}

/// Runs the full pipeline over an archive byte stream.
///
/// Validates the archive against the acceptance policy, extracts its sole
/// entry under `dest`, and derives best-effort metadata from the payload.
/// The payload file is removed on any failure after extraction began.
///
/// # Errors
///
/// Any classified [`crate::PipelineError`] halts the run and is surfaced
/// verbatim; metadata extraction never contributes a failure.
///
/// # Examples
///
/// ```no_run
/// use fb2drop_core::{DestDir, PolicyConfig, process_archive};
/// use std::io::Cursor;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let archive_bytes: Vec<u8> = std::fs::read("book.zip")?;
/// let dest = DestDir::new("/tmp/request-1234")?;
/// let config = PolicyConfig::default();
///
/// let book = process_archive(Cursor::new(archive_bytes), &dest, &config)?;
/// println!("{} extracted", book.suggested_filename);
/// if let Some(caption) = book.metadata.caption() {
///     println!("{caption}");
/// }
/// # Ok(())
/// # }
/// ```
pub fn process_archive<R: Read + Seek>(
    mut reader: R,
    dest: &DestDir,
    config: &PolicyConfig,
) -> Result<ProcessedBook> {
    let mut state = PipelineState::Received;
    tracing::debug!(?state, "pipeline started");

    let validated = policy::validate(&mut reader, config)?;
    state = PipelineState::Validated;
    tracing::debug!(?state, entry = validated.name(), "policy passed");

    reader.seek(SeekFrom::Start(0))?;
    let extraction = extract::extract(&validated, &mut reader, dest)?;
    state = PipelineState::Extracted;
    tracing::debug!(?state, payload = %extraction.payload_path.display(), "payload written");

    let payload = match std::fs::read(&extraction.payload_path) {
        Ok(payload) => payload,
        Err(e) => {
            discard_payload(&extraction.payload_path);
            return Err(e.into());
        }
    };
    let book_metadata = metadata::extract_metadata(&payload, config);
    state = PipelineState::MetadataResolved;
    tracing::debug!(?state, empty = book_metadata.is_empty(), "metadata resolved");

    state = PipelineState::Completed;
    tracing::debug!(?state, "pipeline completed");

    Ok(ProcessedBook {
        payload_path: extraction.payload_path,
        suggested_filename: extraction.entry_name,
        metadata: book_metadata,
    })
}

/// Runs the pipeline over an archive already on the local filesystem.
///
/// Convenience for transports that spool the download to a temporary file
/// before processing begins.
///
/// # Errors
///
/// Same as [`process_archive`], plus [`crate::PipelineError::Io`] when the
/// archive file cannot be opened.
pub fn process_archive_file(
    archive_path: impl AsRef<Path>,
    dest: &DestDir,
    config: &PolicyConfig,
) -> Result<ProcessedBook> {
    let file = File::open(archive_path.as_ref())?;
    process_archive(file, dest, config)
}

/// Fetches an archive through a [`ByteSource`] and runs the pipeline.
///
/// # Errors
///
/// [`crate::PipelineError::TransportFetchFailed`] when the source cannot
/// produce the bytes, otherwise the same as [`process_archive`].
pub fn process_reference<S: ByteSource>(
    source: &mut S,
    reference: &str,
    dest: &DestDir,
    config: &PolicyConfig,
) -> Result<ProcessedBook> {
    let bytes = source.fetch(reference)?;
    process_archive(Cursor::new(bytes), dest, config)
}

fn discard_payload(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "failed to discard payload");
        }
    }
}
