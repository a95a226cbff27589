//! Safe single-entry extraction.
//!
//! The extractor accepts only a [`ValidatedEntry`], so a raw entry cannot
//! reach this stage, and still re-verifies path containment after
//! canonicalization, because canonicalization can reveal traversal that
//! raw name inspection misses (symlinked intermediate directories). The
//! decompression stream runs through a [`BoundedWriter`] so that an entry
//! whose actual inflated size exceeds its declared size is aborted instead
//! of trusted.

use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use crate::PipelineError;
use crate::Result;
use crate::io::BoundedWriter;
use crate::policy::ValidatedEntry;
use crate::types::DestDir;

/// Slack allowed between declared and actual decompressed size, in bytes.
///
/// Accounts for stored-vs-streamed size bookkeeping differences without
/// giving a spoofed size field meaningful room.
const DECOMPRESSION_SLACK: u64 = 4096;

/// Outcome of a successful extraction.
///
/// Owned by the caller once returned; the engine keeps no reference to the
/// written payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Canonical path of the written payload, inside the destination root.
    pub payload_path: PathBuf,

    /// Original entry name, usable as a suggested output filename.
    pub entry_name: String,
}

/// Extracts the validated entry under the destination root.
///
/// The partial output file is removed on every failure path; on success
/// the returned path is canonical and guaranteed to be a descendant of the
/// canonicalized destination root.
///
/// # Errors
///
/// - [`PipelineError::PathEscape`]: the candidate path resolves outside
///   the destination root
/// - [`PipelineError::DecompressionMismatch`]: actual bytes exceeded the
///   declared size by more than the slack bound
/// - [`PipelineError::MalformedArchive`]: the container cannot be
///   reopened or the entry stream is corrupt
/// - [`PipelineError::Io`]: filesystem failure
pub fn extract<R: Read + Seek>(
    validated: &ValidatedEntry,
    reader: R,
    dest: &DestDir,
) -> Result<ExtractionResult> {
    let candidate = dest.join(validated.name());

    verify_containment(&candidate, dest)?;

    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|e| PipelineError::MalformedArchive(e.to_string()))?;
    let mut entry_stream = archive
        .by_index(validated.index)
        .map_err(|e| PipelineError::MalformedArchive(e.to_string()))?;

    let declared = validated.declared_size();
    let out = File::create(&candidate)?;
    let mut writer = BoundedWriter::new(out, declared.saturating_add(DECOMPRESSION_SLACK));

    if let Err(e) = std::io::copy(&mut entry_stream, &mut writer) {
        let written = writer.bytes_written();
        let exceeded = writer.budget_exceeded();
        drop(writer);
        remove_partial(&candidate);

        if exceeded {
            return Err(PipelineError::DecompressionMismatch { declared, written });
        }
        // The decoder reports corrupt entry data as InvalidData; anything
        // else is a genuine filesystem failure.
        if e.kind() == std::io::ErrorKind::InvalidData {
            return Err(PipelineError::MalformedArchive(e.to_string()));
        }
        return Err(e.into());
    }

    if let Err(e) = writer.flush() {
        drop(writer);
        remove_partial(&candidate);
        return Err(e.into());
    }

    let bytes_written = writer.bytes_written();
    drop(writer);

    // The file now exists, so the full path canonicalizes; re-check the
    // result rather than the prediction.
    let canonical = match candidate.canonicalize() {
        Ok(canonical) => canonical,
        Err(e) => {
            remove_partial(&candidate);
            return Err(e.into());
        }
    };
    if !canonical.starts_with(dest.as_path()) {
        remove_partial(&candidate);
        return Err(PipelineError::PathEscape { path: candidate });
    }

    tracing::debug!(
        payload = %canonical.display(),
        bytes = bytes_written,
        "entry extracted"
    );

    Ok(ExtractionResult {
        payload_path: canonical,
        entry_name: validated.name().to_string(),
    })
}

/// Verifies the candidate's parent directory resolves inside the root.
fn verify_containment(candidate: &Path, dest: &DestDir) -> Result<()> {
    let parent = candidate.parent().ok_or_else(|| PipelineError::PathEscape {
        path: candidate.to_path_buf(),
    })?;

    let canonical_parent = parent.canonicalize().map_err(|e| {
        PipelineError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to canonicalize parent: {e}"),
        ))
    })?;

    if !canonical_parent.starts_with(dest.as_path()) {
        return Err(PipelineError::PathEscape {
            path: candidate.to_path_buf(),
        });
    }

    Ok(())
}

fn remove_partial(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial payload");
        }
    }
}
