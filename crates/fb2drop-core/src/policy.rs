//! Archive acceptance policy.
//!
//! The validator inspects the ZIP central directory only; no payload data
//! is decompressed here. Checks run in a fixed order and short-circuit on
//! the first violation: container parse, entry count, extension, declared
//! name safety, compression ratio, absolute size. Name safety runs on the
//! *declared* name before any path is ever joined with a filesystem root;
//! the extractor re-verifies containment after canonicalization as a second
//! layer.

use std::io::Read;
use std::io::Seek;
use std::path::Path;

use crate::PipelineError;
use crate::PolicyConfig;
use crate::Result;

/// Entry metadata read from the archive central directory.
///
/// Declared sizes are attacker-controlled and are never used to size an
/// allocation without the ratio and absolute-size checks below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Declared entry name, exactly as stored in the archive.
    pub name: String,

    /// Declared uncompressed size in bytes.
    pub declared_uncompressed_size: u64,

    /// Declared compressed size in bytes.
    pub declared_compressed_size: u64,
}

/// Proof that a single archive entry passed the acceptance policy.
///
/// # Security Properties
///
/// - Can ONLY be constructed by [`validate`] (no public constructor,
///   no `From` impl), which prevents the extractor from ever operating
///   on unvetted entries.
/// - Wraps the sole entry of the archive it was derived from.
#[derive(Debug)]
pub struct ValidatedEntry {
    pub(crate) entry: ArchiveEntry,
    pub(crate) index: usize,
}

impl ValidatedEntry {
    /// Returns the declared entry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.entry.name
    }

    /// Returns the declared uncompressed size in bytes.
    #[must_use]
    pub fn declared_size(&self) -> u64 {
        self.entry.declared_uncompressed_size
    }
}

/// Validates an archive against the acceptance policy.
///
/// Reads the ZIP central directory without decompressing any payload data
/// and either approves the archive's sole entry or rejects with a
/// classified reason. Pure function of the archive bytes and the
/// configured thresholds; no side effects.
///
/// # Errors
///
/// - [`PipelineError::MalformedArchive`]: not parseable as ZIP
/// - [`PipelineError::WrongEntryCount`]: entry count differs from policy
/// - [`PipelineError::WrongFileType`]: wrong payload extension
/// - [`PipelineError::UnsafeEntryName`]: separators, root markers, `..`,
///   or a name that is not its own base name
/// - [`PipelineError::SuspiciousCompressionRatio`]: declared ratio over
///   the configured threshold
/// - [`PipelineError::PayloadTooLarge`]: declared size over the maximum
///
/// # Examples
///
/// ```no_run
/// use fb2drop_core::PolicyConfig;
/// use fb2drop_core::policy::validate;
/// use std::fs::File;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = PolicyConfig::default();
/// let archive = File::open("book.zip")?;
/// let validated = validate(archive, &config)?;
/// println!("approved entry {}", validated.name());
/// # Ok(())
/// # }
/// ```
pub fn validate<R: Read + Seek>(reader: R, config: &PolicyConfig) -> Result<ValidatedEntry> {
    let mut archive = zip::ZipArchive::new(reader)
        .map_err(|e| PipelineError::MalformedArchive(e.to_string()))?;

    let found = archive.len();
    if found != config.required_entry_count {
        return Err(PipelineError::WrongEntryCount {
            found,
            required: config.required_entry_count,
        });
    }

    // by_index_raw reads directory metadata without inflating the stream.
    let raw = archive
        .by_index_raw(0)
        .map_err(|e| PipelineError::MalformedArchive(e.to_string()))?;
    let entry = ArchiveEntry {
        name: raw.name().to_string(),
        declared_uncompressed_size: raw.size(),
        declared_compressed_size: raw.compressed_size(),
    };
    drop(raw);

    check_extension(&entry, config)?;
    check_entry_name(&entry)?;
    check_compression_ratio(&entry, config)?;
    check_payload_size(&entry, config)?;

    tracing::debug!(
        name = %entry.name,
        size = entry.declared_uncompressed_size,
        "archive entry approved"
    );

    Ok(ValidatedEntry { entry, index: 0 })
}

fn check_extension(entry: &ArchiveEntry, config: &PolicyConfig) -> Result<()> {
    if entry
        .name
        .to_ascii_lowercase()
        .ends_with(&config.extension_suffix())
    {
        return Ok(());
    }

    Err(PipelineError::WrongFileType {
        name: entry.name.clone(),
        required: config.required_extension.clone(),
    })
}

/// Rejects any declared name that is not a bare, safe base name.
///
/// Runs before any path join: separators (either flavor), root markers,
/// parent-directory segments, null bytes, and names whose normalized form
/// differs from their own base name are all refused.
fn check_entry_name(entry: &ArchiveEntry) -> Result<()> {
    let name = entry.name.as_str();

    let reject = || {
        Err(PipelineError::UnsafeEntryName {
            name: name.to_string(),
        })
    };

    if name.is_empty() || name.contains('\0') {
        return reject();
    }

    if name.contains('/') || name.contains('\\') {
        return reject();
    }

    if name.contains("..") && name.split('.').all(str::is_empty) {
        // Names like ".." or "..." are pure dot runs, never payloads.
        return reject();
    }

    // A safe name is its own base name after normalization.
    match Path::new(name).file_name() {
        Some(base) if base == std::ffi::OsStr::new(name) => Ok(()),
        _ => reject(),
    }
}

fn check_compression_ratio(entry: &ArchiveEntry, config: &PolicyConfig) -> Result<()> {
    if entry.declared_compressed_size == 0 {
        return Ok(());
    }

    let ratio =
        entry.declared_uncompressed_size as f64 / entry.declared_compressed_size as f64;

    if ratio > config.max_compression_ratio {
        return Err(PipelineError::SuspiciousCompressionRatio {
            compressed: entry.declared_compressed_size,
            uncompressed: entry.declared_uncompressed_size,
            ratio,
        });
    }

    Ok(())
}

fn check_payload_size(entry: &ArchiveEntry, config: &PolicyConfig) -> Result<()> {
    if entry.declared_uncompressed_size > config.max_payload_size {
        return Err(PipelineError::PayloadTooLarge {
            size: entry.declared_uncompressed_size,
            max: config.max_payload_size,
        });
    }

    Ok(())
}
