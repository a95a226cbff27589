//! Test utilities for building ZIP fixtures.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Write;

/// Builder for creating in-memory ZIP test archives.
///
/// # Examples
///
/// ```
/// use fb2drop_core::test_utils::ZipTestBuilder;
///
/// let zip_data = ZipTestBuilder::new()
///     .add_file("book.fb2", b"<FictionBook/>")
///     .build();
/// ```
pub struct ZipTestBuilder {
    zip: zip::ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipTestBuilder {
    /// Creates a new ZIP test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: zip::ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Adds a stored (uncompressed) file to the archive.
    #[must_use]
    pub fn add_file(mut self, path: &str, data: &[u8]) -> Self {
        use zip::write::SimpleFileOptions;

        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored)
            .unix_permissions(0o644);

        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a deflate-compressed file to the archive.
    #[must_use]
    pub fn add_deflated_file(mut self, path: &str, data: &[u8]) -> Self {
        use zip::write::SimpleFileOptions;

        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        self.zip.start_file(path, options).unwrap();
        self.zip.write_all(data).unwrap();
        self
    }

    /// Adds a directory entry to the archive.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        use zip::write::SimpleFileOptions;

        let options = SimpleFileOptions::default().unix_permissions(0o755);
        self.zip.add_directory(path, options).unwrap();
        self
    }

    /// Builds and returns the ZIP archive data.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.zip.finish().unwrap().into_inner()
    }
}

impl Default for ZipTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates a single-entry stored ZIP whose headers lie about the
/// uncompressed size.
///
/// The entry data is written verbatim, then the uncompressed-size field in
/// both the local file header and the central directory record is patched
/// to `declared`. Used to exercise the actual-vs-declared guard during
/// extraction.
#[must_use]
pub fn zip_with_spoofed_size(name: &str, data: &[u8], declared: u32) -> Vec<u8> {
    let mut bytes = ZipTestBuilder::new().add_file(name, data).build();

    // Local file header: uncompressed size at offset 22 from the PK\x03\x04
    // signature. Exactly one entry, so the header sits at offset 0.
    assert_eq!(&bytes[0..4], b"PK\x03\x04");
    bytes[22..26].copy_from_slice(&declared.to_le_bytes());

    // Central directory record: uncompressed size at offset 24 from the
    // PK\x01\x02 signature. Scan from the end to skip any payload bytes
    // that happen to contain the signature.
    let sig = b"PK\x01\x02";
    let cd = (0..=bytes.len() - 4)
        .rev()
        .find(|&i| &bytes[i..i + 4] == sig)
        .expect("central directory record not found");
    bytes[cd + 24..cd + 28].copy_from_slice(&declared.to_le_bytes());

    bytes
}

/// Creates a single-entry deflated ZIP whose compressed stream is corrupt.
///
/// The first byte of the entry data is overwritten with an invalid deflate
/// block header, so the decoder fails on the first read while every
/// directory field stays intact. Used to exercise stream-corruption
/// classification during extraction.
#[must_use]
pub fn zip_with_corrupt_stream(name: &str, data: &[u8]) -> Vec<u8> {
    let mut bytes = ZipTestBuilder::new().add_deflated_file(name, data).build();

    // Entry data follows the local file header: 30 fixed bytes plus the
    // name and extra fields, whose lengths sit at offsets 26 and 28.
    assert_eq!(&bytes[0..4], b"PK\x03\x04");
    let name_len = u16::from_le_bytes([bytes[26], bytes[27]]) as usize;
    let extra_len = u16::from_le_bytes([bytes[28], bytes[29]]) as usize;
    let data_start = 30 + name_len + extra_len;

    // 0xff sets the reserved deflate block type.
    bytes[data_start] = 0xff;
    bytes
}

/// Returns a minimal well-formed FB2 document with the given title and
/// author names in the FictionBook 2.0 namespace.
#[must_use]
pub fn fb2_document(title: &str, first_name: &str, last_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<FictionBook xmlns="http://www.gribuser.ru/xml/fictionbook/2.0">
  <description>
    <title-info>
      <author>
        <first-name>{first_name}</first-name>
        <last-name>{last_name}</last-name>
      </author>
      <book-title>{title}</book-title>
    </title-info>
  </description>
  <body>
    <section><p>text</p></section>
  </body>
</FictionBook>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_builder() {
        let zip_data = ZipTestBuilder::new()
            .add_file("book.fb2", b"content")
            .build();
        assert!(!zip_data.is_empty());
    }

    #[test]
    fn test_spoofed_size_zip_parses() {
        let data = zip_with_spoofed_size("book.fb2", b"0123456789", 3);
        let archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_fb2_document_contains_namespace() {
        let doc = fb2_document("Title", "First", "Last");
        assert!(doc.contains("http://www.gribuser.ru/xml/fictionbook/2.0"));
    }
}
