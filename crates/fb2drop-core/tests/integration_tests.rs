//! End-to-end pipeline tests with real filesystem operations.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::field_reassign_with_default)]

use fb2drop_core::test_utils::ZipTestBuilder;
use fb2drop_core::test_utils::fb2_document;
use fb2drop_core::test_utils::zip_with_spoofed_size;
use fb2drop_core::{DestDir, PipelineError, PolicyConfig, process_archive};
use std::io::Cursor;
use tempfile::TempDir;

fn fresh_dest() -> (TempDir, DestDir) {
    let temp = TempDir::new().unwrap();
    let dest = DestDir::new(temp.path().to_path_buf()).unwrap();
    (temp, dest)
}

#[test]
fn test_single_entry_no_metadata_completes() {
    // book.fb2, ~1 KiB, mild compression, no title/author elements.
    let body = format!(
        "<FictionBook xmlns=\"http://www.gribuser.ru/xml/fictionbook/2.0\"><body>{}</body></FictionBook>",
        "<p>line</p>".repeat(80)
    );
    let data = ZipTestBuilder::new()
        .add_deflated_file("book.fb2", body.as_bytes())
        .build();
    let (_temp, dest) = fresh_dest();

    let book = process_archive(Cursor::new(data), &dest, &PolicyConfig::default()).unwrap();

    assert_eq!(book.suggested_filename, "book.fb2");
    assert!(book.metadata.is_empty());
    assert!(book.metadata.caption().is_none());
}

#[test]
fn test_two_entry_archive_rejected() {
    let data = ZipTestBuilder::new()
        .add_file("one.fb2", b"<x/>")
        .add_file("two.fb2", b"<x/>")
        .build();
    let (_temp, dest) = fresh_dest();

    let result = process_archive(Cursor::new(data), &dest, &PolicyConfig::default());
    assert!(matches!(
        result,
        Err(PipelineError::WrongEntryCount {
            found: 2,
            required: 1
        })
    ));
}

#[test]
fn test_traversal_entry_name_rejected() {
    let data = ZipTestBuilder::new()
        .add_file("../../etc/passwd.fb2", b"pwned")
        .build();
    let (temp, dest) = fresh_dest();

    let result = process_archive(Cursor::new(data), &dest, &PolicyConfig::default());
    assert!(matches!(result, Err(PipelineError::UnsafeEntryName { .. })));
    assert_eq!(
        std::fs::read_dir(temp.path()).unwrap().count(),
        0,
        "nothing may be written for a rejected archive"
    );
}

#[test]
fn test_declared_bomb_rejected_before_inflation() {
    // Central directory claims 1 GiB from 1 KiB: ratio 1,048,576:1.
    // Only directory metadata is inspected; no CPU is spent inflating.
    let payload = vec![b'a'; 1024];
    let data = zip_with_spoofed_size("bomb.fb2", &payload, 1 << 30);
    let (_temp, dest) = fresh_dest();

    let result = process_archive(Cursor::new(data), &dest, &PolicyConfig::default());
    assert!(matches!(
        result,
        Err(PipelineError::SuspiciousCompressionRatio { .. })
    ));
}

#[test]
fn test_valid_archive_with_metadata_completes() {
    let doc = fb2_document("Fathers and Sons", "Ivan", "Turgenev");
    let data = ZipTestBuilder::new()
        .add_deflated_file("fathers.fb2", doc.as_bytes())
        .build();
    let (_temp, dest) = fresh_dest();

    let book = process_archive(Cursor::new(data), &dest, &PolicyConfig::default()).unwrap();

    assert_eq!(book.metadata.title.as_deref(), Some("Fathers and Sons"));
    assert_eq!(book.metadata.author.as_deref(), Some("Ivan Turgenev"));
    assert_eq!(
        std::fs::read(&book.payload_path).unwrap(),
        doc.as_bytes()
    );
}

#[test]
fn test_oversized_declared_payload_rejected() {
    let mut config = PolicyConfig::default();
    config.max_payload_size = 16;

    let data = ZipTestBuilder::new()
        .add_file("book.fb2", &[b'x'; 64])
        .build();
    let (_temp, dest) = fresh_dest();

    let result = process_archive(Cursor::new(data), &dest, &config);
    assert!(matches!(
        result,
        Err(PipelineError::PayloadTooLarge { size: 64, max: 16 })
    ));
}

#[test]
fn test_wrong_extension_rejected() {
    let data = ZipTestBuilder::new().add_file("book.epub", b"zipzip").build();
    let (_temp, dest) = fresh_dest();

    let result = process_archive(Cursor::new(data), &dest, &PolicyConfig::default());
    assert!(matches!(result, Err(PipelineError::WrongFileType { .. })));
}

#[test]
fn test_configured_extension_accepted() {
    let mut config = PolicyConfig::default();
    config.required_extension = "xml".to_string();

    let data = ZipTestBuilder::new().add_file("doc.xml", b"<x/>").build();
    let (_temp, dest) = fresh_dest();

    assert!(process_archive(Cursor::new(data), &dest, &config).is_ok());
}

#[test]
fn test_garbage_bytes_are_malformed() {
    let (_temp, dest) = fresh_dest();
    let result = process_archive(
        Cursor::new(b"not a zip at all".to_vec()),
        &dest,
        &PolicyConfig::default(),
    );
    assert!(matches!(result, Err(PipelineError::MalformedArchive(_))));
}

#[test]
fn test_directory_entry_counts_against_policy() {
    // A folder plus a file is two entries; archives with any internal
    // structure are refused.
    let data = ZipTestBuilder::new()
        .add_directory("books/")
        .add_file("books/book.fb2", b"<x/>")
        .build();
    let (_temp, dest) = fresh_dest();

    let result = process_archive(Cursor::new(data), &dest, &PolicyConfig::default());
    assert!(matches!(
        result,
        Err(PipelineError::WrongEntryCount { found: 2, .. })
    ));
}

#[test]
fn test_spoofed_size_detected_during_extraction() {
    // Declared 64 bytes, actually inflates to 1 MiB of stored data.
    let data = zip_with_spoofed_size("book.fb2", &vec![b'z'; 1 << 20], 64);
    let (temp, dest) = fresh_dest();

    let result = process_archive(Cursor::new(data), &dest, &PolicyConfig::default());
    assert!(matches!(
        result,
        Err(PipelineError::DecompressionMismatch { declared: 64, .. })
    ));
    assert!(
        !temp.path().join("book.fb2").exists(),
        "partial payload must be cleaned up"
    );
}

#[test]
fn test_symlinked_destination_root_containment() {
    #[cfg(unix)]
    {
        let temp = TempDir::new().unwrap();
        let real = temp.path().join("real");
        let link = temp.path().join("link");
        std::fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let data = ZipTestBuilder::new().add_file("book.fb2", b"<x/>").build();
        let dest = DestDir::new(&link).unwrap();

        let book = process_archive(Cursor::new(data), &dest, &PolicyConfig::default()).unwrap();
        let canonical_root = real.canonicalize().unwrap();
        assert!(
            book.payload_path.starts_with(&canonical_root),
            "payload must land under the canonicalized root"
        );
    }
}

#[test]
fn test_distinct_classifications_render_distinctly() {
    // The transport keys its user-facing messages off the classification,
    // so every policy failure must stringify differently.
    let cases: Vec<(Vec<u8>, &str)> = vec![
        (ZipTestBuilder::new().build(), "exactly"),
        (
            ZipTestBuilder::new().add_file("a.txt", b"x").build(),
            "extension",
        ),
        (
            ZipTestBuilder::new()
                .add_file("dir/a.fb2", b"x")
                .build(),
            "unsafe entry name",
        ),
        (b"junk".to_vec(), "invalid archive"),
    ];

    let config = PolicyConfig::default();
    for (data, needle) in cases {
        let (_temp, dest) = fresh_dest();
        let err = process_archive(Cursor::new(data), &dest, &config).unwrap_err();
        assert!(
            err.to_string().contains(needle),
            "expected {needle:?} in {err}"
        );
    }
}
