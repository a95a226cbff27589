//! Best-effort FB2 metadata extraction.
//!
//! FictionBook (FB2) is a single-XML e-book format; the descriptive
//! metadata lives in `<description>/<title-info>` under the FictionBook
//! 2.0 namespace. Extraction is strictly best-effort: slightly invalid
//! markup (mismatched end tags) is tolerated, and any unrecoverable parse
//! problem, missing namespace, or absent element leaves the affected
//! fields empty and never fails the pipeline.
//!
//! The streaming pull parser is defensive by construction: it resolves no
//! external entities, performs no network access, and expands no custom
//! entity definitions, so a hostile document can neither leak local files
//! nor amplify memory through entity expansion.

use quick_xml::events::Event;
use quick_xml::name::Namespace;
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use crate::PolicyConfig;

/// FictionBook 2.0 document namespace.
const FB2_NS: &[u8] = b"http://www.gribuser.ru/xml/fictionbook/2.0";

/// Maximum title length kept, in code units.
const MAX_TITLE_LEN: usize = 255;

/// Descriptive metadata derived from an FB2 payload.
///
/// Both fields default to absent; a value of `BookMetadata::default()` is
/// always a valid extraction outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookMetadata {
    /// Book title from the first `book-title` element, at most 255 code
    /// units.
    pub title: Option<String>,

    /// Author composed from `first-name`/`last-name` under the first
    /// `author` element.
    pub author: Option<String>,
}

impl BookMetadata {
    /// Returns `true` if no metadata was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none()
    }

    /// Composes a human-readable book description, or `None` when no
    /// metadata is available.
    #[must_use]
    pub fn caption(&self) -> Option<String> {
        match (&self.title, &self.author) {
            (Some(title), Some(author)) => Some(format!("\"{title}\" by {author}")),
            (Some(title), None) => Some(format!("\"{title}\"")),
            (None, Some(author)) => Some(format!("Book by {author}")),
            (None, None) => None,
        }
    }
}

/// Which element's character data is currently being captured.
enum Capture {
    Title,
    FirstName,
    LastName,
}

/// Extracts title and author metadata from FB2 payload bytes.
///
/// Never fails: oversized payloads are skipped entirely (cost bounding),
/// and internal errors degrade to whatever was already found, with a
/// diagnostic warning logged. The first matching element in document order
/// wins for both fields.
#[must_use]
pub fn extract_metadata(payload: &[u8], config: &PolicyConfig) -> BookMetadata {
    if payload.len() as u64 > config.max_payload_size {
        tracing::warn!(
            size = payload.len(),
            max = config.max_payload_size,
            "payload too large for metadata extraction, skipping"
        );
        return BookMetadata::default();
    }

    let mut reader = NsReader::from_reader(payload);
    // Books in the wild carry sloppy markup; a mismatched end tag before
    // the description must not abort the scan.
    reader.check_end_names(false);
    let mut buf = Vec::new();

    let mut title: Option<String> = None;
    let mut first_name: Option<String> = None;
    let mut last_name: Option<String> = None;
    let mut author_done = false;
    let mut in_author = false;
    let mut capture: Option<Capture> = None;
    let mut text = String::new();

    loop {
        match reader.read_resolved_event_into(&mut buf) {
            Ok((ResolveResult::Bound(Namespace(ns)), Event::Start(e))) if ns == FB2_NS => {
                match e.local_name().as_ref() {
                    b"book-title" if title.is_none() && capture.is_none() => {
                        text.clear();
                        capture = Some(Capture::Title);
                    }
                    b"author" if !author_done && !in_author => {
                        in_author = true;
                    }
                    b"first-name" if in_author && first_name.is_none() => {
                        text.clear();
                        capture = Some(Capture::FirstName);
                    }
                    b"last-name" if in_author && last_name.is_none() => {
                        text.clear();
                        capture = Some(Capture::LastName);
                    }
                    _ => {}
                }
            }
            Ok((_, Event::Text(t))) => {
                if capture.is_some() {
                    match t.unescape() {
                        Ok(unescaped) => text.push_str(&unescaped),
                        // Unknown entities are left unexpanded rather than
                        // resolved.
                        Err(_) => text.push_str(&String::from_utf8_lossy(t.as_ref())),
                    }
                }
            }
            Ok((_, Event::CData(t))) => {
                if capture.is_some() {
                    text.push_str(&String::from_utf8_lossy(t.as_ref()));
                }
            }
            Ok((ResolveResult::Bound(Namespace(ns)), Event::End(e))) if ns == FB2_NS => {
                match e.local_name().as_ref() {
                    b"book-title" => {
                        if matches!(capture, Some(Capture::Title)) {
                            title = non_empty(&text).map(|t| truncate_title(&t));
                            capture = None;
                        }
                    }
                    b"first-name" => {
                        if matches!(capture, Some(Capture::FirstName)) {
                            first_name = non_empty(&text);
                            capture = None;
                        }
                    }
                    b"last-name" => {
                        if matches!(capture, Some(Capture::LastName)) {
                            last_name = non_empty(&text);
                            capture = None;
                        }
                    }
                    b"author" if in_author => {
                        in_author = false;
                        author_done = true;
                    }
                    _ => {}
                }
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "metadata extraction degraded");
                break;
            }
        }
        buf.clear();

        if title.is_some() && author_done {
            break;
        }
    }

    BookMetadata {
        title,
        author: compose_author(first_name, last_name),
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn truncate_title(title: &str) -> String {
    title.chars().take(MAX_TITLE_LEN).collect()
}

fn compose_author(first: Option<String>, last: Option<String>) -> Option<String> {
    match (first, last) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        (None, Some(last)) => Some(last),
        (Some(first), None) => Some(first),
        (None, None) => None,
    }
}
