//! Citation descriptors: parse the `key='value'` bags attached to guidelines
//! into validated [`Citation`] records, and locate cited text in a note when
//! no decoration exists to scroll to.
//!
//! A descriptor looks like:
//!
//! ```text
//! CitationCharLocation(cited_text='...', document_index=0, document_title='Detailed Notes',
//!     end_char_index=154, start_char_index=0, type='char_location')
//! ```
//!
//! Fields are found independently, in any order.

use crate::models::Citation;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(test)]
#[path = "citations_test.rs"]
mod citations_test;

static CITED_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)cited_text=(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")"#)
        .expect("cited_text pattern")
});
static DOCUMENT_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"document_index=(\d+)").expect("document_index pattern"));
static DOCUMENT_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"document_title=(?:'([^']+)'|"([^"]+)")"#).expect("document_title pattern")
});
static START_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"start_char_index=(\d+)").expect("start_char_index pattern"));
static END_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"end_char_index=(\d+)").expect("end_char_index pattern"));

/// Prefix lengths tried, longest first, when locating cited text in a note.
const LOCATE_CHUNK_LENGTHS: [usize; 3] = [80, 40, 20];

// ============================================================================
// Errors
// ============================================================================

/// Why a descriptor was rejected. Rejected descriptors are dropped, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("empty citation descriptor")]
    Empty,
    #[error("citation descriptor has no start_char_index")]
    MissingStart,
    #[error("citation descriptor has no end_char_index")]
    MissingEnd,
    #[error("citation range is empty or reversed: {start}..{end}")]
    InvalidRange { start: usize, end: usize },
}

// ============================================================================
// Descriptor Parsing
// ============================================================================

/// First participating capture group; quoted fields have one group per quote style.
fn capture<'a>(re: &Regex, descriptor: &'a str) -> Option<&'a str> {
    re.captures(descriptor)
        .and_then(|caps| caps.iter().skip(1).flatten().next())
        .map(|m| m.as_str())
}

fn capture_index(re: &Regex, descriptor: &str) -> Option<usize> {
    capture(re, descriptor).and_then(|digits| digits.parse().ok())
}

fn unescape_cited_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(q @ ('\'' | '"' | '\\')) => out.push(q),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Parse one descriptor string into a [`Citation`].
pub fn parse_citation_string(descriptor: &str) -> Result<Citation, ParseFailure> {
    if descriptor.trim().is_empty() {
        return Err(ParseFailure::Empty);
    }

    let cited_text = capture(&CITED_TEXT_RE, descriptor)
        .map(unescape_cited_text)
        .unwrap_or_default();
    let document_index = capture_index(&DOCUMENT_INDEX_RE, descriptor).unwrap_or(0);
    let document_title = capture(&DOCUMENT_TITLE_RE, descriptor)
        .unwrap_or_default()
        .to_string();

    let start_index = capture_index(&START_INDEX_RE, descriptor).ok_or(ParseFailure::MissingStart)?;
    let end_index = capture_index(&END_INDEX_RE, descriptor).ok_or(ParseFailure::MissingEnd)?;
    if start_index >= end_index {
        return Err(ParseFailure::InvalidRange {
            start: start_index,
            end: end_index,
        });
    }

    Ok(Citation {
        start_index,
        end_index,
        cited_text,
        document_index,
        document_title,
    })
}

/// Convert a guideline's descriptors, dropping the ones that fail to parse.
///
/// The result is ordered by `start_index`; ties keep descriptor order.
pub fn parse_citations<S: AsRef<str>>(descriptors: &[S]) -> Vec<Citation> {
    let mut citations: Vec<Citation> = descriptors
        .iter()
        .filter_map(|descriptor| match parse_citation_string(descriptor.as_ref()) {
            Ok(citation) => Some(citation),
            Err(err) => {
                warn!(error = %err, descriptor = descriptor.as_ref(), "dropping citation");
                None
            }
        })
        .collect();
    citations.sort_by_key(|c| c.start_index);
    debug!(
        parsed = citations.len(),
        total = descriptors.len(),
        "parsed citation descriptors"
    );
    citations
}

// ============================================================================
// Locating Cited Text
// ============================================================================

/// Collapse whitespace runs to one space, remembering each kept character's
/// original character offset.
fn normalize_whitespace(text: &str) -> (Vec<char>, Vec<usize>) {
    let mut chars = Vec::new();
    let mut offsets = Vec::new();
    let mut in_space = false;
    for (i, c) in text.chars().enumerate() {
        if c.is_whitespace() {
            if !in_space {
                chars.push(' ');
                offsets.push(i);
            }
            in_space = true;
        } else {
            chars.push(c);
            offsets.push(i);
            in_space = false;
        }
    }
    (chars, offsets)
}

/// Find where `cited_text` starts in `document`, tolerating reflowed
/// whitespace. Tries progressively shorter prefixes of the cited text.
pub fn locate_cited_text(document: &str, cited_text: &str) -> Option<usize> {
    let (needle, _) = normalize_whitespace(cited_text.trim());
    if needle.is_empty() {
        return None;
    }
    let (haystack, offsets) = normalize_whitespace(document);

    LOCATE_CHUNK_LENGTHS.iter().find_map(|&len| {
        let chunk = &needle[..len.min(needle.len())];
        haystack
            .windows(chunk.len())
            .position(|window| window == chunk)
            .map(|pos| offsets[pos])
    })
}
