//! Case-insensitive substring search over the note and over citation text.
//!
//! Offsets are character offsets. Folding is done one character at a time so
//! the folded text always has the same length as the original.

use crate::models::{Citation, CitationMatch, SearchMatch};

// ============================================================================
// Folding
// ============================================================================

/// Lowercase `c` when its lowercase form is a single character.
fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

pub(crate) fn fold(s: &str) -> Vec<char> {
    s.chars().map(fold_char).collect()
}

/// Every start position of `needle` in `haystack`, resuming one past each hit.
pub(crate) fn find_all(haystack: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(|(_, window)| *window == needle)
        .map(|(i, _)| i)
        .collect()
}

// ============================================================================
// Document Search
// ============================================================================

/// Find every occurrence of `query` in `document`, overlapping hits included.
///
/// `"aa"` against `"aaa"` yields `[0, 2)` and `[1, 3)`.
pub fn find_matches(document: &str, query: &str) -> Vec<SearchMatch> {
    if document.is_empty() || query.is_empty() {
        return Vec::new();
    }
    let needle = fold(query);
    find_all(&fold(document), &needle)
        .into_iter()
        .map(|start| SearchMatch {
            start_index: start,
            end_index: start + needle.len(),
        })
        .collect()
}

// ============================================================================
// Citation Search
// ============================================================================

/// Search each citation's own text and re-base hits onto the note.
///
/// Coordinates come from the citation's recorded offsets; the cited text is
/// not checked against the note.
pub fn find_citation_matches(citations: &[Citation], query: &str) -> Vec<CitationMatch> {
    if citations.is_empty() || query.is_empty() {
        return Vec::new();
    }
    let needle = fold(query);
    let mut matches: Vec<CitationMatch> = citations
        .iter()
        .enumerate()
        .flat_map(|(citation_index, citation)| {
            let base = citation.start_index;
            let len = needle.len();
            find_all(&fold(&citation.cited_text), &needle)
                .into_iter()
                .map(move |offset| CitationMatch {
                    citation_index,
                    start_index: base + offset,
                    end_index: base + offset + len,
                })
        })
        .collect();
    matches.sort_by_key(|m| m.start_index);
    matches
}
