//! Rendering of a composited note to HTML.
//!
//! Markdown rendering goes through pulldown-cmark's offset iterator: every
//! text event that maps verbatim onto the source is cut at decoration
//! boundaries and the highlighted pieces are wrapped in `<mark>` elements
//! carrying the match's stable index. Everything else renders as usual.

use std::ops::Range;

use pulldown_cmark::{html, CowStr, Event, Options, Parser};

use crate::compositor::Composition;
use crate::models::{Classification, HighlightSegment};

// ============================================================================
// Text Escaping
// ============================================================================

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn mark(text: &str, classification: Classification, index: usize) -> String {
    let attribute = match classification.kind() {
        Some(kind) => kind.data_attribute(),
        None => return html_escape(text),
    };
    format!(
        r#"<mark class="{}" {}="{}">{}</mark>"#,
        classification.css_class(),
        attribute,
        index,
        html_escape(text)
    )
}

// ============================================================================
// Plain Rendering
// ============================================================================

/// Render segments as escaped text, for hosts that show the note verbatim.
pub fn render_plain(composition: &Composition) -> String {
    composition
        .segments
        .iter()
        .map(|s| match s.source_index {
            Some(index) => mark(&s.text, s.classification, index),
            None => html_escape(&s.text),
        })
        .collect()
}

// ============================================================================
// Markdown Rendering
// ============================================================================

/// A highlighted segment in byte coordinates of the note.
struct ByteMark {
    range: Range<usize>,
    classification: Classification,
    index: usize,
}

fn byte_marks(document: &str, segments: &[HighlightSegment]) -> Vec<ByteMark> {
    let bounds: Vec<usize> = document
        .char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(document.len()))
        .collect();
    segments
        .iter()
        .filter_map(|s| {
            let index = s.source_index?;
            let start = *bounds.get(s.start_index)?;
            let end = *bounds.get(s.end_index)?;
            Some(ByteMark {
                range: start..end,
                classification: s.classification,
                index,
            })
        })
        .collect()
}

/// Where `text` sits in the source, if it can be mapped back exactly.
fn source_span(document: &str, text: &str, range: &Range<usize>) -> Option<Range<usize>> {
    let source = document.get(range.clone())?;
    if text.is_empty() {
        None
    } else if source == text {
        Some(range.clone())
    } else if source.starts_with(text) {
        // Trailing spaces of a hard line break are not part of the text.
        Some(range.start..range.start + text.len())
    } else if source.ends_with(text) {
        // Backslash escapes: the event covers `\*` but carries `*`.
        Some(range.end - text.len()..range.end)
    } else {
        None
    }
}

/// Split one text event at decoration boundaries.
fn decorate_text(document: &str, span: Range<usize>, marks: &[ByteMark]) -> Option<String> {
    let overlapping: Vec<&ByteMark> = marks
        .iter()
        .filter(|m| m.range.start < span.end && span.start < m.range.end)
        .collect();
    if overlapping.is_empty() {
        return None;
    }

    let mut out = String::new();
    let mut cursor = span.start;
    for m in overlapping {
        let start = m.range.start.max(cursor);
        let end = m.range.end.min(span.end);
        if start > cursor {
            out.push_str(&html_escape(&document[cursor..start]));
        }
        out.push_str(&mark(&document[start..end], m.classification, m.index));
        cursor = end;
    }
    if cursor < span.end {
        out.push_str(&html_escape(&document[cursor..span.end]));
    }
    Some(out)
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Render `document` as markdown with the composition's decorations applied.
pub fn render_markdown(document: &str, composition: &Composition) -> String {
    let marks = byte_marks(document, &composition.segments);
    let events = Parser::new_ext(document, markdown_options())
        .into_offset_iter()
        .map(|(event, range)| match event {
            Event::Text(text) => match source_span(document, &text, &range)
                .and_then(|span| decorate_text(document, span, &marks))
            {
                Some(decorated) => Event::Html(CowStr::from(decorated)),
                None => Event::Text(text),
            },
            other => other,
        });

    let mut html_output = String::new();
    html::push_html(&mut html_output, events);
    sanitize(&html_output)
}

/// Strip unsafe markup while keeping the highlight elements and attributes.
pub fn sanitize(html: &str) -> String {
    let mut builder = ammonia::Builder::default();
    builder
        .add_tags(["mark"])
        .add_generic_attributes(["class", "data-search-match-index", "data-citation-match-index"]);
    builder.clean(html).to_string()
}
