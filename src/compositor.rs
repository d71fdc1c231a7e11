//! Highlight compositor: merge the search and citation range sets into one
//! ordered, non-overlapping decoration of the note.
//!
//! Ordering is fully deterministic. Ranges are sorted by start; at an equal
//! start the current match of either set goes first, then citation ranges
//! before search ranges, then lower index. The sweep then walks left to right.
//! A range overlapping an earlier range of its own set is clipped to begin
//! where that range ends. A range lying inside decorations of the other set
//! is laid over them, splitting the covering decoration around it; a range
//! straddling the end of the decorated prefix is clipped to that end. A range
//! left with nothing to show (same-set containment, an identical span from
//! the other set, or offsets past the note) is recorded in
//! [`Composition::occluded`] together with the decoration that covers it.

use std::ops::Range;

use serde::Serialize;
use tracing::debug;

use crate::models::{
    CitationMatch, Classification, HighlightSegment, MatchKind, ReplacementRule, SearchMatch,
};

// ============================================================================
// Inputs
// ============================================================================

/// One range set with its current-match index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSet {
    pub ranges: Vec<Range<usize>>,
    pub current: Option<usize>,
}

impl RangeSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_search(matches: &[SearchMatch], current: Option<usize>) -> Self {
        Self {
            ranges: matches.iter().map(|m| m.start_index..m.end_index).collect(),
            current,
        }
    }

    pub fn from_citations(matches: &[CitationMatch], current: Option<usize>) -> Self {
        Self {
            ranges: matches.iter().map(|m| m.start_index..m.end_index).collect(),
            current,
        }
    }
}

#[derive(Debug, Clone)]
struct Tagged {
    kind: MatchKind,
    index: usize,
    start: usize,
    end: usize,
    classification: Classification,
}

impl Tagged {
    fn sort_key(&self) -> (usize, bool, u8, usize) {
        let kind_rank = match self.kind {
            MatchKind::Citation => 0,
            MatchKind::Search => 1,
        };
        (
            self.start,
            !self.classification.is_current(),
            kind_rank,
            self.index,
        )
    }
}

fn tag(set: &RangeSet, kind: MatchKind) -> impl Iterator<Item = Tagged> + '_ {
    set.ranges.iter().enumerate().map(move |(index, range)| Tagged {
        kind,
        index,
        start: range.start,
        end: range.end,
        classification: Classification::tagged(kind, set.current == Some(index)),
    })
}

// ============================================================================
// Output
// ============================================================================

/// A match that produced no segment of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occlusion {
    pub kind: MatchKind,
    pub index: usize,
    /// The decoration shown in its place; `None` when the range lies outside
    /// the note.
    pub covered_by: Option<(MatchKind, usize)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Composition {
    pub segments: Vec<HighlightSegment>,
    pub occluded: Vec<Occlusion>,
}

impl Composition {
    /// Concatenated segment text; always equal to the composited note.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    fn position(&self, kind: MatchKind, index: usize) -> Option<usize> {
        self.segments
            .iter()
            .position(|s| decoration(s) == Some((kind, index)))
    }

    /// The decoration that displays match `(kind, index)`: the match itself,
    /// or the one covering it when it was occluded.
    pub fn shown_as(&self, kind: MatchKind, index: usize) -> Option<(MatchKind, usize)> {
        if self.position(kind, index).is_some() {
            return Some((kind, index));
        }
        self.occluded
            .iter()
            .find(|o| o.kind == kind && o.index == index)
            .and_then(|o| o.covered_by)
            .filter(|&(k, i)| self.position(k, i).is_some())
    }

    /// Position of the first segment showing match `(kind, index)`.
    pub fn anchor_of(&self, kind: MatchKind, index: usize) -> Option<usize> {
        self.shown_as(kind, index)
            .and_then(|(k, i)| self.position(k, i))
    }

    /// Substitution rules for the highlighted segments, in document order.
    pub fn replacement_rules(&self) -> Vec<ReplacementRule> {
        self.segments
            .iter()
            .filter_map(|s| {
                s.source_index.map(|index| ReplacementRule {
                    text: s.text.clone(),
                    classification: s.classification,
                    index,
                })
            })
            .collect()
    }
}

// ============================================================================
// Compositing
// ============================================================================

fn segment(
    document: &str,
    bounds: &[usize],
    range: Range<usize>,
    classification: Classification,
    source_index: Option<usize>,
) -> HighlightSegment {
    HighlightSegment {
        text: document[bounds[range.start]..bounds[range.end]].to_string(),
        start_index: range.start,
        end_index: range.end,
        classification,
        source_index,
    }
}

fn decoration(s: &HighlightSegment) -> Option<(MatchKind, usize)> {
    s.classification.kind().zip(s.source_index)
}

fn kind_slot(kind: MatchKind) -> usize {
    match kind {
        MatchKind::Citation => 0,
        MatchKind::Search => 1,
    }
}

/// Lay `t` over the decorated span `range`, splitting the decorations it
/// lands on. Fails with the decoration in the way when that decoration would
/// vanish entirely or belongs to the same set.
fn overlay(
    document: &str,
    bounds: &[usize],
    segments: &mut Vec<HighlightSegment>,
    range: Range<usize>,
    t: &Tagged,
) -> Result<(), Option<(MatchKind, usize)>> {
    let first = segments
        .iter()
        .position(|s| s.end_index > range.start)
        .ok_or(None)?;
    let last = segments[first..]
        .iter()
        .position(|s| s.end_index >= range.end)
        .map(|p| first + p)
        .ok_or(None)?;

    let head = &segments[first];
    let tail = &segments[last];
    let mut replacement = Vec::with_capacity(3);
    if head.start_index < range.start {
        replacement.push(segment(
            document,
            bounds,
            head.start_index..range.start,
            head.classification,
            head.source_index,
        ));
    }
    replacement.push(segment(
        document,
        bounds,
        range.clone(),
        t.classification,
        Some(t.index),
    ));
    if range.end < tail.end_index {
        replacement.push(segment(
            document,
            bounds,
            range.end..tail.end_index,
            tail.classification,
            tail.source_index,
        ));
    }

    let survives = |key: (MatchKind, usize)| {
        segments[..first]
            .iter()
            .chain(&segments[last + 1..])
            .chain(&replacement)
            .any(|s| decoration(s) == Some(key))
    };
    for hidden in &segments[first..=last] {
        if let Some(key) = decoration(hidden) {
            if key.0 == t.kind || !survives(key) {
                return Err(Some(key));
            }
        }
    }

    segments.splice(first..=last, replacement);
    Ok(())
}

/// Decorate `document` with both range sets.
///
/// The returned segments partition the note: no gaps, no overlaps, and their
/// texts concatenate back to `document`.
pub fn composite(document: &str, search: &RangeSet, citations: &RangeSet) -> Composition {
    // Byte offset of every character boundary, including the end.
    let bounds: Vec<usize> = document
        .char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(document.len()))
        .collect();
    let len = bounds.len() - 1;

    let mut tagged: Vec<Tagged> = tag(citations, MatchKind::Citation)
        .chain(tag(search, MatchKind::Search))
        .collect();
    tagged.sort_by_key(Tagged::sort_key);

    let mut out = Composition::default();
    let mut cursor = 0;
    // Furthest end shown so far per set, with the match that reached it.
    let mut reach: [Option<(usize, usize)>; 2] = [None, None];

    for t in tagged {
        let slot = kind_slot(t.kind);
        let mut start = t.start.min(len);
        let end = t.end.min(len);

        let blocked = if start >= end {
            Some(None)
        } else {
            match reach[slot] {
                Some((reach_end, owner)) if reach_end >= end => Some(Some((t.kind, owner))),
                Some((reach_end, _)) => {
                    start = start.max(reach_end);
                    None
                }
                None => None,
            }
        };

        let blocked = match blocked {
            Some(covered_by) => Some(covered_by),
            None if start >= cursor => {
                if start > cursor {
                    out.segments.push(segment(
                        document,
                        &bounds,
                        cursor..start,
                        Classification::Plain,
                        None,
                    ));
                }
                out.segments.push(segment(
                    document,
                    &bounds,
                    start..end,
                    t.classification,
                    Some(t.index),
                ));
                cursor = end;
                None
            }
            None if end > cursor => {
                out.segments.push(segment(
                    document,
                    &bounds,
                    cursor..end,
                    t.classification,
                    Some(t.index),
                ));
                cursor = end;
                None
            }
            None => overlay(document, &bounds, &mut out.segments, start..end, &t).err(),
        };

        match blocked {
            Some(covered_by) => {
                debug!(kind = ?t.kind, index = t.index, ?covered_by, "match occluded");
                out.occluded.push(Occlusion {
                    kind: t.kind,
                    index: t.index,
                    covered_by,
                });
            }
            None => reach[slot] = Some((end, t.index)),
        }
    }

    if cursor < len {
        out.segments.push(segment(
            document,
            &bounds,
            cursor..len,
            Classification::Plain,
            None,
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(ranges: &[(usize, usize)], current: Option<usize>) -> RangeSet {
        RangeSet {
            ranges: ranges.iter().map(|&(s, e)| s..e).collect(),
            current,
        }
    }

    fn shape(c: &Composition) -> Vec<(usize, usize, Classification, Option<usize>)> {
        c.segments
            .iter()
            .map(|s| (s.start_index, s.end_index, s.classification, s.source_index))
            .collect()
    }

    fn assert_partition(doc: &str, c: &Composition) {
        assert_eq!(c.text(), doc);
        let mut expected_start = 0;
        for s in &c.segments {
            assert_eq!(s.start_index, expected_start, "gap or overlap at {:?}", s);
            assert!(s.end_index > s.start_index, "empty segment {:?}", s);
            assert_eq!(s.text.chars().count(), s.end_index - s.start_index);
            expected_start = s.end_index;
        }
        assert_eq!(expected_start, doc.chars().count());
    }

    #[test]
    fn test_no_ranges_is_one_plain_segment() {
        let c = composite("plain note", &RangeSet::empty(), &RangeSet::empty());
        assert_eq!(shape(&c), vec![(0, 10, Classification::Plain, None)]);
    }

    #[test]
    fn test_empty_document() {
        let c = composite("", &set(&[(0, 3)], Some(0)), &RangeSet::empty());
        assert!(c.segments.is_empty());
        assert_eq!(c.occluded.len(), 1);
        assert_eq!(c.occluded[0].covered_by, None);
    }

    #[test]
    fn test_search_current_tagging() {
        let doc = "pain, more pain";
        let c = composite(doc, &set(&[(0, 4), (11, 15)], Some(1)), &RangeSet::empty());
        assert_eq!(
            shape(&c),
            vec![
                (0, 4, Classification::Search, Some(0)),
                (4, 11, Classification::Plain, None),
                (11, 15, Classification::SearchCurrent, Some(1)),
            ]
        );
        assert_partition(doc, &c);
    }

    #[test]
    fn test_same_set_overlap_clips_later_range() {
        let doc = "aaa";
        let c = composite(doc, &set(&[(0, 2), (1, 3)], Some(0)), &RangeSet::empty());
        assert_eq!(
            shape(&c),
            vec![
                (0, 2, Classification::SearchCurrent, Some(0)),
                (2, 3, Classification::Search, Some(1)),
            ]
        );
        assert_partition(doc, &c);
    }

    #[test]
    fn test_cross_set_overlap_keeps_both() {
        let doc = "the patient was ambulating";
        // Citation 4..15 ("patient was"), search 12..26 ("was ambulating").
        let c = composite(doc, &set(&[(12, 26)], None), &set(&[(4, 15)], None));
        assert_eq!(
            shape(&c),
            vec![
                (0, 4, Classification::Plain, None),
                (4, 15, Classification::Citation, Some(0)),
                (15, 26, Classification::Search, Some(0)),
            ]
        );
        assert!(c.occluded.is_empty());
        assert_partition(doc, &c);
    }

    #[test]
    fn test_equal_start_nested_range_splits_cover() {
        let doc = "chest pain";
        let c = composite(doc, &set(&[(0, 5)], Some(0)), &set(&[(0, 10)], Some(0)));
        assert_eq!(
            shape(&c),
            vec![
                (0, 5, Classification::SearchCurrent, Some(0)),
                (5, 10, Classification::CitationCurrent, Some(0)),
            ]
        );
        assert!(c.occluded.is_empty());
    }

    #[test]
    fn test_identical_spans_citation_current_wins() {
        let doc = "chest pain";
        let c = composite(doc, &set(&[(0, 5)], Some(0)), &set(&[(0, 5)], Some(0)));
        assert_eq!(
            shape(&c),
            vec![
                (0, 5, Classification::CitationCurrent, Some(0)),
                (5, 10, Classification::Plain, None),
            ]
        );
        assert_eq!(
            c.occluded,
            vec![Occlusion {
                kind: MatchKind::Search,
                index: 0,
                covered_by: Some((MatchKind::Citation, 0)),
            }]
        );
        assert_eq!(c.shown_as(MatchKind::Search, 0), Some((MatchKind::Citation, 0)));
    }

    #[test]
    fn test_identical_spans_current_beats_non_current() {
        let doc = "chest pain";
        let c = composite(doc, &set(&[(0, 5)], Some(0)), &set(&[(0, 5)], None));
        assert_eq!(shape(&c)[0], (0, 5, Classification::SearchCurrent, Some(0)));
        assert_eq!(c.occluded[0].kind, MatchKind::Citation);
    }

    #[test]
    fn test_equal_start_current_beats_non_current() {
        let doc = "chest pain";
        let c = composite(doc, &set(&[(0, 5)], Some(0)), &set(&[(0, 10)], None));
        assert_eq!(
            shape(&c),
            vec![
                (0, 5, Classification::SearchCurrent, Some(0)),
                (5, 10, Classification::Citation, Some(0)),
            ]
        );
    }

    #[test]
    fn test_search_inside_citation_splits_citation() {
        let doc = "0123456789";
        let c = composite(doc, &set(&[(3, 5)], Some(0)), &set(&[(1, 8)], Some(0)));
        assert_eq!(
            shape(&c),
            vec![
                (0, 1, Classification::Plain, None),
                (1, 3, Classification::CitationCurrent, Some(0)),
                (3, 5, Classification::SearchCurrent, Some(0)),
                (5, 8, Classification::CitationCurrent, Some(0)),
                (8, 10, Classification::Plain, None),
            ]
        );
        assert!(c.occluded.is_empty());
        assert_eq!(c.anchor_of(MatchKind::Search, 0), Some(2));
        assert_eq!(c.anchor_of(MatchKind::Citation, 0), Some(1));
        assert_partition(doc, &c);
    }

    #[test]
    fn test_citation_inside_search_splits_search() {
        let doc = "0123456789";
        let c = composite(doc, &set(&[(0, 10)], None), &set(&[(4, 6)], Some(0)));
        assert_eq!(
            shape(&c),
            vec![
                (0, 4, Classification::Search, Some(0)),
                (4, 6, Classification::CitationCurrent, Some(0)),
                (6, 10, Classification::Search, Some(0)),
            ]
        );
        assert!(c.occluded.is_empty());
    }

    #[test]
    fn test_several_ranges_inside_one_cover() {
        let doc = "0123456789abcdef";
        let c = composite(doc, &set(&[(2, 4), (8, 10)], Some(1)), &set(&[(0, 16)], None));
        assert_eq!(
            shape(&c),
            vec![
                (0, 2, Classification::Citation, Some(0)),
                (2, 4, Classification::Search, Some(0)),
                (4, 8, Classification::Citation, Some(0)),
                (8, 10, Classification::SearchCurrent, Some(1)),
                (10, 16, Classification::Citation, Some(0)),
            ]
        );
        assert_partition(doc, &c);
    }

    #[test]
    fn test_range_straddling_prefix_end_is_clipped() {
        let doc = "0123456789abcdefghij";
        let c = composite(doc, &set(&[(8, 12)], None), &set(&[(0, 10), (10, 20)], None));
        assert_eq!(
            shape(&c),
            vec![
                (0, 10, Classification::Citation, Some(0)),
                (10, 12, Classification::Search, Some(0)),
                (12, 20, Classification::Citation, Some(1)),
            ]
        );
        assert!(c.occluded.is_empty());
    }

    #[test]
    fn test_same_set_containment_is_occluded() {
        let doc = "0123456789";
        let c = composite(doc, &set(&[(0, 10), (2, 4)], None), &RangeSet::empty());
        assert_eq!(shape(&c), vec![(0, 10, Classification::Search, Some(0))]);
        assert_eq!(
            c.occluded,
            vec![Occlusion {
                kind: MatchKind::Search,
                index: 1,
                covered_by: Some((MatchKind::Search, 0)),
            }]
        );
        assert_eq!(c.anchor_of(MatchKind::Search, 1), Some(0));
    }

    #[test]
    fn test_nested_same_set_range_stays_hidden_inside_other_set() {
        let doc = "0123456789abcdefghij";
        // Search 5..15 sits inside citation 0..20; citation 8..10 is inside
        // citation 0..20 and stays hidden even though search now shows there.
        let c = composite(doc, &set(&[(5, 15)], None), &set(&[(0, 20), (8, 10)], None));
        assert_eq!(
            shape(&c),
            vec![
                (0, 5, Classification::Citation, Some(0)),
                (5, 15, Classification::Search, Some(0)),
                (15, 20, Classification::Citation, Some(0)),
            ]
        );
        assert_eq!(c.occluded[0].covered_by, Some((MatchKind::Citation, 0)));
    }

    #[test]
    fn test_ranges_past_document_end_are_clamped() {
        let doc = "short";
        let c = composite(doc, &RangeSet::empty(), &set(&[(3, 40), (100, 110)], None));
        assert_eq!(
            shape(&c),
            vec![
                (0, 3, Classification::Plain, None),
                (3, 5, Classification::Citation, Some(0)),
            ]
        );
        assert_eq!(
            c.occluded,
            vec![Occlusion {
                kind: MatchKind::Citation,
                index: 1,
                covered_by: None,
            }]
        );
    }

    #[test]
    fn test_multibyte_text_is_sliced_on_char_boundaries() {
        let doc = "naïve café";
        let c = composite(doc, &set(&[(6, 10)], Some(0)), &RangeSet::empty());
        assert_eq!(c.segments[1].text, "café");
        assert_partition(doc, &c);
    }

    #[test]
    fn test_anchor_of_direct_hit() {
        let doc = "a b a b";
        let c = composite(doc, &set(&[(0, 1), (4, 5)], Some(1)), &set(&[(2, 3)], None));
        assert_eq!(c.anchor_of(MatchKind::Search, 1), Some(4));
        assert_eq!(c.anchor_of(MatchKind::Citation, 0), Some(2));
        assert_eq!(c.anchor_of(MatchKind::Citation, 5), None);
    }

    #[test]
    fn test_replacement_rules_follow_document_order() {
        let doc = "fever and cough and fever";
        let c = composite(
            doc,
            &set(&[(0, 5), (20, 25)], Some(0)),
            &set(&[(10, 15)], Some(0)),
        );
        let rules = c.replacement_rules();
        let got: Vec<(&str, Classification, usize)> = rules
            .iter()
            .map(|r| (r.text.as_str(), r.classification, r.index))
            .collect();
        assert_eq!(
            got,
            vec![
                ("fever", Classification::SearchCurrent, 0),
                ("cough", Classification::CitationCurrent, 0),
                ("fever", Classification::Search, 1),
            ]
        );
    }

    fn input_ranges() -> impl Strategy<Value = Vec<(usize, usize)>> {
        prop::collection::vec((0usize..48, 1usize..14).prop_map(|(s, l)| (s, s + l)), 0..6)
    }

    fn pick(ranges: &[(usize, usize)], index: Option<prop::sample::Index>) -> Option<usize> {
        match index {
            Some(i) if !ranges.is_empty() => Some(i.index(ranges.len())),
            _ => None,
        }
    }

    proptest! {
        #[test]
        fn test_partition_holds_for_arbitrary_ranges(
            doc in "[a-cé .]{0,40}",
            search in input_ranges(),
            cites in input_ranges(),
            search_current in proptest::option::of(any::<prop::sample::Index>()),
            cite_current in proptest::option::of(any::<prop::sample::Index>()),
        ) {
            let len = doc.chars().count();
            let search_set = set(&search, pick(&search, search_current));
            let cite_set = set(&cites, pick(&cites, cite_current));
            let c = composite(&doc, &search_set, &cite_set);

            prop_assert_eq!(c.text(), doc.clone());
            let mut expected_start = 0;
            for s in &c.segments {
                prop_assert_eq!(s.start_index, expected_start);
                prop_assert!(s.end_index > s.start_index);
                expected_start = s.end_index;
            }
            prop_assert_eq!(expected_start, len);

            // Every input range is either shown or occluded, never both.
            let inputs = search
                .iter()
                .enumerate()
                .map(|(i, r)| ((MatchKind::Search, i), *r))
                .chain(cites.iter().enumerate().map(|(i, r)| ((MatchKind::Citation, i), *r)));
            for (key, (start, end)) in inputs {
                let shown = c.segments.iter().any(|s| decoration(s) == Some(key));
                let occlusion = c.occluded.iter().find(|o| (o.kind, o.index) == key);
                prop_assert!(shown != occlusion.is_some(), "{:?} shown={} occluded={:?}", key, shown, occlusion);

                if let Some(o) = occlusion {
                    if start.min(len) >= end.min(len) {
                        prop_assert_eq!(o.covered_by, None);
                    } else {
                        // The cover is on screen and overlaps the hidden range.
                        let (cover_kind, cover_index) = o.covered_by.expect("in-bounds occlusion has a cover");
                        prop_assert!(c.position(cover_kind, cover_index).is_some());
                        let (cs, ce) = match cover_kind {
                            MatchKind::Search => search[cover_index],
                            MatchKind::Citation => cites[cover_index],
                        };
                        prop_assert!(cs < end && start < ce);
                    }
                }
            }
        }

        #[test]
        fn test_range_strictly_inside_other_set_is_shown(
            doc in "[a-z]{20,40}",
            (outer_start, outer_len) in (0usize..10, 3usize..10),
            (inner_offset, inner_len) in (0usize..8, 1usize..8),
            search_outer in any::<bool>(),
        ) {
            let outer = (outer_start, outer_start + outer_len);
            let inner_start = outer.0 + inner_offset % outer_len;
            let inner = (inner_start, (inner_start + inner_len).min(outer.1));
            prop_assume!(inner.0 < inner.1 && inner != outer);

            let (search, cites) = if search_outer { (outer, inner) } else { (inner, outer) };
            let c = composite(&doc, &set(&[search], Some(0)), &set(&[cites], Some(0)));
            prop_assert!(c.occluded.is_empty(), "{:?}", c.occluded);
            prop_assert!(c.position(MatchKind::Search, 0).is_some());
            prop_assert!(c.position(MatchKind::Citation, 0).is_some());
        }
    }
}
