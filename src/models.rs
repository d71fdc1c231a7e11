//! Data models for the inspector.
//!
//! Citations, guidelines, match ranges, and the decoration types handed to
//! the renderer. All offsets are character offsets into the displayed note.

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Citations and Guidelines
// ============================================================================

/// A source passage referenced by a guideline, recovered from one descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub start_index: usize,
    pub end_index: usize,
    pub cited_text: String,
    pub document_index: usize,
    pub document_title: String,
}

/// One criterion of the review report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guideline {
    #[serde(rename = "guideline_number", deserialize_with = "number_or_string")]
    pub number: String,
    #[serde(rename = "report", default)]
    pub report_text: String,
    #[serde(default)]
    pub criterion_met: bool,
    #[serde(default)]
    pub citations: Vec<String>,
}

impl Guideline {
    /// Numeric sort key; non-numeric labels sort after every number.
    pub fn sort_key(&self) -> (u8, u64, &str) {
        match self.number.trim().parse::<u64>() {
            Ok(n) => (0, n, ""),
            Err(_) => (1, 0, self.number.as_str()),
        }
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Int(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
        Raw::Text(s) => s,
    })
}

/// Which guideline subset the criteria list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriteriaTab {
    #[default]
    Met,
    All,
}

impl CriteriaTab {
    pub fn title(self) -> &'static str {
        match self {
            CriteriaTab::Met => "Met Criteria",
            CriteriaTab::All => "All Criteria",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "met" => Some(CriteriaTab::Met),
            "all" | "criteria" => Some(CriteriaTab::All),
            _ => None,
        }
    }
}

// ============================================================================
// Data Source Shape
// ============================================================================

/// Review response as produced by the upstream analysis service.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewResponse {
    pub result_json: ReviewResult,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewResult {
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub guideline_report: GuidelineReport,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuidelineReport {
    #[serde(default)]
    pub guidelines: Vec<Guideline>,
}

// ============================================================================
// Match Ranges
// ============================================================================

/// The two independent range sets drawn over the note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Search,
    Citation,
}

impl MatchKind {
    /// Data attribute the renderer stamps on each decoration of this kind.
    pub fn data_attribute(self) -> &'static str {
        match self {
            MatchKind::Search => "data-search-match-index",
            MatchKind::Citation => "data-citation-match-index",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub start_index: usize,
    pub end_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationMatch {
    pub citation_index: usize,
    pub start_index: usize,
    pub end_index: usize,
}

// ============================================================================
// Decorations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    Plain,
    Search,
    SearchCurrent,
    Citation,
    CitationCurrent,
}

impl Classification {
    pub fn tagged(kind: MatchKind, current: bool) -> Self {
        match (kind, current) {
            (MatchKind::Search, false) => Classification::Search,
            (MatchKind::Search, true) => Classification::SearchCurrent,
            (MatchKind::Citation, false) => Classification::Citation,
            (MatchKind::Citation, true) => Classification::CitationCurrent,
        }
    }

    pub fn kind(self) -> Option<MatchKind> {
        match self {
            Classification::Plain => None,
            Classification::Search | Classification::SearchCurrent => Some(MatchKind::Search),
            Classification::Citation | Classification::CitationCurrent => {
                Some(MatchKind::Citation)
            }
        }
    }

    pub fn is_current(self) -> bool {
        matches!(
            self,
            Classification::SearchCurrent | Classification::CitationCurrent
        )
    }

    /// CSS classes used by the note pane.
    pub fn css_class(self) -> &'static str {
        match self {
            Classification::Plain => "",
            Classification::Search => "highlight-search",
            Classification::SearchCurrent => "highlight-search highlight-search-current",
            Classification::Citation => "highlight-citation",
            Classification::CitationCurrent => "highlight-citation highlight-citation-current",
        }
    }
}

/// One piece of the decorated note. Segments partition the note exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightSegment {
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
    pub classification: Classification,
    pub source_index: Option<usize>,
}

/// `(text, classification, index)` rule consumed by left-to-right substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplacementRule {
    pub text: String,
    pub classification: Classification,
    pub index: usize,
}

/// Where the host should bring the view after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScrollTarget {
    /// A decorated match, located by its stable `(kind, index)` pair.
    Match { kind: MatchKind, index: usize },
    /// A character offset in the note, used when no decoration exists.
    Offset { offset: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guideline_number_accepts_integer() {
        let g: Guideline = serde_json::from_str(
            r#"{"guideline_number": 7, "report": "Meets", "criterion_met": true}"#,
        )
        .unwrap();
        assert_eq!(g.number, "7");
        assert!(g.criterion_met);
        assert!(g.citations.is_empty());
    }

    #[test]
    fn test_guideline_number_accepts_string() {
        let g: Guideline =
            serde_json::from_str(r#"{"guideline_number": "12", "report": "x"}"#).unwrap();
        assert_eq!(g.number, "12");
        assert!(!g.criterion_met);
    }

    #[test]
    fn test_guideline_sort_key_orders_numerically() {
        let mk = |n: &str| Guideline {
            number: n.to_string(),
            report_text: String::new(),
            criterion_met: false,
            citations: vec![],
        };
        let mut v = vec![mk("10"), mk("b"), mk("2"), mk("a")];
        v.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        let order: Vec<&str> = v.iter().map(|g| g.number.as_str()).collect();
        assert_eq!(order, vec!["2", "10", "a", "b"]);
    }

    #[test]
    fn test_classification_serializes_kebab_case() {
        let json = serde_json::to_string(&Classification::CitationCurrent).unwrap();
        assert_eq!(json, "\"citation-current\"");
    }

    #[test]
    fn test_classification_kind_roundtrip() {
        for kind in [MatchKind::Search, MatchKind::Citation] {
            for current in [false, true] {
                let c = Classification::tagged(kind, current);
                assert_eq!(c.kind(), Some(kind));
                assert_eq!(c.is_current(), current);
            }
        }
        assert_eq!(Classification::Plain.kind(), None);
    }

    #[test]
    fn test_criteria_tab_parse() {
        assert_eq!(CriteriaTab::parse("met"), Some(CriteriaTab::Met));
        assert_eq!(CriteriaTab::parse("criteria"), Some(CriteriaTab::All));
        assert_eq!(CriteriaTab::parse("all"), Some(CriteriaTab::All));
        assert_eq!(CriteriaTab::parse("other"), None);
    }

    #[test]
    fn test_scroll_target_serialization() {
        let json = serde_json::to_value(ScrollTarget::Match {
            kind: MatchKind::Citation,
            index: 2,
        })
        .unwrap();
        assert_eq!(json["type"], "match");
        assert_eq!(json["kind"], "citation");
        assert_eq!(json["index"], 2);
    }
}
