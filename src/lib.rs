//! Inspector library - re-exports for testing and external use.
//!
//! The highlighting engine (parsing, search, navigation, debounce,
//! composition, rendering) is independent of the web host in `handlers`
//! and `templates`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

pub mod citations;
pub mod compositor;
pub mod debounce;
pub mod handlers;
pub mod models;
pub mod navigation;
pub mod render;
pub mod review;
pub mod search;
pub mod session;
pub mod templates;

// ============================================================================
// Configuration
// ============================================================================

pub const DATA_PATH: &str = "data/review.json";
pub const BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEBOUNCE_MS: u64 = 250;

/// Runtime settings, read from `INSPECTOR_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
    pub addr: String,
    pub debounce: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DATA_PATH),
            addr: BIND_ADDR.to_string(),
            debounce: Duration::from_millis(DEBOUNCE_MS),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or empty values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let debounce = match get("INSPECTOR_DEBOUNCE_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    warn!(value = %raw, "INSPECTOR_DEBOUNCE_MS is not a number, using default");
                    defaults.debounce
                }
            },
            None => defaults.debounce,
        };

        Self {
            data_path: get("INSPECTOR_DATA")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            addr: get("INSPECTOR_ADDR").unwrap_or(defaults.addr),
            debounce,
        }
    }
}

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub review: Arc<Review>,
    pub config: Config,
}

impl AppState {
    pub fn new(review: Review, config: Config) -> Self {
        Self {
            review: Arc::new(review),
            config,
        }
    }

    /// A fresh inspection session showing the review note.
    pub fn new_store(&self) -> InspectionStore {
        let mut store = InspectionStore::new((*self.review).clone(), self.config.debounce);
        store.set_document(self.review.note.clone());
        store
    }
}

// Re-export commonly used types
pub use models::{
    Citation, CitationMatch, Classification, CriteriaTab, Guideline, HighlightSegment, MatchKind,
    ReplacementRule, ReviewResponse, ScrollTarget, SearchMatch,
};

pub use citations::{locate_cited_text, parse_citation_string, parse_citations, ParseFailure};

pub use search::{find_citation_matches, find_matches};

pub use navigation::MatchCursor;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};

pub use compositor::{composite, Composition, Occlusion, RangeSet};

pub use render::{html_escape, render_markdown, render_plain, sanitize};

pub use review::{load_review, LoadError, Review};

pub use session::{InspectionStore, StreamStatus, ViewState};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.debounce, DEFAULT_DEBOUNCE);
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("INSPECTOR_DATA", "/tmp/r.json"),
            ("INSPECTOR_ADDR", "0.0.0.0:8080"),
            ("INSPECTOR_DEBOUNCE_MS", "100"),
        ]));
        assert_eq!(config.data_path, PathBuf::from("/tmp/r.json"));
        assert_eq!(config.addr, "0.0.0.0:8080");
        assert_eq!(config.debounce, Duration::from_millis(100));
    }

    #[test]
    fn test_config_bad_debounce_falls_back() {
        let config = Config::from_lookup(lookup(&[("INSPECTOR_DEBOUNCE_MS", "soon"), ("INSPECTOR_ADDR", " ")]));
        assert_eq!(config.debounce, Duration::from_millis(DEBOUNCE_MS));
        assert_eq!(config.addr, BIND_ADDR);
    }

    #[test]
    fn test_new_store_shows_review_note() {
        let state = AppState::new(Review::new("Note text", vec![]), Config::default());
        let store = state.new_store();
        assert_eq!(store.document(), "Note text");
        assert!(!store.is_active());
    }
}
