//! Inspection store: the single owner of the displayed note, the active
//! citation set, the criteria tab, and the two query streams drawn over the
//! note. Every mutation goes through a command method; derived state (match
//! sets, cursors) is recomputed in full whenever a committed input changes.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::citations::{locate_cited_text, parse_citations};
use crate::compositor::{composite, Composition, RangeSet};
use crate::debounce::Debouncer;
use crate::models::{
    Citation, CitationMatch, CriteriaTab, Guideline, MatchKind, ScrollTarget, SearchMatch,
};
use crate::navigation::MatchCursor;
use crate::render::render_markdown;
use crate::review::Review;
use crate::search::{find_citation_matches, find_matches};

// ============================================================================
// Query Streams
// ============================================================================

/// One debounced query with its committed match set and cursor.
#[derive(Debug, Clone)]
pub struct QueryStream<M> {
    raw: String,
    committed: String,
    matches: Vec<M>,
    cursor: MatchCursor,
    debouncer: Debouncer<String>,
    generation: u64,
}

impl<M> QueryStream<M> {
    fn new(delay: Duration) -> Self {
        Self {
            raw: String::new(),
            committed: String::new(),
            matches: Vec::new(),
            cursor: MatchCursor::new(),
            debouncer: Debouncer::new(delay),
            generation: 0,
        }
    }

    /// What the user typed, echoed immediately.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The query the current match set was computed from.
    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn matches(&self) -> &[M] {
        &self.matches
    }

    pub fn current(&self) -> Option<usize> {
        self.cursor.current()
    }

    /// Bumped every time the match set is replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    fn replace(&mut self, committed: String, matches: Vec<M>) {
        self.committed = committed;
        self.matches = matches;
        self.cursor.reset(self.matches.len());
        self.generation += 1;
    }

    fn clear(&mut self) {
        self.debouncer.cancel();
        self.raw.clear();
        self.replace(String::new(), Vec::new());
        self.cursor.clear();
    }

    fn next(&mut self) {
        self.cursor.next(self.matches.len());
    }

    fn previous(&mut self) {
        self.cursor.previous(self.matches.len());
    }

    fn status(&self) -> StreamStatus {
        StreamStatus {
            raw: self.raw.clone(),
            committed: self.committed.clone(),
            count: self.matches.len(),
            current: self.cursor.current(),
            label: self.cursor.label(self.matches.len()),
            pending: self.debouncer.is_pending(),
        }
    }
}

// ============================================================================
// View State
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamStatus {
    pub raw: String,
    pub committed: String,
    pub count: usize,
    pub current: Option<usize>,
    pub label: String,
    pub pending: bool,
}

/// Serializable summary of the store pushed to the host after each change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub tab: CriteriaTab,
    pub active: bool,
    pub citation_count: usize,
    pub search: StreamStatus,
    pub citation_search: StreamStatus,
    pub scroll: Option<ScrollTarget>,
}

// ============================================================================
// Store
// ============================================================================

pub struct InspectionStore {
    review: Review,
    document: String,
    citations: Vec<Citation>,
    active: bool,
    tab: CriteriaTab,
    search: QueryStream<SearchMatch>,
    citation_search: QueryStream<CitationMatch>,
}

impl InspectionStore {
    pub fn new(review: Review, debounce: Duration) -> Self {
        Self {
            review,
            document: String::new(),
            citations: Vec::new(),
            active: false,
            tab: CriteriaTab::default(),
            search: QueryStream::new(debounce),
            citation_search: QueryStream::new(debounce),
        }
    }

    // ---- Accessors ----

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn active_tab(&self) -> CriteriaTab {
        self.tab
    }

    pub fn review(&self) -> &Review {
        &self.review
    }

    pub fn search(&self) -> &QueryStream<SearchMatch> {
        &self.search
    }

    pub fn citation_search(&self) -> &QueryStream<CitationMatch> {
        &self.citation_search
    }

    /// Guidelines listed under the active tab.
    pub fn visible_guidelines(&self) -> Vec<&Guideline> {
        self.review.guidelines_for(self.tab)
    }

    // ---- Commands: document and tab ----

    /// Show a new note. The search set is recomputed against it.
    pub fn set_document(&mut self, document: impl Into<String>) {
        self.document = document.into();
        self.commit_search(self.search.committed.clone());
    }

    pub fn set_active_tab(&mut self, tab: CriteriaTab) {
        self.tab = tab;
    }

    // ---- Commands: queries ----

    /// Record a keystroke in the note search box. Clearing commits at once;
    /// anything else waits for the debounce window.
    pub fn set_search_query(&mut self, raw: impl Into<String>, now: Instant) {
        let raw = raw.into();
        if raw.is_empty() {
            self.clear_search();
            return;
        }
        self.search.raw = raw.clone();
        self.search.debouncer.schedule(raw, now);
    }

    pub fn set_citation_query(&mut self, raw: impl Into<String>, now: Instant) {
        let raw = raw.into();
        if raw.is_empty() {
            self.clear_citation_search();
            return;
        }
        self.citation_search.raw = raw.clone();
        self.citation_search.debouncer.schedule(raw, now);
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    pub fn clear_citation_search(&mut self) {
        self.citation_search.clear();
    }

    /// Commit any query whose debounce window has elapsed. Returns whether
    /// a match set was recomputed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if let Some(query) = self.search.debouncer.poll(now) {
            self.commit_search(query);
            changed = true;
        }
        if let Some(query) = self.citation_search.debouncer.poll(now) {
            self.commit_citation_search(query);
            changed = true;
        }
        changed
    }

    /// Earliest instant at which [`poll`](Self::poll) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (
            self.search.debouncer.deadline(),
            self.citation_search.debouncer.deadline(),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn commit_search(&mut self, query: String) {
        let matches = find_matches(&self.document, &query);
        debug!(query = %query, matches = matches.len(), "search committed");
        self.search.replace(query, matches);
    }

    fn commit_citation_search(&mut self, query: String) {
        let matches = find_citation_matches(&self.citations, &query);
        debug!(query = %query, matches = matches.len(), "citation search committed");
        self.citation_search.replace(query, matches);
    }

    // ---- Commands: navigation ----

    pub fn next(&mut self, kind: MatchKind) {
        match kind {
            MatchKind::Search => self.search.next(),
            MatchKind::Citation => self.citation_search.next(),
        }
    }

    pub fn previous(&mut self, kind: MatchKind) {
        match kind {
            MatchKind::Search => self.search.previous(),
            MatchKind::Citation => self.citation_search.previous(),
        }
    }

    // ---- Commands: citation sets ----

    /// Replace the citation set and the note in one step.
    ///
    /// The citation query is reset to the first citation's text and committed
    /// immediately, so no pending keystroke or stale cursor survives.
    pub fn activate_citations(&mut self, citations: Vec<Citation>, document: impl Into<String>) {
        self.citations = citations;
        self.active = true;
        self.document = document.into();

        let seed = self
            .citations
            .first()
            .map(|c| c.cited_text.clone())
            .unwrap_or_default();
        self.citation_search.debouncer.cancel();
        self.citation_search.raw = seed.clone();
        self.commit_citation_search(seed);
        self.commit_search(self.search.committed.clone());

        info!(
            citations = self.citations.len(),
            matches = self.citation_search.matches.len(),
            "citation set activated"
        );
    }

    /// Jump to the sources of guideline `number`, shown against the review
    /// note. Returns how many citations parsed, or `None` when the guideline
    /// is unknown or cites nothing.
    pub fn activate_guideline(&mut self, number: &str) -> Option<usize> {
        let guideline = self.review.guideline(number)?;
        if guideline.citations.is_empty() {
            debug!(guideline = number, "guideline has no citations");
            return None;
        }
        let citations = parse_citations(&guideline.citations);
        let count = citations.len();
        let note = self.review.note.clone();
        self.activate_citations(citations, note);
        Some(count)
    }

    /// Leave citation mode but keep the note on screen.
    pub fn close_citations(&mut self) {
        self.clear_citation_search();
        self.citations.clear();
        self.active = false;
    }

    /// Leave citation mode and drop the note.
    pub fn clear_citations(&mut self) {
        self.close_citations();
        self.set_document(String::new());
    }

    // ---- Derived output ----

    pub fn composite(&self) -> Composition {
        composite(
            &self.document,
            &RangeSet::from_search(&self.search.matches, self.search.current()),
            &RangeSet::from_citations(
                &self.citation_search.matches,
                self.citation_search.current(),
            ),
        )
    }

    pub fn render_html(&self) -> String {
        render_markdown(&self.document, &self.composite())
    }

    /// What the host should bring into view. A current search match wins;
    /// otherwise the current citation match; otherwise, in citation mode, the
    /// first place the first citation's text can be found. A current match
    /// lying past the end of the note has no decoration and is skipped.
    pub fn scroll_target(&self) -> Option<ScrollTarget> {
        let composition = self.composite();
        // Occluded matches scroll to the decoration drawn in their place.
        let shown = |kind, index| {
            composition
                .shown_as(kind, index)
                .map(|(kind, index)| ScrollTarget::Match { kind, index })
        };

        if let Some(target) = self
            .search
            .current()
            .and_then(|index| shown(MatchKind::Search, index))
        {
            return Some(target);
        }
        if !self.active {
            return None;
        }
        if let Some(target) = self
            .citation_search
            .current()
            .and_then(|index| shown(MatchKind::Citation, index))
        {
            return Some(target);
        }
        self.citations
            .first()
            .and_then(|c| locate_cited_text(&self.document, &c.cited_text))
            .map(|offset| ScrollTarget::Offset { offset })
    }

    pub fn snapshot(&self) -> ViewState {
        ViewState {
            tab: self.tab,
            active: self.active,
            citation_count: self.citations.len(),
            search: self.search.status(),
            citation_search: self.citation_search.status(),
            scroll: self.scroll_target(),
        }
    }
}
