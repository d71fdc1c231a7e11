//! HTML components for the inspection page.
//!
//! Contains the navigation bar, the criteria pane, the note pane, and the
//! page shell that ties them to the session script.

use crate::models::{CriteriaTab, Guideline, MatchKind};
use crate::render::html_escape;

use super::script::SCRIPT;
use super::styles::STYLE;

// ============================================================================
// Navigation Bar
// ============================================================================

pub fn nav_bar(title: &str) -> String {
    format!(
        r#"<nav class="nav-bar">
            <span class="title">{}</span>
            <span class="spacer"></span>
            <span class="status" id="connection-status">connecting</span>
        </nav>"#,
        html_escape(title)
    )
}

// ============================================================================
// Criteria Pane
// ============================================================================

fn tab_button(tab: CriteriaTab, active: CriteriaTab) -> String {
    let value = match tab {
        CriteriaTab::Met => "met",
        CriteriaTab::All => "all",
    };
    format!(
        r#"<button class="tab{}" data-tab="{}" onclick="sendTab('{}')">{}</button>"#,
        if tab == active { " active" } else { "" },
        value,
        value,
        tab.title()
    )
}

pub fn tab_bar(active: CriteriaTab) -> String {
    format!(
        r#"<div class="tabs" id="tabs">{}{}</div>"#,
        tab_button(CriteriaTab::Met, active),
        tab_button(CriteriaTab::All, active)
    )
}

/// The guideline list shown under the active tab.
pub fn criteria_list(guidelines: &[&Guideline]) -> String {
    if guidelines.is_empty() {
        return r#"<p class="empty">No criteria to show.</p>"#.to_string();
    }

    let mut html = String::from(r#"<ul class="criteria-list">"#);
    for g in guidelines {
        let (badge_class, badge_text) = if g.criterion_met {
            ("met", "met")
        } else {
            ("unmet", "not met")
        };
        let sources = if g.citations.is_empty() {
            r#"<button class="sources" disabled>No sources</button>"#.to_string()
        } else {
            format!(
                r#"<button class="sources" onclick="sendActivate('{}')">View sources ({})</button>"#,
                html_escape(&g.number),
                g.citations.len()
            )
        };
        html.push_str(&format!(
            r#"<li class="criterion">
                <div><span class="number">{number}.</span><span class="badge {badge_class}">{badge_text}</span></div>
                <div class="report">{report}</div>
                {sources}
            </li>"#,
            number = html_escape(&g.number),
            badge_class = badge_class,
            badge_text = badge_text,
            report = html_escape(&g.report_text),
            sources = sources,
        ));
    }
    html.push_str("</ul>");
    html
}

// ============================================================================
// Note Pane
// ============================================================================

fn search_bar(kind: MatchKind, placeholder: &str) -> String {
    let (class, id) = match kind {
        MatchKind::Search => ("search-bar", "search"),
        MatchKind::Citation => ("search-bar citation", "citation-search"),
    };
    let kind = match kind {
        MatchKind::Search => "search",
        MatchKind::Citation => "citation",
    };
    format!(
        r#"<div class="{class}">
            <input type="text" id="{id}-input" placeholder="{placeholder}" oninput="sendQuery('{kind}', this.value)">
            <span class="label" id="{id}-label">0 of 0</span>
            <button onclick="sendNav('previous', '{kind}')" title="Previous">&uarr;</button>
            <button onclick="sendNav('next', '{kind}')" title="Next">&darr;</button>
            <button onclick="sendClear('{kind}')" title="Clear">&times;</button>
            {close}
        </div>"#,
        class = class,
        id = id,
        placeholder = placeholder,
        kind = kind,
        close = if kind == "citation" {
            r#"<button onclick="send({type: 'close'})" title="Close sources">Done</button>"#
        } else {
            ""
        },
    )
}

pub fn note_pane(note_html: &str) -> String {
    format!(
        r#"<section class="pane">
            {search}
            {citation}
            <div class="pane-body"><article class="note" id="note">{note}</article></div>
        </section>"#,
        search = search_bar(MatchKind::Search, "Search note..."),
        citation = search_bar(MatchKind::Citation, "Search sources..."),
        note = note_html,
    )
}

// ============================================================================
// Page Shell
// ============================================================================

pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
    {nav}
    {content}
    <script>{script}</script>
</body>
</html>"#,
        title = html_escape(title),
        style = STYLE,
        nav = nav_bar(title),
        content = content,
        script = SCRIPT,
    )
}

/// The two-pane inspection page: criteria on the left, the note on the right.
pub fn inspection_page(guidelines: &[&Guideline], tab: CriteriaTab, note_html: &str) -> String {
    let content = format!(
        r#"<main class="panes">
            <section class="pane">
                {tabs}
                <div class="pane-body" id="criteria">{criteria}</div>
            </section>
            {note}
        </main>"#,
        tabs = tab_bar(tab),
        criteria = criteria_list(guidelines),
        note = note_pane(note_html),
    );
    base_html("Note Inspection", &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guideline(number: &str, met: bool, citations: usize) -> Guideline {
        Guideline {
            number: number.to_string(),
            report_text: format!("Report <{}>", number),
            criterion_met: met,
            citations: vec!["cited_text='x', start_char_index=0, end_char_index=1".to_string(); citations],
        }
    }

    #[test]
    fn test_criteria_list_escapes_and_counts_sources() {
        let g = guideline("3", true, 2);
        let html = criteria_list(&[&g]);
        assert!(html.contains("Report &lt;3&gt;"));
        assert!(html.contains("sendActivate('3')"));
        assert!(html.contains("View sources (2)"));
        assert!(html.contains(r#"badge met"#));
    }

    #[test]
    fn test_criteria_list_without_sources() {
        let g = guideline("4", false, 0);
        let html = criteria_list(&[&g]);
        assert!(html.contains("No sources"));
        assert!(html.contains("not met"));
    }

    #[test]
    fn test_empty_criteria_list() {
        assert!(criteria_list(&[]).contains("No criteria"));
    }

    #[test]
    fn test_tab_bar_marks_active() {
        let html = tab_bar(CriteriaTab::All);
        assert!(html.contains(r#"class="tab active" data-tab="all""#));
        assert!(html.contains(r#"class="tab" data-tab="met""#));
    }

    #[test]
    fn test_inspection_page_has_both_panes() {
        let g = guideline("1", true, 1);
        let html = inspection_page(&[&g], CriteriaTab::Met, "<p>note</p>");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"id="criteria""#));
        assert!(html.contains(r#"<article class="note" id="note"><p>note</p></article>"#));
        assert!(html.contains(r#"id="search-input""#));
        assert!(html.contains(r#"id="citation-search-input""#));
    }
}
