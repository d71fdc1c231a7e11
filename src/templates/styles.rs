//! CSS for the inspection page.

// ============================================================================
// CSS Styles
// ============================================================================

pub const STYLE: &str = r#"
/* Solarized Light Theme */
:root {
    --base01: #586e75;
    --base00: #657b83;
    --base1: #93a1a1;
    --base2: #eee8d5;
    --base3: #fdf6e3;

    --yellow: #b58900;
    --orange: #cb4b16;
    --blue: #268bd2;
    --cyan: #2aa198;
    --green: #859900;

    --bg: var(--base3);
    --fg: var(--base00);
    --muted: var(--base1);
    --border: var(--base2);
    --link: var(--blue);
    --panel-bg: #f5ecd5;
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    line-height: 1.6;
    color: var(--fg);
    background: var(--bg);
    height: 100vh;
    display: flex;
    flex-direction: column;
}

.nav-bar {
    background: var(--bg);
    border-bottom: 1px solid var(--border);
    padding: 0.5rem 1rem;
    display: flex;
    gap: 1rem;
    align-items: center;
}
.nav-bar .title { font-weight: 600; color: var(--base01); }
.nav-bar .spacer { flex: 1; }
.nav-bar .status { font-size: 0.8rem; color: var(--muted); }

.panes {
    flex: 1;
    display: grid;
    grid-template-columns: minmax(280px, 2fr) 3fr;
    min-height: 0;
}

.pane {
    display: flex;
    flex-direction: column;
    min-height: 0;
    border-right: 1px solid var(--border);
}
.pane-body { flex: 1; overflow-y: auto; padding: 1rem; }

/* Tabs */
.tabs { display: flex; border-bottom: 1px solid var(--border); }
.tab {
    flex: 1;
    background: none;
    border: none;
    border-bottom: 2px solid transparent;
    padding: 0.5rem;
    color: var(--muted);
    cursor: pointer;
    font-size: 0.9rem;
}
.tab.active { color: var(--base01); border-bottom-color: var(--blue); }

/* Criteria list */
.criteria-list { list-style: none; }
.criterion {
    padding: 0.6rem 0.5rem;
    border-bottom: 1px solid var(--border);
}
.criterion .number { font-weight: 600; color: var(--base01); margin-right: 0.4rem; }
.criterion .badge {
    font-size: 0.7rem;
    padding: 0.1rem 0.4rem;
    border-radius: 3px;
    margin-left: 0.4rem;
}
.criterion .badge.met { background: var(--green); color: var(--base3); }
.criterion .badge.unmet { background: var(--base2); color: var(--muted); }
.criterion .report { font-size: 0.85rem; margin-top: 0.3rem; }
.criterion button.sources {
    margin-top: 0.3rem;
    background: none;
    border: 1px solid var(--border);
    border-radius: 3px;
    padding: 0.1rem 0.5rem;
    color: var(--link);
    cursor: pointer;
    font-size: 0.8rem;
}
.criterion button.sources:disabled { color: var(--muted); cursor: default; }
.empty { color: var(--muted); font-style: italic; padding: 1rem 0.5rem; }

/* Search bars */
.search-bar {
    display: flex;
    gap: 0.4rem;
    align-items: center;
    padding: 0.4rem 1rem;
    border-bottom: 1px solid var(--border);
    background: var(--panel-bg);
}
.search-bar input {
    flex: 1;
    padding: 0.3rem 0.5rem;
    border: 1px solid var(--border);
    border-radius: 3px;
    background: var(--bg);
    color: var(--fg);
}
.search-bar .label { font-size: 0.75rem; color: var(--muted); min-width: 4.5rem; text-align: right; }
.search-bar button {
    background: none;
    border: 1px solid var(--border);
    border-radius: 3px;
    padding: 0.1rem 0.5rem;
    cursor: pointer;
    color: var(--fg);
}
.search-bar.citation { display: none; }
body.citations-active .search-bar.citation { display: flex; }

/* Note */
.note h1, .note h2, .note h3 { font-weight: 600; margin: 1em 0 0.5em; }
.note p { margin-bottom: 0.8em; }
.note ul, .note ol { margin: 0 0 0.8em 1.5em; }
.note pre, .note code { background: var(--border); border-radius: 3px; }
.note table { border-collapse: collapse; margin-bottom: 0.8em; }
.note td, .note th { border: 1px solid var(--border); padding: 0.2rem 0.5rem; }

/* Highlights */
mark { color: inherit; border-radius: 2px; }
mark.highlight-search { background: rgba(181, 137, 0, 0.25); }
mark.highlight-search-current { background: rgba(203, 75, 22, 0.45); outline: 1px solid var(--orange); }
mark.highlight-citation { background: rgba(42, 161, 152, 0.2); }
mark.highlight-citation-current { background: rgba(38, 139, 210, 0.35); outline: 1px solid var(--blue); }
.scroll-flash { animation: flash 1s ease-out; }
@keyframes flash { from { background: rgba(38, 139, 210, 0.35); } to { background: transparent; } }
"#;
