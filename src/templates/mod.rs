//! HTML templates and styling for the inspector.
//!
//! ## Module Structure
//!
//! - `styles` - CSS constants and highlight classes
//! - `components` - Criteria pane, note pane, and the page shell
//! - `script` - Client script driving the session socket

mod components;
mod script;
mod styles;

pub use components::{base_html, criteria_list, inspection_page, nav_bar, note_pane, tab_bar};
pub use script::SCRIPT;
pub use styles::STYLE;
