//! Cyclic "current match" cursor, one per range set.

use serde::Serialize;

/// Which match of a range set is current. `None` means no current match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchCursor {
    current: Option<usize>,
}

impl MatchCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// The range set was replaced: select the first match, if any.
    pub fn reset(&mut self, len: usize) {
        self.current = if len > 0 { Some(0) } else { None };
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.current = Some(match self.current {
            Some(i) => (i + 1) % len,
            None => 0,
        });
    }

    /// Step back one match, wrapping to the last. With no current match the
    /// cursor lands on the last match, not the one before it.
    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.current = Some(match self.current {
            Some(i) => (i % len + len - 1) % len,
            None => len - 1,
        });
    }

    /// Drop the selection regardless of how many matches exist.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Position text shown next to a search box, e.g. `"2 of 5"`.
    pub fn label(&self, len: usize) -> String {
        let position = self.current.map_or(0, |i| i + 1);
        format!("{} of {}", position, len)
    }
}
