use crate::markers::Indenter;
use crate::types::{Pt, Rect};

/// Running sum of every `Indenter` processed so far in a pass.
///
/// Deltas are not required to balance; the totals simply carry over frame,
/// page and template changes until another delta moves them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndentState {
    pub left: Pt,
    pub right: Pt,
}

impl Default for IndentState {
    fn default() -> Self {
        Self {
            left: Pt::ZERO,
            right: Pt::ZERO,
        }
    }
}

impl IndentState {
    pub fn apply(&mut self, delta: &Indenter) {
        self.left += delta.left;
        self.right += delta.right;
    }

    pub fn is_zero(&self) -> bool {
        self.left == Pt::ZERO && self.right == Pt::ZERO
    }

    /// Horizontal band content may use inside `frame`.
    pub fn content_box(&self, frame: Rect) -> Rect {
        frame.inset_horizontal(self.left, self.right)
    }
}
