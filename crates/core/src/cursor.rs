//! Index-based selection over a cached list.

/// A single nullable cursor into a list of `len` items.
///
/// Movement clamps at both ends instead of wrapping. The cursor does not
/// own the list; callers pass the current length on every move and
/// re-select by id after a reload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionCursor {
    index: Option<usize>,
}

impl SelectionCursor {
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_open(&self) -> bool {
        self.index.is_some()
    }

    /// Select `index`; out-of-range indices are ignored.
    ///
    /// Returns `true` when the selection changed.
    pub fn select(&mut self, index: usize, len: usize) -> bool {
        if index >= len || self.index == Some(index) {
            return false;
        }
        self.index = Some(index);
        true
    }

    /// Move one step forward. No-op on the last item or without a
    /// selection.
    pub fn next(&mut self, len: usize) -> bool {
        match self.index {
            Some(i) if i + 1 < len => {
                self.index = Some(i + 1);
                true
            }
            _ => false,
        }
    }

    /// Move one step back. No-op on the first item or without a selection.
    pub fn prev(&mut self) -> bool {
        match self.index {
            Some(i) if i > 0 => {
                self.index = Some(i - 1);
                true
            }
            _ => false,
        }
    }

    pub fn close(&mut self) {
        self.index = None;
    }
}
