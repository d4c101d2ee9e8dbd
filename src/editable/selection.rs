//! Offset-based selection used by the snippet engine.

use std::ops::Range;

/// A text selection with anchor (start point) and head (cursor position),
/// both as character offsets into the document.
/// The anchor stays fixed while the head moves during selection extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OffsetSelection {
    /// Where the selection started (fixed point)
    pub anchor: usize,
    /// Where the cursor is (moving point)
    pub head: usize,
}

impl OffsetSelection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor with no selection)
    pub fn cursor(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    /// Select a range forwards (anchor at start, head at end)
    pub fn range(range: Range<usize>) -> Self {
        Self {
            anchor: range.start,
            head: range.end,
        }
    }

    /// Check if selection is empty (anchor == head)
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Minimum of anchor and head
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Maximum of anchor and head
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Check if selection is reversed (head before anchor)
    pub fn is_reversed(&self) -> bool {
        self.head < self.anchor
    }

    /// The selected range, normalized so that start <= end
    pub fn as_range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// True when the selection covers exactly `range`.
    /// For an empty range this means the cursor sits on it.
    pub fn spans(&self, range: Range<usize>) -> bool {
        self.start() == range.start && self.end() == range.end
    }

    /// True when the whole selection lies within `range` (inclusive at both ends)
    pub fn is_within(&self, range: Range<usize>) -> bool {
        self.start() >= range.start && self.end() <= range.end
    }

    /// Clamp both ends to a document length
    pub fn clamped(self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            head: self.head.min(len),
        }
    }
}
