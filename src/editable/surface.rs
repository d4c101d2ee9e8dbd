//! The host text-editing surface consumed by the snippet engine.
//!
//! [`EditorSurface`] is everything the engine needs from an editor: range reads,
//! selection access, line/column conversion, and one atomic batch-edit primitive.
//! [`RopeSurface`] is the reference implementation backed by `ropey::Rope`.

use anyhow::{anyhow, Result};
use ropey::Rope;
use std::ops::Range;

use super::change::{Assoc, ChangeSet, EditBatch, EditTag, TextEdit};
use super::position::Position;
use super::selection::OffsetSelection;

/// Host surface abstraction. All offsets are character offsets.
pub trait EditorSurface {
    /// Total length in characters
    fn len_chars(&self) -> usize;

    /// Get slice of text as String (clamped to the document)
    fn slice(&self, range: Range<usize>) -> String;

    /// Current primary selection
    fn selection(&self) -> OffsetSelection;

    /// Replace the primary selection (clamped to the document)
    fn set_selection(&mut self, selection: OffsetSelection);

    /// Convert (line, column) to a character offset
    fn position_to_offset(&self, position: Position) -> usize;

    /// Convert a character offset to (line, column)
    fn offset_to_position(&self, offset: usize) -> Position;

    /// Apply a batch of edits as one transaction and describe what changed.
    ///
    /// Implementations map their own selection through the change.
    fn apply(&mut self, batch: EditBatch) -> Result<ChangeSet>;

    /// Text between the start of the line containing `offset` and `offset`
    fn line_prefix(&self, offset: usize) -> String {
        let offset = offset.min(self.len_chars());
        let position = self.offset_to_position(offset);
        let line_start = self.position_to_offset(Position::new(position.line, 0));
        self.slice(line_start..offset)
    }
}

/// Multi-line document surface backed by a rope, with a single selection.
#[derive(Debug, Clone)]
pub struct RopeSurface {
    rope: Rope,
    selection: OffsetSelection,
    /// Incremented on each applied batch
    revision: u64,
}

impl RopeSurface {
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            selection: OffsetSelection::default(),
            revision: 0,
        }
    }

    /// Create a surface with initial text and the cursor at the end
    pub fn from_text(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let end = rope.len_chars();
        Self {
            rope,
            selection: OffsetSelection::cursor(end),
            revision: 0,
        }
    }

    /// Access the underlying Rope
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Full content as a String
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Type text over the current selection, leaving the cursor after it.
    pub fn type_text(&mut self, text: &str) -> Result<ChangeSet> {
        let range = self.selection.as_range();
        let change = self.apply(EditBatch::single(
            TextEdit::replace(range.clone(), text),
            EditTag::User,
        ))?;
        let cursor = range.start + text.chars().count();
        self.selection = OffsetSelection::cursor(cursor);
        Ok(change)
    }

    /// Delete the selection, or the character before the cursor (Backspace).
    /// Returns None when there is nothing to delete.
    pub fn delete_backward(&mut self) -> Result<Option<ChangeSet>> {
        let range = if self.selection.is_empty() {
            let head = self.selection.head;
            if head == 0 {
                return Ok(None);
            }
            head - 1..head
        } else {
            self.selection.as_range()
        };

        let start = range.start;
        let change = self.apply(EditBatch::single(TextEdit::delete(range), EditTag::User))?;
        self.selection = OffsetSelection::cursor(start);
        Ok(Some(change))
    }
}

impl Default for RopeSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSurface for RopeSurface {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn slice(&self, range: Range<usize>) -> String {
        let start = range.start.min(self.len_chars());
        let end = range.end.min(self.len_chars());
        if start >= end {
            return String::new();
        }
        self.rope.slice(start..end).to_string()
    }

    fn selection(&self) -> OffsetSelection {
        self.selection
    }

    fn set_selection(&mut self, selection: OffsetSelection) {
        self.selection = selection.clamped(self.len_chars());
    }

    fn position_to_offset(&self, position: Position) -> usize {
        if position.line >= self.rope.len_lines() {
            return self.rope.len_chars();
        }
        let line_start = self.rope.line_to_char(position.line);
        let line = self.rope.line(position.line);
        let mut line_len = line.len_chars();
        // Exclude trailing newline if present
        if line_len > 0 && line.char(line_len - 1) == '\n' {
            line_len -= 1;
        }
        line_start + position.column.min(line_len)
    }

    fn offset_to_position(&self, offset: usize) -> Position {
        let clamped = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(clamped);
        let line_start = self.rope.line_to_char(line);
        Position::new(line, clamped - line_start)
    }

    fn apply(&mut self, batch: EditBatch) -> Result<ChangeSet> {
        batch
            .validate(self.len_chars())
            .map_err(|e| anyhow!("Rejected edit batch: {}", e))?;

        let change = ChangeSet::new(batch.edits, batch.tag);

        // Apply from the highest offset down so earlier offsets stay valid
        for edit in change.edits().iter().rev() {
            if edit.from < edit.to {
                self.rope.remove(edit.from..edit.to);
            }
            if !edit.insert.is_empty() {
                self.rope.insert(edit.from, &edit.insert);
            }
        }

        self.selection = OffsetSelection::new(
            change.map_pos(self.selection.anchor, Assoc::Before),
            change.map_pos(self.selection.head, Assoc::Before),
        )
        .clamped(self.len_chars());
        self.revision += 1;

        tracing::trace!(
            tag = ?change.tag(),
            edits = change.edits().len(),
            revision = self.revision,
            "applied edit batch"
        );

        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rope_surface_position_conversion() {
        let surface = RopeSurface::from_text("hello\nworld");
        assert_eq!(surface.offset_to_position(0), Position::new(0, 0));
        assert_eq!(surface.offset_to_position(5), Position::new(0, 5));
        assert_eq!(surface.offset_to_position(6), Position::new(1, 0));
        assert_eq!(surface.offset_to_position(11), Position::new(1, 5));

        assert_eq!(surface.position_to_offset(Position::new(0, 99)), 5);
        assert_eq!(surface.position_to_offset(Position::new(1, 0)), 6);
        assert_eq!(surface.position_to_offset(Position::new(7, 0)), 11);
    }

    #[test]
    fn test_apply_batch_is_atomic_and_ordered() {
        let mut surface = RopeSurface::from_text("a_b_c");
        let change = surface
            .apply(EditBatch::new(
                vec![
                    TextEdit::replace(0..1, "xx"),
                    TextEdit::replace(4..5, "zzz"),
                    TextEdit::replace(2..3, "y"),
                ],
                EditTag::User,
            ))
            .unwrap();

        assert_eq!(surface.text(), "xx_y_zzz");
        assert_eq!(change.delta(), 3);
        assert_eq!(surface.revision(), 1);
    }

    #[test]
    fn test_apply_rejects_overlap_without_mutating() {
        let mut surface = RopeSurface::from_text("hello");
        let result = surface.apply(EditBatch::new(
            vec![TextEdit::delete(0..3), TextEdit::delete(2..4)],
            EditTag::User,
        ));

        assert!(result.is_err());
        assert_eq!(surface.text(), "hello");
        assert_eq!(surface.revision(), 0);
    }

    #[test]
    fn test_type_text_replaces_selection() {
        let mut surface = RopeSurface::from_text("hello world");
        surface.set_selection(OffsetSelection::new(6, 11));
        surface.type_text("there").unwrap();

        assert_eq!(surface.text(), "hello there");
        assert_eq!(surface.selection(), OffsetSelection::cursor(11));
    }

    #[test]
    fn test_delete_backward() {
        let mut surface = RopeSurface::from_text("héllo");
        surface.set_selection(OffsetSelection::cursor(2));
        let change = surface.delete_backward().unwrap();

        assert!(change.is_some());
        assert_eq!(surface.text(), "hllo");
        assert_eq!(surface.selection(), OffsetSelection::cursor(1));

        surface.set_selection(OffsetSelection::cursor(0));
        assert!(surface.delete_backward().unwrap().is_none());
    }

    #[test]
    fn test_selection_maps_through_edits() {
        let mut surface = RopeSurface::from_text("0123456789");
        surface.set_selection(OffsetSelection::new(6, 8));
        surface
            .apply(EditBatch::single(TextEdit::insert(2, "ab"), EditTag::User))
            .unwrap();

        assert_eq!(surface.selection(), OffsetSelection::new(8, 10));
    }

    #[test]
    fn test_line_prefix() {
        let surface = RopeSurface::from_text("fn main() {\n    log");
        assert_eq!(surface.line_prefix(19), "    log");
        assert_eq!(surface.line_prefix(3), "fn ");
    }
}
