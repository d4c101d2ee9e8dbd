//! Edit batches and change descriptors.
//!
//! Every mutation of the host surface is expressed as an [`EditBatch`] (a set of
//! non-overlapping `(from, to, insert)` edits plus a tag) and reported back as a
//! [`ChangeSet`], which can map any pre-change offset to its post-change value.

use std::ops::Range;

/// Which side of an insertion an offset sticks to when the insertion
/// happens exactly at that offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    /// Stay before inserted text
    Before,
    /// Move past inserted text
    After,
}

/// Identifies where an edit came from so the snippet engine can recognize
/// (and ignore) change notifications caused by its own transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditTag {
    /// Typing, pasting, or any other edit the engine did not issue
    User,
    /// Snippet insertion
    Expansion,
    /// Choice cycling on a tab stop
    Choice,
    /// Reference synchronization, carrying the operation id that issued it
    Sync(u64),
}

impl EditTag {
    /// True for transactions issued by the snippet engine itself
    pub fn is_engine_owned(&self) -> bool {
        !matches!(self, EditTag::User)
    }
}

/// A single replacement of the character range `from..to` with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub from: usize,
    pub to: usize,
    pub insert: String,
}

impl TextEdit {
    pub fn new(from: usize, to: usize, insert: impl Into<String>) -> Self {
        Self {
            from,
            to,
            insert: insert.into(),
        }
    }

    /// Pure insertion at an offset
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }

    /// Pure deletion of a range
    pub fn delete(range: Range<usize>) -> Self {
        Self::new(range.start, range.end, String::new())
    }

    /// Replace a range with text
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self::new(range.start, range.end, text)
    }

    pub fn range(&self) -> Range<usize> {
        self.from..self.to
    }

    /// Inserted length in characters
    pub fn inserted_len(&self) -> usize {
        self.insert.chars().count()
    }

    /// Signed change in document length
    pub fn delta(&self) -> isize {
        self.inserted_len() as isize - (self.to - self.from) as isize
    }
}

/// A batch of edits applied as one atomic transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBatch {
    pub edits: Vec<TextEdit>,
    pub tag: EditTag,
}

impl EditBatch {
    pub fn new(edits: Vec<TextEdit>, tag: EditTag) -> Self {
        Self { edits, tag }
    }

    pub fn single(edit: TextEdit, tag: EditTag) -> Self {
        Self {
            edits: vec![edit],
            tag,
        }
    }

    /// Check that no two edits overlap and every edit is well-formed.
    /// Two insertions at the same offset count as overlapping.
    pub fn validate(&self, doc_len: usize) -> Result<(), String> {
        let mut sorted: Vec<&TextEdit> = self.edits.iter().collect();
        sorted.sort_by_key(|e| (e.from, e.to));

        for edit in &sorted {
            if edit.from > edit.to {
                return Err(format!("Inverted edit range {}..{}", edit.from, edit.to));
            }
            if edit.to > doc_len {
                return Err(format!(
                    "Edit range {}..{} exceeds document length {}",
                    edit.from, edit.to, doc_len
                ));
            }
        }

        for pair in sorted.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if b.from < a.to || (a.from == b.from && a.from == a.to) {
                return Err(format!(
                    "Overlapping edits {}..{} and {}..{}",
                    a.from, a.to, b.from, b.to
                ));
            }
        }

        Ok(())
    }
}

/// Description of an applied batch, in pre-change coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    /// Edits sorted ascending by `from`
    edits: Vec<TextEdit>,
    tag: EditTag,
}

impl ChangeSet {
    pub fn new(mut edits: Vec<TextEdit>, tag: EditTag) -> Self {
        edits.sort_by_key(|e| (e.from, e.to));
        Self { edits, tag }
    }

    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    pub fn tag(&self) -> EditTag {
        self.tag
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Total signed change in document length
    pub fn delta(&self) -> isize {
        self.edits.iter().map(TextEdit::delta).sum()
    }

    /// Map a pre-change offset to its post-change value.
    ///
    /// Offsets strictly before an edit are untouched; offsets strictly after
    /// shift by its delta, as does the end boundary of a replaced range. An
    /// offset inside a replaced range (or exactly at its start) lands at the
    /// start of the inserted text for [`Assoc::Before`] and at its end for
    /// [`Assoc::After`].
    pub fn map_pos(&self, pos: usize, assoc: Assoc) -> usize {
        let mut delta: isize = 0;
        for edit in &self.edits {
            if pos < edit.from {
                break;
            }
            if pos > edit.to || (pos == edit.to && edit.from < edit.to) {
                delta += edit.delta();
                continue;
            }
            let base = edit.from as isize + delta;
            let mapped = match assoc {
                Assoc::Before => base,
                Assoc::After => base + edit.inserted_len() as isize,
            };
            return mapped.max(0) as usize;
        }
        (pos as isize + delta).max(0) as usize
    }
}
