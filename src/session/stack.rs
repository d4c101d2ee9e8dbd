//! Stack of active snippet expansions.

use super::effect::SessionEffect;
use super::stop::{normalize_stops, LiveStop};
use crate::editable::OffsetSelection;

/// Unique id of a pushed entry. Never reused within one stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

/// Live bookkeeping for one in-progress expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntry {
    id: SessionId,
    current_index: u32,
    /// In document order, see [`normalize_stops`]
    stops: Vec<LiveStop>,
}

impl SessionEntry {
    fn new(id: SessionId, current_index: u32, mut stops: Vec<LiveStop>) -> Self {
        normalize_stops(&mut stops);
        Self {
            id,
            current_index,
            stops,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    pub fn stops(&self) -> &[LiveStop] {
        &self.stops
    }

    pub fn has_index(&self, index: u32) -> bool {
        self.stops.iter().any(|s| s.index == index)
    }

    /// Position of the first stop (in document order) with `index`
    pub fn position_of(&self, index: u32) -> Option<usize> {
        self.stops.iter().position(|s| s.index == index)
    }

    pub fn first_stop(&self, index: u32) -> Option<&LiveStop> {
        self.position_of(index).map(|pos| &self.stops[pos])
    }

    /// Position of the stop the user is working in: among the stops with the
    /// current index, the one touching the selection head, else the first.
    pub fn current_position(&self, selection: OffsetSelection) -> Option<usize> {
        let index = self.current_index;
        self.stops
            .iter()
            .position(|s| s.index == index && s.touches(selection.head))
            .or_else(|| self.position_of(index))
    }

    pub fn current_stop(&self, selection: OffsetSelection) -> Option<&LiveStop> {
        self.current_position(selection).map(|pos| &self.stops[pos])
    }
}

/// LIFO stack of expansions. Entry 0 is the outermost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStack {
    entries: Vec<SessionEntry>,
    next_id: u64,
}

impl SessionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The innermost (active) entry
    pub fn top(&self) -> Option<&SessionEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[SessionEntry] {
        &self.entries
    }

    pub fn get(&self, depth: usize) -> Option<&SessionEntry> {
        self.entries.get(depth)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Apply a `Push` and return the new entry's id
    pub fn push(&mut self, current_index: u32, stops: Vec<LiveStop>) -> SessionId {
        let id = SessionId(self.next_id);
        self.apply(SessionEffect::Push {
            current_index,
            stops,
        });
        id
    }

    /// Apply one transition. Effects that do not fit the current state (pop on
    /// an empty stack, replace at a missing depth) are ignored.
    pub fn apply(&mut self, effect: SessionEffect) {
        tracing::debug!(effect = effect.name(), depth = self.entries.len(), "session effect");

        match effect {
            SessionEffect::Push {
                current_index,
                stops,
            } => {
                let id = SessionId(self.next_id);
                self.next_id += 1;
                self.entries
                    .push(SessionEntry::new(id, current_index, stops));
            }
            SessionEffect::Pop => {
                self.entries.pop();
            }
            SessionEffect::UpdateIndex(index) => {
                if let Some(top) = self.entries.last_mut() {
                    top.current_index = index;
                }
            }
            SessionEffect::Replace { depth, mut stops } => match self.entries.get_mut(depth) {
                Some(entry) => {
                    normalize_stops(&mut stops);
                    entry.stops = stops;
                }
                None => tracing::debug!(depth, "Ignoring replace for missing session entry"),
            },
            SessionEffect::ClearAll => {
                self.entries.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{GroupId, StopKind};

    fn push(stack: &mut SessionStack, stops: Vec<LiveStop>) {
        stack.apply(SessionEffect::Push {
            current_index: 0,
            stops,
        });
    }

    fn sample_stops() -> Vec<LiveStop> {
        let group = StopKind::Reference(GroupId(0));
        vec![
            LiveStop::new(0, 24..24, StopKind::Standard),
            LiveStop::new(1, 9..9, group),
            LiveStop::new(1, 10..10, group),
            LiveStop::new(1, 21..21, group),
        ]
    }

    #[test]
    fn test_push_pop_and_ids() {
        let mut stack = SessionStack::new();
        push(&mut stack, sample_stops());
        push(&mut stack, sample_stops());

        assert_eq!(stack.len(), 2);
        let outer = stack.get(0).unwrap().id();
        let inner = stack.top().unwrap().id();
        assert_ne!(outer, inner);

        stack.apply(SessionEffect::Pop);
        assert_eq!(stack.top().unwrap().id(), outer);
        assert!(!stack.contains(inner));

        // Ids are never reused
        push(&mut stack, sample_stops());
        assert_ne!(stack.top().unwrap().id(), inner);
    }

    #[test]
    fn test_push_normalizes_and_links() {
        let mut stack = SessionStack::new();
        push(&mut stack, sample_stops());

        let top = stack.top().unwrap();
        let starts: Vec<usize> = top.stops().iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![9, 10, 21, 24]);
        assert_eq!(top.stops()[0].linked, vec![1, 2]);
        assert_eq!(top.stops()[2].linked, vec![0, 1]);
    }

    #[test]
    fn test_update_index_and_current_stop() {
        let mut stack = SessionStack::new();
        push(&mut stack, sample_stops());
        stack.apply(SessionEffect::UpdateIndex(1));

        let top = stack.top().unwrap();
        assert_eq!(top.current_index(), 1);
        assert_eq!(top.current_position(OffsetSelection::cursor(21)), Some(2));
        // Selection elsewhere falls back to the first occurrence
        assert_eq!(top.current_position(OffsetSelection::cursor(0)), Some(0));
    }

    #[test]
    fn test_effects_on_empty_stack_are_ignored() {
        let mut stack = SessionStack::new();
        stack.apply(SessionEffect::Pop);
        stack.apply(SessionEffect::UpdateIndex(3));
        stack.apply(SessionEffect::Replace {
            depth: 2,
            stops: Vec::new(),
        });
        stack.apply(SessionEffect::ClearAll);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_replace_renormalizes() {
        let mut stack = SessionStack::new();
        push(&mut stack, sample_stops());

        let mut stops = stack.top().unwrap().stops().to_vec();
        stops.reverse();
        stops[0].start = 2;
        stops[0].end = 2;
        stack.apply(SessionEffect::Replace { depth: 0, stops });

        let top = stack.top().unwrap();
        assert_eq!(top.stops()[0].index, 0);
        assert_eq!(top.stops()[0].start, 2);
        assert_eq!(top.stops()[1].linked, vec![2, 3]);
    }
}
