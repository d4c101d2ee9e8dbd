//! Live tab stops: template stops placed at absolute document offsets.

use std::ops::Range;

use crate::template::{GroupId, StopKind, TabStop};

/// A tab stop inside the live document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveStop {
    pub index: u32,
    pub start: usize,
    pub end: usize,
    pub choices: Option<Vec<String>>,
    pub kind: StopKind,
    /// Positions (in the owning entry's stop list) of the other members of
    /// this stop's reference group. Recomputed whenever the list is re-sorted.
    pub linked: Vec<usize>,
}

impl LiveStop {
    pub fn new(index: u32, range: Range<usize>, kind: StopKind) -> Self {
        Self {
            index,
            start: range.start,
            end: range.end,
            choices: None,
            kind,
            linked: Vec::new(),
        }
    }

    /// Place a parsed stop at `base` in the document
    pub fn from_tab_stop(stop: &TabStop, base: usize) -> Self {
        Self {
            index: stop.index,
            start: base + stop.start,
            end: base + stop.end,
            choices: stop.choices.clone(),
            kind: stop.kind,
            linked: Vec::new(),
        }
    }

    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn group(&self) -> Option<GroupId> {
        self.kind.group()
    }

    pub fn is_reference(&self) -> bool {
        self.kind.is_reference()
    }

    /// True when `offset` lies inside the stop, counting both boundaries
    pub fn touches(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Document order by `(start, end, index)`, except that at equal ranges the
    /// exit stop sorts after the others. Text inserted at a shared offset
    /// belongs to the numbered stop, so the exit must come after it for offset
    /// shifts computed in list order (see `sync::plan_sync`).
    pub(crate) fn sort_key(&self) -> (usize, usize, bool, u32) {
        (self.start, self.end, self.index == 0, self.index)
    }
}

/// Restore the stop-list invariants: `start <= end`, sorted in document
/// order, and symmetric, non-self `linked` lists.
pub fn normalize_stops(stops: &mut [LiveStop]) {
    for stop in stops.iter_mut() {
        if stop.end < stop.start {
            stop.end = stop.start;
        }
    }

    stops.sort_by_key(LiveStop::sort_key);

    let groups: Vec<Option<GroupId>> = stops.iter().map(LiveStop::group).collect();
    for (i, stop) in stops.iter_mut().enumerate() {
        stop.linked = match groups[i] {
            Some(group) => groups
                .iter()
                .enumerate()
                .filter(|&(j, g)| j != i && *g == Some(group))
                .map(|(j, _)| j)
                .collect(),
            None => Vec::new(),
        };
    }
}
