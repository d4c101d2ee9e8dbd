//! Position remapping of live stops through document changes.
//!
//! Stops of the entry's current index are the ones being typed into: their
//! starts are sticky-before and their ends sticky-after, so an insertion at
//! either boundary grows them. Every other stop keeps insertions at its
//! boundaries outside itself. An empty stop that is not being edited stays a
//! cursor after the inserted text, so the exit of `return $1` does not swallow
//! what is typed into `$1`.

use super::effect::SessionEffect;
use super::stack::SessionStack;
use super::stop::LiveStop;
use crate::editable::{Assoc, ChangeSet};

/// Map every stop through `change`, clamping to the new document length.
/// `current_index` is the entry's active stop index; only its stops grow
/// with text inserted at their boundaries.
/// The result is not re-sorted; [`SessionStack::apply`] normalizes it.
pub fn remap_stops(
    stops: &[LiveStop],
    current_index: u32,
    change: &ChangeSet,
    doc_len: usize,
) -> Vec<LiveStop> {
    stops
        .iter()
        .map(|stop| {
            let (start_assoc, end_assoc) = if stop.index == current_index {
                (Assoc::Before, Assoc::After)
            } else {
                (Assoc::After, Assoc::Before)
            };
            let start = change.map_pos(stop.start, start_assoc).min(doc_len);
            let end = change
                .map_pos(stop.end, end_assoc)
                .min(doc_len)
                .max(start);
            LiveStop {
                start,
                end,
                ..stop.clone()
            }
        })
        .collect()
}

/// One `Replace` effect per entry whose offsets moved
pub fn remap_effects(stack: &SessionStack, change: &ChangeSet, doc_len: usize) -> Vec<SessionEffect> {
    if change.is_empty() {
        return Vec::new();
    }

    stack
        .entries()
        .iter()
        .enumerate()
        .filter_map(|(depth, entry)| {
            let stops = remap_stops(entry.stops(), entry.current_index(), change, doc_len);
            let moved = stops
                .iter()
                .zip(entry.stops())
                .any(|(new, old)| new.start != old.start || new.end != old.end);
            moved.then_some(SessionEffect::Replace { depth, stops })
        })
        .collect()
}

/// Remap every entry of `stack` through `change`
pub fn remap_stack(stack: &mut SessionStack, change: &ChangeSet, doc_len: usize) {
    for effect in remap_effects(stack, change, doc_len) {
        stack.apply(effect);
    }
}
