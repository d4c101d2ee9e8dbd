//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::ops::Range;

use token_snippets::editable::{ChangeSet, EditorSurface, OffsetSelection, RopeSurface};
use token_snippets::sync::SyncMode;
use token_snippets::template::parse;
use token_snippets::{Navigation, SnippetController, SnippetDefinition};

/// Create a controller and an empty surface
pub fn setup(mode: SyncMode) -> (SnippetController, RopeSurface) {
    (SnippetController::with_mode(mode), RopeSurface::new())
}

/// Insert `body` at the cursor and start a session
pub fn insert(controller: &mut SnippetController, surface: &mut RopeSurface, body: &str) -> Navigation {
    let at = surface.selection().head;
    controller.insert_template(surface, &parse(body), at..at)
}

/// Type text over the selection and notify the controller, as a host would
pub fn type_text(controller: &mut SnippetController, surface: &mut RopeSurface, text: &str) -> ChangeSet {
    let change = surface.type_text(text).unwrap();
    controller.observe(surface, &change);
    change
}

/// Backspace and notify the controller
pub fn backspace(controller: &mut SnippetController, surface: &mut RopeSurface) {
    if let Some(change) = surface.delete_backward().unwrap() {
        controller.observe(surface, &change);
    }
}

/// Move the cursor without editing
pub fn move_cursor(surface: &mut RopeSurface, offset: usize) {
    surface.set_selection(OffsetSelection::cursor(offset));
}

/// (index, range) of every stop in the innermost session, in document order
pub fn top_stops(controller: &SnippetController) -> Vec<(u32, Range<usize>)> {
    controller
        .stack()
        .top()
        .map(|entry| entry.stops().iter().map(|s| (s.index, s.range())).collect())
        .unwrap_or_default()
}

/// Live text of every stop with `index` in the innermost session
pub fn stop_texts(controller: &SnippetController, surface: &RopeSurface, index: u32) -> Vec<String> {
    controller
        .stack()
        .top()
        .map(|entry| {
            entry
                .stops()
                .iter()
                .filter(|s| s.index == index)
                .map(|s| surface.slice(s.range()))
                .collect()
        })
        .unwrap_or_default()
}

/// Assert every session entry's stops are ordered, in bounds, and non-inverted
pub fn assert_stops_consistent(controller: &SnippetController, surface: &RopeSurface) {
    let len = surface.len_chars();
    for entry in controller.stack().entries() {
        let stops = entry.stops();
        for stop in stops {
            assert!(stop.start <= stop.end, "inverted stop {:?}", stop.range());
            assert!(stop.end <= len, "stop {:?} past end {}", stop.range(), len);
        }
        for pair in stops.windows(2) {
            assert!(pair[0].start <= pair[1].start, "stops out of order");
        }
    }
}

pub fn snippet(prefix: &str, body: &str) -> SnippetDefinition {
    SnippetDefinition::new(prefix, body)
}
