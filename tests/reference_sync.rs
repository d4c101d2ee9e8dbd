//! Reference synchronization through the controller

mod common;

use common::{assert_stops_consistent, backspace, insert, setup, stop_texts, top_stops, type_text};
use token_snippets::editable::{EditorSurface, OffsetSelection};
use token_snippets::sync::{SkipReason, SyncMode, SyncOutcome};
use token_snippets::Navigation;

// ========================================================================
// On-Jump Mode
// ========================================================================

#[test]
fn test_function_name_mirrors_on_jump() {
    let (mut controller, mut surface) = setup(SyncMode::OnJump);
    insert(&mut controller, &mut surface, "function $1($1) { return $1; }");
    assert_eq!(surface.text(), "function () { return ; }");

    let entry = controller.stack().top().unwrap();
    let linked: Vec<_> = entry.stops().iter().filter(|s| s.index == 1).collect();
    assert_eq!(linked.len(), 3);
    assert!(linked.iter().all(|s| s.is_reference() && s.linked.len() == 2));

    type_text(&mut controller, &mut surface, "myFunc");
    assert_eq!(surface.text(), "function myFunc() { return ; }");

    assert_eq!(controller.jump_next(&mut surface), Navigation::Moved { index: 0 });
    assert_eq!(surface.text(), "function myFunc(myFunc) { return myFunc; }");
    assert_eq!(stop_texts(&controller, &surface, 1), vec!["myFunc"; 3]);
    assert_eq!(
        top_stops(&controller),
        vec![(1, 9..15), (1, 16..22), (1, 33..39), (0, 42..42)]
    );
    assert_eq!(surface.selection(), OffsetSelection::cursor(42));
    assert_stops_consistent(&controller, &surface);
}

#[test]
fn test_second_sync_in_flight_leaves_document_unchanged() {
    let (mut controller, mut surface) = setup(SyncMode::OnJump);
    insert(&mut controller, &mut surface, "$1 -> $1");
    type_text(&mut controller, &mut surface, "a");

    assert!(controller.sync_now(&mut surface).is_applied());
    assert_eq!(surface.text(), "a -> a");

    type_text(&mut controller, &mut surface, "b");
    let before = surface.text();
    assert_eq!(
        controller.sync_now(&mut surface),
        SyncOutcome::Skipped(SkipReason::InFlight)
    );
    assert_eq!(surface.text(), before);
}

#[test]
fn test_groups_sync_independently() {
    let (mut controller, mut surface) = setup(SyncMode::OnJump);
    insert(&mut controller, &mut surface, "const $1 = $2; const $1 = $2;");

    type_text(&mut controller, &mut surface, "a");
    assert_eq!(controller.jump_next(&mut surface), Navigation::Moved { index: 2 });
    assert_eq!(surface.text(), "const a = ; const a = ;");
    assert_eq!(stop_texts(&controller, &surface, 2), vec![""; 2]);

    type_text(&mut controller, &mut surface, "1");
    assert_eq!(controller.jump_next(&mut surface), Navigation::Moved { index: 0 });
    assert_eq!(surface.text(), "const a = 1; const a = 1;");
    assert_eq!(stop_texts(&controller, &surface, 1), vec!["a"; 2]);
    assert_eq!(stop_texts(&controller, &surface, 2), vec!["1"; 2]);
    assert_stops_consistent(&controller, &surface);
}

#[test]
fn test_replacing_default_text_then_sync() {
    let (mut controller, mut surface) = setup(SyncMode::OnJump);
    insert(&mut controller, &mut surface, "${1:foo}(${1:foo})");
    assert_eq!(surface.selection(), OffsetSelection::new(0, 3));

    backspace(&mut controller, &mut surface);
    assert_eq!(surface.text(), "(foo)");
    type_text(&mut controller, &mut surface, "x");

    controller.jump_next(&mut surface);
    assert_eq!(surface.text(), "x(x)");
    assert_eq!(top_stops(&controller), vec![(1, 0..1), (1, 2..3), (0, 4..4)]);
}

#[test]
fn test_outer_reference_synced_after_nested_exit() {
    let (mut controller, mut surface) = setup(SyncMode::OnJump);
    insert(&mut controller, &mut surface, "$1 + $1");
    insert(&mut controller, &mut surface, "f($1)");
    assert_eq!(surface.text(), "f() + ");

    type_text(&mut controller, &mut surface, "x");
    assert_eq!(controller.jump_next(&mut surface), Navigation::Moved { index: 0 });
    assert_eq!(controller.depth(), 2);

    // Falling through to the outer session leaves its reference stop
    assert_eq!(controller.jump_next(&mut surface), Navigation::Moved { index: 0 });
    assert_eq!(controller.depth(), 1);
    assert_eq!(surface.text(), "f(x) + f(x)");
    assert_eq!(surface.selection(), OffsetSelection::cursor(11));
    assert_stops_consistent(&controller, &surface);
}

// ========================================================================
// Realtime Mode
// ========================================================================

#[test]
fn test_realtime_drops_keystrokes_while_in_flight() {
    let (mut controller, mut surface) = setup(SyncMode::Realtime);
    insert(&mut controller, &mut surface, "$1 = $1");

    type_text(&mut controller, &mut surface, "a");
    type_text(&mut controller, &mut surface, "b");
    assert_eq!(surface.text(), "ab = ");

    // The pending continuation reads the live text, so nothing is lost
    assert!(controller.tick(&mut surface).is_some_and(|o| o.is_applied()));
    assert_eq!(surface.text(), "ab = ab");
    assert_eq!(controller.tick(&mut surface), None);

    type_text(&mut controller, &mut surface, "c");
    controller.tick(&mut surface);
    assert_eq!(surface.text(), "abc = abc");

    // Dropped while settling, caught up when leaving the stop
    type_text(&mut controller, &mut surface, "d");
    assert_eq!(surface.text(), "abcd = abc");
    assert_eq!(controller.jump_next(&mut surface), Navigation::Moved { index: 0 });
    assert_eq!(surface.text(), "abcd = abcd");
    assert_stops_consistent(&controller, &surface);
}

#[test]
fn test_realtime_ignores_edits_outside_reference_stop() {
    let (mut controller, mut surface) = setup(SyncMode::Realtime);
    insert(&mut controller, &mut surface, "$1 $1 ${2:x}");
    controller.jump_next(&mut surface);
    assert_eq!(surface.selection(), OffsetSelection::new(2, 3));

    type_text(&mut controller, &mut surface, "y");
    assert!(!controller.needs_tick());
    assert_eq!(surface.text(), "  y");
}
