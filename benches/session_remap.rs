//! Benchmarks for remapping live sessions through document changes
//!
//! Run with: cargo bench --bench session_remap

use token_snippets::editable::{ChangeSet, EditTag, TextEdit};
use token_snippets::session::{remap_stack, remap_stops, LiveStop, SessionStack};
use token_snippets::StopKind;

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

/// `count` stops, each 4 chars wide with 4 chars between them
fn stops(count: usize) -> Vec<LiveStop> {
    (0..count)
        .map(|i| {
            let start = i * 8;
            LiveStop::new(i as u32 + 1, start..start + 4, StopKind::Standard)
        })
        .collect()
}

#[divan::bench(args = [10, 100, 1_000])]
fn remap_single_keystroke(bencher: divan::Bencher, count: usize) {
    let stops = stops(count);
    let doc_len = count * 8;
    let change = ChangeSet::new(vec![TextEdit::insert(doc_len / 2, "x")], EditTag::User);
    bencher.bench(|| divan::black_box(remap_stops(&stops, 1, &change, doc_len + 1)));
}

#[divan::bench(args = [10, 100, 1_000])]
fn remap_many_edits(bencher: divan::Bencher, count: usize) {
    let stops = stops(count);
    let doc_len = count * 8;
    let edits = (0..count).map(|i| TextEdit::replace(i * 8..i * 8 + 4, "ab")).collect();
    let change = ChangeSet::new(edits, EditTag::Sync(1));
    bencher.bench(|| divan::black_box(remap_stops(&stops, 1, &change, doc_len)));
}

#[divan::bench(args = [1, 8, 32])]
fn remap_nested_stack(bencher: divan::Bencher, depth: usize) {
    let mut stack = SessionStack::new();
    for _ in 0..depth {
        stack.push(1, stops(16));
    }
    let change = ChangeSet::new(vec![TextEdit::insert(0, "prefix ")], EditTag::User);
    bencher
        .with_inputs(|| stack.clone())
        .bench_values(|mut stack| {
            remap_stack(&mut stack, &change, 16 * 8 + 7);
            divan::black_box(stack)
        });
}
