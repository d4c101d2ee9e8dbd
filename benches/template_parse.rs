//! Benchmarks for template parsing
//!
//! Run with: cargo bench --bench template_parse

use std::collections::HashMap;

use token_snippets::template::{instantiate, parse};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

const FUNCTION: &str = "function ${1:name}(${2:args}) {\n\t${3:// body}\n\treturn $1;\n}$0";

fn repeated_body(count: usize) -> String {
    (1..=count)
        .map(|i| format!("let ${{{i}:v{i}}} = ${{{i}}} + ${{{i}|a,b,c|}};\n"))
        .collect()
}

// ============================================================================
// Parsing
// ============================================================================

#[divan::bench]
fn parse_function_snippet() {
    divan::black_box(parse(divan::black_box(FUNCTION)));
}

#[divan::bench(args = [10, 100, 1_000])]
fn parse_many_stops(bencher: divan::Bencher, count: usize) {
    let body = repeated_body(count);
    bencher.bench(|| divan::black_box(parse(divan::black_box(&body))));
}

#[divan::bench(args = [1_000, 10_000])]
fn parse_plain_text(bencher: divan::Bencher, len: usize) {
    let body = "plain text with an escaped \\$ sign ".repeat(len / 35 + 1);
    bencher.bench(|| divan::black_box(parse(divan::black_box(&body))));
}

// ============================================================================
// Instantiation with variables and indentation
// ============================================================================

#[divan::bench]
fn instantiate_with_variables() {
    let vars: HashMap<String, String> =
        HashMap::from([("TM_FILENAME".to_string(), "main.rs".to_string())]);
    let body = "// ${TM_FILENAME:untitled}\nfn ${1:main}() {\n\t$0\n}";
    divan::black_box(instantiate(divan::black_box(body), &vars, "    "));
}
