//! Benchmarks for expression parsing.
//!
//! The parser runs on every advisory turn; the fallback tiers should stay
//! cheap even on messy generated output.

// Criterion macros generate items without docs - this is expected for benchmarks
#![allow(missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};
use deckwise::services::parse_expressions;
use std::hint::black_box;

const JSON_RESPONSE: &str = r#"Here are the queries you asked for:
["c:r t:creature mv<=3", "c:r kw:haste", "f:modern c:r is:permanent", "id:wr is:commander", "c:g o:\"draw a card\" mv<=3"]
Let me know if you want more."#;

const ENUMERATED_RESPONSE: &str = r#"1. c:r t:creature pow>=3
2. id:wr is:commander
3. "c:u t:merfolk mv<=2"
4. - f:modern c:r is:permanent
# these cover the main angles
5. c:g o:ramp t:creature"#;

const NOISY_RESPONSE: &str = r#"Sure! Based on the strategy I'd look at aggressive creatures.
Some thoughts follow, not all of which are queries.
ok
c:r t:creature pow>=3 kw:haste
maybe something bigger too?
mv>5 t:creature c:r
"#;

fn bench_parse_json(c: &mut Criterion) {
    c.bench_function("parse_json_array", |b| {
        b.iter(|| parse_expressions(black_box(JSON_RESPONSE)));
    });
}

fn bench_parse_enumerated(c: &mut Criterion) {
    c.bench_function("parse_enumerated_lines", |b| {
        b.iter(|| parse_expressions(black_box(ENUMERATED_RESPONSE)));
    });
}

fn bench_parse_noisy(c: &mut Criterion) {
    c.bench_function("parse_noisy_prose", |b| {
        b.iter(|| parse_expressions(black_box(NOISY_RESPONSE)));
    });
}

criterion_group!(
    benches,
    bench_parse_json,
    bench_parse_enumerated,
    bench_parse_noisy
);
criterion_main!(benches);
