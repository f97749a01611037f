//! Criterion benchmarks for the scan-code translator.
//!
//! Translation runs once per inbound button frame, so it should stay well
//! below the cost of decoding the JSON frame that carries it.
//!
//! Run with:
//! ```bash
//! cargo bench --package padlink-core --bench translate_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use padlink_core::keymap::key_name;
use padlink_core::{decode_inbound, translate, translate_event};

/// Codes spread across the table, plus two misses.
const BENCH_CODES: &[u32] = &[
    0x04, // a
    0x1D, // z
    0x28, // enter
    0x2C, // space
    0x3A, // f1
    0x45, // f12
    0x4F, // right
    0x52, // up
    0x62, // num0
    0x81, // audioVolDown
    0xE7, // metaRight
    0x32, // not mapped
    0xFF, // not mapped
];

// ── Benchmarks: table lookup ──────────────────────────────────────────────────

fn bench_key_name(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_code_table");

    group.bench_with_input(BenchmarkId::new("key_name", "first"), &0x04u32, |b, &code| {
        b.iter(|| key_name(black_box(code)))
    });

    group.bench_with_input(BenchmarkId::new("key_name", "last"), &0xE7u32, |b, &code| {
        b.iter(|| key_name(black_box(code)))
    });

    group.bench_with_input(BenchmarkId::new("key_name", "miss"), &0x32u32, |b, &code| {
        b.iter(|| key_name(black_box(code)))
    });

    group.finish();
}

// ── Benchmarks: full translation ──────────────────────────────────────────────

fn bench_translate(c: &mut Criterion) {
    let mut group = c.benchmark_group("translate");

    group.bench_function("plain_key", |b| {
        b.iter(|| translate(black_box(0x04), black_box(0)))
    });

    group.bench_function("all_modifiers", |b| {
        b.iter(|| translate(black_box(0x04), black_box(0x0F)))
    });

    group.bench_function("batch_13", |b| {
        b.iter(|| {
            BENCH_CODES
                .iter()
                .map(|&code| translate(black_box(code), black_box(0x03)))
                .collect::<Vec<_>>()
        })
    });

    group.finish();
}

// ── Benchmarks: decode + translate (per-frame hot path) ──────────────────────

fn bench_decode_and_translate(c: &mut Criterion) {
    let frame = r#"{"type":"button_press","key":4,"modifier":3}"#;

    c.bench_function("decode_and_translate", |b| {
        b.iter(|| {
            if let Ok(padlink_core::InboundMessage::ButtonPress(ev)) =
                decode_inbound(black_box(frame))
            {
                let _ = translate_event(&ev);
            }
        })
    });
}

criterion_group!(
    benches,
    bench_key_name,
    bench_translate,
    bench_decode_and_translate,
);
criterion_main!(benches);
