//! Frame dispatch benchmark suite.
//!
//! Benchmarks decoding and routing at different page sizes:
//! - Widget counts: 1, 16, 128
//! - Frames: structured JSON and raw fallback lines
//!
//! Run with: cargo bench --bench dispatch
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tws_monitor::{Message, MessageRouter, Page, RenderMode, WidgetBinding};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const WIDGET_COUNTS: &[usize] = &[1, 16, 128];
const MAX_LINES: usize = 500;

// ============================================================================
// Fixtures
// ============================================================================

/// Page where every fourth widget listens on `log`, the rest on other channels.
fn page_with_widgets(count: usize) -> Page {
    let mut page = Page::new();
    for i in 0..count {
        let binding = if i % 4 == 0 {
            WidgetBinding::new("log", "").max_lines(MAX_LINES)
        } else {
            WidgetBinding::new(format!("feed-{i}"), "tick").mode(RenderMode::Replace)
        };
        page.insert_widget(&binding);
    }
    page
}

fn json_frame() -> String {
    Message::new("log", "log_line", "Oct 18 12:00:01 worker[42]: job finished\r\n")
        .to_frame()
        .expect("serialize")
}

// ============================================================================
// Benchmark: Decode
// ============================================================================

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let frame = json_frame();

    group.bench_function("json", |b| b.iter(|| Message::decode(black_box(&frame))));
    group.bench_function("raw", |b| {
        b.iter(|| Message::decode(black_box("Oct 18 12:00:01 worker[42]: job finished")))
    });

    group.finish();
}

// ============================================================================
// Benchmark: Dispatch
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));
    let frame = json_frame();

    for &count in WIDGET_COUNTS {
        group.bench_with_input(BenchmarkId::new("widgets", count), &count, |b, &count| {
            let mut page = page_with_widgets(count);
            b.iter(|| MessageRouter::handle_frame(&mut page, black_box(&frame)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_dispatch);
criterion_main!(benches);
