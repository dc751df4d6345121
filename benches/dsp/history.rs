//! Benchmarks for the two history layouts.
//!
//! Both serve the same taps; the ring pays a modulo per tap, the window
//! pays a copy of its depth at every block end.

use std::hint::black_box;

use blockdsp::dsp::{CarryWindow, History, HistoryRing};
use criterion::{BenchmarkId, Criterion};

use crate::{ramp, BLOCK_SIZES};

/// Append a block, then commit and read three taps per sample.
fn stream<H: History>(line: &mut H, block: &[f32], taps: [usize; 3]) -> f32 {
    let mut acc = 0.0;
    line.append(block);
    for _ in 0..block.len() {
        line.advance(1);
        acc += taps.iter().map(|&t| line.tap_at(t)).sum::<f32>();
    }
    line.end_block();
    acc
}

pub fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/history");

    for &size in BLOCK_SIZES {
        let block = ramp(size);

        // Short taps like the equalizer
        let mut ring = HistoryRing::with_depth(6, size);
        group.bench_with_input(BenchmarkId::new("ring_short", size), &size, |b, _| {
            b.iter(|| stream(&mut ring, black_box(&block), [0, 2, 6]))
        });

        let mut window = CarryWindow::with_depth(6, size);
        group.bench_with_input(BenchmarkId::new("window_short", size), &size, |b, _| {
            b.iter(|| stream(&mut window, black_box(&block), [0, 2, 6]))
        });

        // One-second taps like the echo
        let mut ring = HistoryRing::with_depth(44_100, size);
        group.bench_with_input(BenchmarkId::new("ring_long", size), &size, |b, _| {
            b.iter(|| stream(&mut ring, black_box(&block), [0, 22_050, 44_100]))
        });

        let mut window = CarryWindow::with_depth(44_100, size);
        group.bench_with_input(BenchmarkId::new("window_long", size), &size, |b, _| {
            b.iter(|| stream(&mut window, black_box(&block), [0, 22_050, 44_100]))
        });
    }

    group.finish();
}
