//! Benchmarks for PCM conversion.

use std::hint::black_box;

use blockdsp::dsp::convert::{denormalize_block, normalize_block};
use criterion::{BenchmarkId, Criterion};

use crate::{ramp, BLOCK_SIZES};

pub fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/convert");

    for &size in BLOCK_SIZES {
        let pcm: Vec<i16> = (0..size).map(|i| (i as i16).wrapping_mul(257)).collect();
        let mut floats = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("normalize", size), &size, |b, _| {
            b.iter(|| normalize_block(black_box(&pcm), black_box(&mut floats)))
        });

        // Half the samples out of range so the saturating branches run
        let hot: Vec<f32> = ramp(size).iter().map(|s| s * 1.5).collect();
        let mut out = vec![0i16; size];
        group.bench_with_input(BenchmarkId::new("denormalize", size), &size, |b, _| {
            b.iter(|| denormalize_block(black_box(&hot), black_box(&mut out)))
        });
    }

    group.finish();
}
