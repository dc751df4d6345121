//! Benchmarks for a complete exchange cycle over rtrb pipes.
//!
//! Includes everything the audio callback pays for: frame hand-off,
//! conversion, the graphic EQ and publishing.

use std::hint::black_box;

use blockdsp::io::{pipe, BlockReader, BlockWriter, CycleError};
use blockdsp::{BlockProcessor, EngineConfig};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/cycle");

    for &size in BLOCK_SIZES {
        let config = EngineConfig {
            block_size: size,
            ..EngineConfig::default()
        };
        let mut processor = BlockProcessor::from_config(&config).unwrap();
        let (mut capture, mut input) = pipe(2, size);
        let (mut output, mut playback) = pipe(2, size);
        let mut errors: Vec<CycleError> = Vec::new();
        let pcm: Vec<i16> = (0..size).map(|i| (i as i16).wrapping_mul(97)).collect();

        group.bench_with_input(BenchmarkId::new("graphic_eq", size), &size, |b, _| {
            b.iter(|| {
                let frame = capture.acquire_writable().unwrap();
                frame.extend_from(&pcm);
                capture.publish_writable(size);

                let published = processor.run_cycle(&mut input, &mut output, &mut errors);

                playback.acquire_readable();
                playback.release_readable();
                black_box(published)
            })
        });
    }

    group.finish();
}
