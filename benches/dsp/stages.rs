//! Benchmarks for single filter stages in a one-stage chain.

use std::hint::black_box;

use blockdsp::params::{KnobId, ParamStore};
use blockdsp::stage::{BassShelf, CombEcho, FilterStage, Flanger, MidPeak, MovingAverage};
use blockdsp::FilterChain;
use criterion::{BenchmarkId, Criterion};

use crate::{ramp, BLOCK_SIZES};

fn chain(stage: Box<dyn FilterStage>, params: &mut ParamStore, size: usize) -> FilterChain {
    let mut chain = FilterChain::new(vec![stage], params, size).unwrap();
    chain.update(params);
    chain
}

pub fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/stages");

    let mut params = ParamStore::new();
    params.set(KnobId::BassGain, 8).unwrap();
    params.set(KnobId::MidGain, 3).unwrap();
    params.set(KnobId::Mix, 5).unwrap();
    params.set(KnobId::Feedback, 6).unwrap();
    params.set(KnobId::Delay, 2).unwrap();

    for &size in BLOCK_SIZES {
        let input = ramp(size);
        let mut output = vec![0.0f32; size];

        let cases: Vec<(&str, Box<dyn FilterStage>)> = vec![
            ("moving_average", Box::new(MovingAverage::new())),
            ("bass_shelf", Box::new(BassShelf::new(44_100.0))),
            ("mid_peak", Box::new(MidPeak::new(44_100.0))),
            ("comb_echo", Box::new(CombEcho::new(44_100, 44_100))),
            ("flanger", Box::new(Flanger::new(44_100, 44_100))),
        ];

        for (name, stage) in cases {
            let mut chain = chain(stage, &mut params.clone(), size);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| chain.process_block(black_box(&input), black_box(&mut output)))
            });
        }
    }

    group.finish();
}
