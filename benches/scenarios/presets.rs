//! Benchmarks for the preset chains, PCM in and PCM out.

use std::hint::black_box;

use blockdsp::params::KnobId;
use blockdsp::{BlockProcessor, EngineConfig, Preset};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

/// A config per preset with its knobs away from neutral.
fn configs(block_size: usize) -> Vec<(&'static str, EngineConfig)> {
    let base = |preset| EngineConfig {
        block_size,
        ..EngineConfig::with_preset(preset)
    };
    vec![
        ("average", base(Preset::MovingAverage)),
        (
            "graphic_eq",
            base(Preset::GraphicEq)
                .knob(KnobId::BassGain, 8)
                .knob(KnobId::TrebleGain, 3)
                .knob(KnobId::MidGain, 7),
        ),
        (
            "echo",
            base(Preset::Echo)
                .knob(KnobId::Mix, 5)
                .knob(KnobId::Feedback, 6)
                .knob(KnobId::Delay, 2),
        ),
        (
            "flanger",
            base(Preset::Flanger)
                .knob(KnobId::Mix, 5)
                .knob(KnobId::Feedback, -5)
                .knob(KnobId::Delay, 1),
        ),
    ]
}

pub fn bench_presets(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/presets");

    for &size in BLOCK_SIZES {
        // 440 Hz at half scale
        let input: Vec<i16> = (0..size)
            .map(|i| {
                let phase = std::f32::consts::TAU * 440.0 * i as f32 / 44_100.0;
                (phase.sin() * 16_384.0) as i16
            })
            .collect();
        let mut output = vec![0i16; size];

        for (name, config) in configs(size) {
            let mut processor = BlockProcessor::from_config(&config).unwrap();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| processor.process_block(black_box(&input), black_box(&mut output)))
            });
        }

        // Knob moving every block: recompute cost included
        let mut processor = BlockProcessor::from_config(&configs(size)[1].1).unwrap();
        let mut gain = 0;
        group.bench_with_input(BenchmarkId::new("graphic_eq_sweep", size), &size, |b, _| {
            b.iter(|| {
                gain = (gain + 1) % 11;
                processor.set_knob(KnobId::MidGain, gain).unwrap();
                processor.process_block(black_box(&input), black_box(&mut output))
            })
        });
    }

    group.finish();
}
