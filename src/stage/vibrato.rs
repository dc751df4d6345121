use crate::dsp::{History, HistoryRing};
use crate::params::{KnobId, ParamStore};
use crate::stage::node::{ConfigError, FilterStage, StageIo};
use crate::BLOCK_SIZE;

/*
Vibrato Scaffold
================

Two delay lines fed with the same input:

  x ──┬──→ [ fixed line,    tap at 10 ] ──→ fixed    ┐
      ├──→ [ variable line, tap at k  ] ──→ variable ├──→ combine ──→ y
      └──────────────────────────────────→ dry      ┘

        k = modulator.next_delay(), 0 ≤ k ≤ 40

The tap mechanics are complete. What moves `k` (the modulation waveform)
and how the three signals are blended are left to the caller:

  - `DelayModulator` produces one delay per sample from the Period and
    Depth knobs.
  - `TapCombiner` blends dry, fixed and variable into the output sample.

Both lines hold twice their longest tap so a sweep can read behind the
write cursor without catching up with it.
*/

/// Tap of the fixed line, in samples.
pub const FIXED_DELAY: usize = 10;
/// Longest tap the variable line can serve.
pub const VARIABLE_DELAY_MAX: usize = 40;

/// Generates the variable tap position, one call per sample.
pub trait DelayModulator: Send {
    /// Largest delay `next_delay` can return.
    fn max_delay(&self) -> usize;

    /// New knob positions. Called whenever Period or Depth moves.
    fn configure(&mut self, period: i32, depth: i32);

    fn next_delay(&mut self) -> usize;

    fn reset(&mut self) {}
}

/// Blends the dry sample with both taps.
pub trait TapCombiner: Send {
    fn combine(&self, dry: f32, fixed: f32, variable: f32) -> f32;
}

pub struct VibratoStage<M: DelayModulator, C: TapCombiner> {
    fixed: HistoryRing,
    variable: HistoryRing,
    modulator: M,
    combiner: C,
}

impl<M: DelayModulator, C: TapCombiner> VibratoStage<M, C> {
    pub fn new(modulator: M, combiner: C) -> Self {
        Self {
            fixed: HistoryRing::with_depth(2 * FIXED_DELAY, BLOCK_SIZE),
            variable: HistoryRing::with_depth(2 * VARIABLE_DELAY_MAX, BLOCK_SIZE),
            modulator,
            combiner,
        }
    }

    pub fn modulator(&self) -> &M {
        &self.modulator
    }
}

impl<M: DelayModulator, C: TapCombiner> FilterStage for VibratoStage<M, C> {
    fn name(&self) -> &'static str {
        "vibrato"
    }

    fn knobs(&self) -> &'static [KnobId] {
        &[KnobId::ModulationPeriod, KnobId::ModulationDepth]
    }

    fn validate(&self, _params: &ParamStore) -> Result<(), ConfigError> {
        let delay = self.modulator.max_delay();
        if delay > self.variable.depth() {
            return Err(ConfigError::DelayExceedsHistory {
                stage: self.name(),
                knob: KnobId::ModulationDepth,
                delay,
                capacity: self.variable.depth(),
            });
        }
        Ok(())
    }

    fn recompute_coefficients(&mut self, params: &ParamStore) {
        self.modulator.configure(
            params.get(KnobId::ModulationPeriod),
            params.get(KnobId::ModulationDepth),
        );
    }

    #[inline]
    fn compute_sample(&mut self, io: &StageIo<'_>) -> f32 {
        let dry = io.x(0);
        self.fixed.push(dry);
        self.variable.push(dry);

        let k = self.modulator.next_delay().min(self.variable.depth());
        let fixed = self.fixed.tap_at(FIXED_DELAY);
        let variable = self.variable.tap_at(k);

        self.combiner.combine(dry, fixed, variable)
    }

    fn reset(&mut self) {
        self.fixed.reset();
        self.variable.reset();
        self.modulator.reset();
    }
}
