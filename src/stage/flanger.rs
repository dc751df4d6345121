use crate::dsp::{History, HistoryRing};
use crate::params::{delay_samples, ratio, KnobId, ParamStore};
use crate::stage::node::{check_delay_knob, ConfigError, FilterStage, StageIo};
use crate::BLOCK_SIZE;

/*
Recirculating Delay (Flanger)
=============================

Unlike the comb echo, which reads its feedback from the stage output, this
stage keeps a private delay line `w` that feeds back into itself before it
is read:

           ┌───────────── λ ◀────────────┐
           ▼                             │
  x ──→ (  +  ) ──→ w[i] ──→ [ z^-k ] ───┴──→ a ──┐
  │                                               ▼
  └───────────────────────────────→ (1-a) ──→ (  +  ) ──→ y

  w[i] = λ·w[i-1-k] + x[i]
  y[i] = (1-a)·x[i] + a·w[i-k]

With k = 0 the wet tap reads the sample just written, so a fully wet
setting with no feedback is a pass-through.

The line is circular and sized for the longest delay the knob can select
plus one block, so the write cursor never laps a tap that is still needed.
*/

pub struct Flanger {
    sample_rate: usize,
    line: HistoryRing,
    mix: f32,
    feedback: f32,
    delay: usize,
}

impl Flanger {
    pub fn new(sample_rate: usize, max_delay: usize) -> Self {
        Self {
            sample_rate,
            line: HistoryRing::with_depth(max_delay, BLOCK_SIZE),
            mix: 0.0,
            feedback: 0.0,
            delay: 0,
        }
    }

    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Longest delay the line can serve.
    fn reach(&self) -> usize {
        self.line.depth()
    }
}

impl FilterStage for Flanger {
    fn name(&self) -> &'static str {
        "flanger"
    }

    fn knobs(&self) -> &'static [KnobId] {
        &[KnobId::Mix, KnobId::Feedback, KnobId::Delay]
    }

    fn validate(&self, params: &ParamStore) -> Result<(), ConfigError> {
        check_delay_knob(self.name(), params, self.sample_rate, self.reach()).map(|_| ())
    }

    fn recompute_coefficients(&mut self, params: &ParamStore) {
        self.mix = ratio(params.get(KnobId::Mix));
        self.feedback = ratio(params.get(KnobId::Feedback));
        self.delay = delay_samples(params.get(KnobId::Delay), self.sample_rate).min(self.reach());
    }

    #[inline]
    fn compute_sample(&mut self, io: &StageIo<'_>) -> f32 {
        let x0 = io.x(0);

        // Before the push, offset k is w[i-1-k]
        let recirculated = self.line.tap_at(self.delay);
        self.line.push(self.feedback * recirculated + x0);
        let wet = self.line.tap_at(self.delay);

        (1.0 - self.mix) * x0 + self.mix * wet
    }

    fn reset(&mut self) {
        self.line.reset();
    }
}
