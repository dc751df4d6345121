use crate::params::{delay_samples, ratio, KnobId, ParamStore};
use crate::stage::node::{check_delay_knob, ConfigError, FilterStage, StageIo};

/*
Comb Echo
=========

A single repeat that keeps coming back, each time scaled by the feedback:

  y[i] = (1-a)·x[i] + (λ(1-a) + a)·x[i-D] - λ·y[i-D]

  a (Mix, knob/10)       wet proportion
  λ (Feedback, knob/10)  how much of each echo feeds the next one
  D (Delay)              2·Fe·knob/10 samples, so knob 5 is one second

The feedback term reads the stage's own output line, which the chain
carries across blocks just like the input, so an echo started in one block
keeps ringing in the following ones.

Impulse response, with D = 4:

  i     0      4        8          12
        │      │        │          │
  y   (1-a)  (λ(1-a)+a) -λ·(..)    λ²·(..)  ...   geometric, ratio -λ
        - λ(1-a)

With |λ| < 1 the repeats die out; the knob travel of -9..=9 keeps it there.
A delay of zero is a plain pass-through.

Both lines are sized from `max_delay`; building the chain fails if the
Delay knob can travel past it.
*/

pub struct CombEcho {
    sample_rate: usize,
    max_delay: usize,
    mix: f32,
    feedback: f32,
    delay: usize,
}

impl CombEcho {
    /// Echo able to reach `max_delay` samples back.
    pub fn new(sample_rate: usize, max_delay: usize) -> Self {
        Self {
            sample_rate,
            max_delay,
            mix: 0.0,
            feedback: 0.0,
            delay: 0,
        }
    }

    /// Current delay in samples.
    pub fn delay(&self) -> usize {
        self.delay
    }
}

impl FilterStage for CombEcho {
    fn name(&self) -> &'static str {
        "comb-echo"
    }

    fn input_depth(&self) -> usize {
        self.max_delay
    }

    fn output_depth(&self) -> usize {
        self.max_delay
    }

    fn knobs(&self) -> &'static [KnobId] {
        &[KnobId::Mix, KnobId::Feedback, KnobId::Delay]
    }

    fn validate(&self, params: &ParamStore) -> Result<(), ConfigError> {
        check_delay_knob(self.name(), params, self.sample_rate, self.max_delay).map(|_| ())
    }

    fn recompute_coefficients(&mut self, params: &ParamStore) {
        self.mix = ratio(params.get(KnobId::Mix));
        self.feedback = ratio(params.get(KnobId::Feedback));
        self.delay =
            delay_samples(params.get(KnobId::Delay), self.sample_rate).min(self.max_delay);
    }

    #[inline]
    fn compute_sample(&mut self, io: &StageIo<'_>) -> f32 {
        let x0 = io.x(0);
        if self.delay == 0 {
            return x0;
        }

        let a = self.mix;
        let lambda = self.feedback;
        let d = self.delay;
        (1.0 - a) * x0 + (lambda * (1.0 - a) + a) * io.x(d) - lambda * io.y(d)
    }
}
