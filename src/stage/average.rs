use crate::params::ParamStore;
use crate::stage::node::{FilterStage, StageIo};

/*
Four-Tap Averager
=================

  y[i] = 0.25 * (x[i] + x[i-2] + x[i-4] + x[i-6])

A moving average over every other sample. Skipping odd taps stretches the
window to seven samples for the price of four additions, and puts the
first response zero at Fe/8 instead of Fe/4:

  H(z) = 0.25 * (1 + z^-2 + z^-4 + z^-6)

  DC           -> 1.0   (constant input passes untouched)
  Fe/8, 3Fe/8  -> 0     (notches)
  Fe/2         -> 1.0   (alternating input passes as well)

There are no coefficients to tune; the stage only needs six samples of
input history, which is why its line carries exactly six across blocks.
*/

const TAPS: [usize; 4] = [0, 2, 4, 6];

#[derive(Debug, Default, Clone, Copy)]
pub struct MovingAverage;

impl MovingAverage {
    pub fn new() -> Self {
        Self
    }
}

impl FilterStage for MovingAverage {
    fn name(&self) -> &'static str {
        "moving-average"
    }

    fn input_depth(&self) -> usize {
        6
    }

    fn recompute_coefficients(&mut self, _params: &ParamStore) {}

    #[inline]
    fn compute_sample(&mut self, io: &StageIo<'_>) -> f32 {
        0.25 * TAPS.iter().map(|&offset| io.x(offset)).sum::<f32>()
    }
}
