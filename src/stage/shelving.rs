use crate::dsp::eq::{
    cutoff_omega, HighShelf, LowShelf, PeakBand, BASS_CUTOFF_HZ, MID_ALPHA, MID_CUTOFF_HZ,
    NEUTRAL_GAIN, TREBLE_CUTOFF_HZ,
};
use crate::params::{KnobId, ParamStore};
use crate::stage::node::{FilterStage, StageIo};

/*
Three-Band Graphic Equalizer
============================

Three IIR stages in series, each owning one gain knob:

  input ──→ [Bass shelf] ──→ [Treble shelf] ──→ [Mid peak] ──→ output
              400 Hz            2500 Hz            1000 Hz

Bass:    y[i] = c·x[i] + d·x[i-2] - e·y[i-2]
Treble:  y[i] = h·x[i] + f·x[i-2] - g·y[i-2]
Mid:     y[i] = (k·x[i] + m·x[i-2] + n·x[i-4] - m·y[i-2] - q·y[i-4]) / p

Each stage's x is the previous stage's output, so treble and mid read the
history of the stage before them, not the raw input. The order is part of
the design: swapping stages changes which signal each recursion feeds on.

Knob 5 is flat. Moving a knob only marks it dirty; the new coefficients
are computed once at the start of the next block (see dsp::eq for the
formulas).
*/

pub struct BassShelf {
    w0: f32,
    coeffs: LowShelf,
}

impl BassShelf {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_cutoff(BASS_CUTOFF_HZ, sample_rate)
    }

    pub fn with_cutoff(cutoff_hz: f32, sample_rate: f32) -> Self {
        let w0 = cutoff_omega(cutoff_hz, sample_rate);
        Self {
            w0,
            coeffs: LowShelf::new(w0, NEUTRAL_GAIN),
        }
    }

    pub fn coefficients(&self) -> LowShelf {
        self.coeffs
    }
}

impl FilterStage for BassShelf {
    fn name(&self) -> &'static str {
        "bass-shelf"
    }

    fn input_depth(&self) -> usize {
        2
    }

    fn output_depth(&self) -> usize {
        2
    }

    fn knobs(&self) -> &'static [KnobId] {
        &[KnobId::BassGain]
    }

    fn recompute_coefficients(&mut self, params: &ParamStore) {
        self.coeffs = LowShelf::new(self.w0, params.get(KnobId::BassGain));
    }

    #[inline]
    fn compute_sample(&mut self, io: &StageIo<'_>) -> f32 {
        let LowShelf { c, d, e } = self.coeffs;
        io.x(0) * c + io.x(2) * d - io.y(2) * e
    }
}

pub struct TrebleShelf {
    w0: f32,
    coeffs: HighShelf,
}

impl TrebleShelf {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_cutoff(TREBLE_CUTOFF_HZ, sample_rate)
    }

    pub fn with_cutoff(cutoff_hz: f32, sample_rate: f32) -> Self {
        let w0 = cutoff_omega(cutoff_hz, sample_rate);
        Self {
            w0,
            coeffs: HighShelf::new(w0, NEUTRAL_GAIN),
        }
    }

    pub fn coefficients(&self) -> HighShelf {
        self.coeffs
    }
}

impl FilterStage for TrebleShelf {
    fn name(&self) -> &'static str {
        "treble-shelf"
    }

    fn input_depth(&self) -> usize {
        2
    }

    fn output_depth(&self) -> usize {
        2
    }

    fn knobs(&self) -> &'static [KnobId] {
        &[KnobId::TrebleGain]
    }

    fn recompute_coefficients(&mut self, params: &ParamStore) {
        self.coeffs = HighShelf::new(self.w0, params.get(KnobId::TrebleGain));
    }

    #[inline]
    fn compute_sample(&mut self, io: &StageIo<'_>) -> f32 {
        let HighShelf { f, g, h } = self.coeffs;
        io.x(0) * h + io.x(2) * f - io.y(2) * g
    }
}

pub struct MidPeak {
    w0: f32,
    alpha: f32,
    coeffs: PeakBand,
}

impl MidPeak {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_cutoff(MID_CUTOFF_HZ, sample_rate)
    }

    pub fn with_cutoff(cutoff_hz: f32, sample_rate: f32) -> Self {
        let w0 = cutoff_omega(cutoff_hz, sample_rate);
        Self {
            w0,
            alpha: MID_ALPHA,
            coeffs: PeakBand::new(w0, NEUTRAL_GAIN, MID_ALPHA),
        }
    }

    pub fn coefficients(&self) -> PeakBand {
        self.coeffs
    }
}

impl FilterStage for MidPeak {
    fn name(&self) -> &'static str {
        "mid-peak"
    }

    fn input_depth(&self) -> usize {
        4
    }

    fn output_depth(&self) -> usize {
        4
    }

    fn knobs(&self) -> &'static [KnobId] {
        &[KnobId::MidGain]
    }

    fn recompute_coefficients(&mut self, params: &ParamStore) {
        self.coeffs = PeakBand::new(self.w0, params.get(KnobId::MidGain), self.alpha);
    }

    #[inline]
    fn compute_sample(&mut self, io: &StageIo<'_>) -> f32 {
        let PeakBand { k, m, n, q, p } = self.coeffs;
        (-m * io.y(2) - q * io.y(4) + k * io.x(0) + m * io.x(2) + n * io.x(4)) / p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::{History, HistoryRing};

    const FS: f32 = 44_100.0;

    /// Impulse response of a single stage.
    fn impulse_response(stage: &mut dyn FilterStage, len: usize) -> Vec<f32> {
        let mut x = HistoryRing::with_depth(stage.input_depth(), 1);
        let mut y = HistoryRing::with_depth(stage.output_depth(), 1);
        (0..len)
            .map(|i| {
                x.push(if i == 0 { 1.0 } else { 0.0 });
                let out = stage.compute_sample(&StageIo::new(&x, &y));
                y.push(out);
                out
            })
            .collect()
    }

    fn with_gain(stage: &mut dyn FilterStage, knob: KnobId, gain: i32) {
        let mut params = ParamStore::new();
        params.set(knob, gain).unwrap();
        stage.recompute_coefficients(&params);
    }

    #[test]
    fn test_neutral_stages_pass_impulse_unchanged() {
        let stages: Vec<Box<dyn FilterStage>> = vec![
            Box::new(BassShelf::new(FS)),
            Box::new(TrebleShelf::new(FS)),
            Box::new(MidPeak::new(FS)),
        ];

        for mut stage in stages {
            let ir = impulse_response(stage.as_mut(), 64);
            assert!((ir[0] - 1.0).abs() < 1e-5, "{}: ir[0] = {}", stage.name(), ir[0]);
            let tail = ir[1..].iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
            assert!(tail < 1e-5, "{}: tail peak {}", stage.name(), tail);
        }
    }

    #[test]
    fn test_bass_boost_raises_dc_gain() {
        let mut bass = BassShelf::new(FS);
        with_gain(&mut bass, KnobId::BassGain, 10);

        // Sum of the impulse response is the DC gain: temp^2 = 10
        let dc: f32 = impulse_response(&mut bass, 20_000).iter().sum();
        assert!((dc - 10.0).abs() < 0.05, "dc gain {}", dc);
    }

    #[test]
    fn test_bass_cut_lowers_dc_gain() {
        let mut bass = BassShelf::new(FS);
        with_gain(&mut bass, KnobId::BassGain, 0);

        let dc: f32 = impulse_response(&mut bass, 20_000).iter().sum();
        assert!((dc - 0.1).abs() < 0.005, "dc gain {}", dc);
    }

    #[test]
    fn test_treble_boost_keeps_dc() {
        let mut treble = TrebleShelf::new(FS);
        with_gain(&mut treble, KnobId::TrebleGain, 9);

        let dc: f32 = impulse_response(&mut treble, 20_000).iter().sum();
        assert!((dc - 1.0).abs() < 0.01, "dc gain {}", dc);
    }

    #[test]
    fn test_recompute_reads_only_own_knob() {
        let mut mid = MidPeak::new(FS);
        let before = mid.coefficients();

        with_gain(&mut mid, KnobId::BassGain, 9);
        assert_eq!(mid.coefficients(), before);

        with_gain(&mut mid, KnobId::MidGain, 9);
        assert_ne!(mid.coefficients(), before);
    }

    #[test]
    fn test_mid_boost_is_stable() {
        let mut mid = MidPeak::new(FS);
        with_gain(&mut mid, KnobId::MidGain, 10);

        let ir = impulse_response(&mut mid, 20_000);
        assert!(ir.iter().all(|s| s.is_finite()));
        let tail = ir[19_000..].iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
        assert!(tail < 1e-3, "mid boost did not settle, tail peak {}", tail);
    }
}
