//! Frequency-response measurement for a configured processor.
//!
//! Feeds a unit impulse through the float path of a processor and takes the
//! FFT of what comes out. Handy for checking what a knob setting actually
//! does to the spectrum, and for tests that pin down shelf gains.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::dsp::History;
use crate::processor::BlockProcessor;

/// Impulse response of `processor` over `len` samples.
///
/// History is cleared first so earlier audio does not leak in. Knob changes
/// pending in the processor are applied before the impulse.
pub fn impulse_response<H: History>(processor: &mut BlockProcessor<H>, len: usize) -> Vec<f32> {
    processor.reset();

    let mut impulse = vec![0.0; len];
    if let Some(first) = impulse.first_mut() {
        *first = 1.0;
    }
    let mut response = vec![0.0; len];
    processor.process_normalized(&impulse, &mut response);
    response
}

/// Magnitude of each FFT bin from DC to Nyquist (`len / 2 + 1` values).
pub fn magnitude_spectrum(signal: &[f32]) -> Vec<f32> {
    if signal.is_empty() {
        return Vec::new();
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(signal.len());

    let mut bins: Vec<Complex<f32>> = signal.iter().map(|&s| Complex::new(s, 0.0)).collect();
    fft.process(&mut bins);

    bins[..signal.len() / 2 + 1]
        .iter()
        .map(|bin| bin.norm())
        .collect()
}

/// Linear gain per frequency, measured from an impulse response.
#[derive(Debug, Clone)]
pub struct FrequencyResponse {
    magnitudes: Vec<f32>,
    /// Hz per bin
    resolution: f32,
}

impl FrequencyResponse {
    pub fn from_impulse(response: &[f32], sample_rate: f32) -> Self {
        let resolution = if response.is_empty() {
            0.0
        } else {
            sample_rate / response.len() as f32
        };
        Self {
            magnitudes: magnitude_spectrum(response),
            resolution,
        }
    }

    /// Measure `processor` with an impulse of `len` samples.
    pub fn measure<H: History>(
        processor: &mut BlockProcessor<H>,
        len: usize,
        sample_rate: f32,
    ) -> Self {
        Self::from_impulse(&impulse_response(processor, len), sample_rate)
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// Gain at the bin nearest `freq_hz`, clamped to Nyquist.
    pub fn magnitude_at(&self, freq_hz: f32) -> f32 {
        if self.magnitudes.is_empty() {
            return 0.0;
        }
        let bin = (freq_hz / self.resolution).round().max(0.0) as usize;
        self.magnitudes[bin.min(self.magnitudes.len() - 1)]
    }

    /// Gain at `freq_hz` in decibels.
    pub fn magnitude_db_at(&self, freq_hz: f32) -> f32 {
        20.0 * self.magnitude_at(freq_hz).max(1e-9).log10()
    }
}
