//! Coefficient math for the three-band graphic equalizer.
//!
//! Each band is designed as a bilinear-style shelf or peak around a cutoff
//! `w0 = 2π·f/Fe`, with the knob setting mapped to a linear factor
//! `temp = sqrt(10^((gain - 5) / 5))`. Knob 5 is neutral (`temp = 1`) and
//! every band then reduces to the identity.
//!
//! The recursions use taps at `i - 2` and `i - 4` rather than `i - 1` and
//! `i - 2`, so each response is mirrored around a quarter of the sample rate.
//!
//! These are pure functions of the knob values; computing them involves
//! `powf` and `sqrt`, so stages cache the result and only call back in here
//! when a knob changes.

use std::f32::consts::TAU;

/// Knob value with no boost or cut.
pub const NEUTRAL_GAIN: i32 = 5;
/// Bandwidth factor of the mid peak.
pub const MID_ALPHA: f32 = 0.1;

pub const BASS_CUTOFF_HZ: f32 = 400.0;
pub const TREBLE_CUTOFF_HZ: f32 = 2_500.0;
pub const MID_CUTOFF_HZ: f32 = 1_000.0;

/// `sqrt(10^((gain - 5) / 5))`
#[inline]
pub fn gain_factor(gain: i32) -> f32 {
    10.0f32.powf((gain - NEUTRAL_GAIN) as f32 / 5.0).sqrt()
}

#[inline]
pub fn cutoff_omega(cutoff_hz: f32, sample_rate: f32) -> f32 {
    TAU * cutoff_hz / sample_rate
}

/// `y = c·x[i] + d·x[i-2] - e·y[i-2]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowShelf {
    pub c: f32,
    pub d: f32,
    pub e: f32,
}

impl LowShelf {
    pub fn new(w0: f32, gain: i32) -> Self {
        let t = gain_factor(gain);
        let norm = 2.0 + w0 / t;
        Self {
            c: (2.0 + w0 * t) / norm,
            d: (-2.0 + w0 * t) / norm,
            e: (-2.0 + w0 / t) / norm,
        }
    }
}

/// `y = h·x[i] + f·x[i-2] - g·y[i-2]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighShelf {
    pub f: f32,
    pub g: f32,
    pub h: f32,
}

impl HighShelf {
    pub fn new(w0: f32, gain: i32) -> Self {
        let t = gain_factor(gain);
        let norm = w0 + 2.0 / t;
        Self {
            f: (-2.0 * t + w0) / norm,
            g: (w0 - 2.0 / t) / norm,
            h: (w0 + 2.0 * t) / norm,
        }
    }
}

/// `y = (k·x[i] + m·x[i-2] + n·x[i-4] - m·y[i-2] - q·y[i-4]) / p`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakBand {
    pub k: f32,
    pub m: f32,
    pub n: f32,
    pub q: f32,
    pub p: f32,
}

impl PeakBand {
    pub fn new(w0: f32, gain: i32, alpha: f32) -> Self {
        let t = gain_factor(gain);
        let q2 = alpha * t / (1.0 - alpha * alpha);
        let q1 = q2 / (t * t);
        let w2 = w0 * w0;

        Self {
            k: 4.0 + w2 + 2.0 * w0 / q1,
            m: 2.0 * w2 - 8.0,
            n: 4.0 + w2 - 2.0 * w0 / q1,
            q: 4.0 + w2 - 2.0 * w0 / q2,
            p: 4.0 + w2 + 2.0 * w0 / q2,
        }
    }
}
