//! Sample conversion between 16-bit PCM and normalized floats.
//!
//! The codec side speaks signed 16-bit PCM, the filters work on floats in
//! roughly [-1.0, 1.0]. Going back to integers always saturates: a filter
//! with gain can overshoot full scale, and letting the multiplication wrap
//! would turn a small overshoot into a full-scale click of opposite sign.

/// Divisor mapping `i16::MIN` to exactly -1.0.
pub const FULL_SCALE: f32 = 32_768.0;

#[inline]
pub fn to_normalized(sample: i16) -> f32 {
    sample as f32 / FULL_SCALE
}

/// Convert back to PCM, clamping above 1.0 to `i16::MAX` and below -1.0 to
/// `i16::MIN`. In-range values are truncated toward zero, not rounded.
#[inline]
pub fn to_integer(sample: f32) -> i16 {
    if sample > 1.0 {
        i16::MAX
    } else if sample < -1.0 {
        i16::MIN
    } else {
        // 1.0 * 32768 is one past i16::MAX; `as` saturates it
        (sample * FULL_SCALE) as i16
    }
}

/// Normalize `src` into `dst`, stopping at the shorter of the two.
pub fn normalize_block(src: &[i16], dst: &mut [f32]) {
    for (out, &sample) in dst.iter_mut().zip(src) {
        *out = to_normalized(sample);
    }
}

/// Saturate `src` into `dst`, stopping at the shorter of the two.
pub fn denormalize_block(src: &[f32], dst: &mut [i16]) {
    for (out, &sample) in dst.iter_mut().zip(src) {
        *out = to_integer(sample);
    }
}
