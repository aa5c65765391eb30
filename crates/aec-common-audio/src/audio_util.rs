//! Sample-format conversions for 16-bit PCM frames.
//!
//! The pipeline stores audio internally as **FloatS16**: `f32` values in
//! \[-32768.0, 32768.0\], i.e. S16 widened to float without rescaling. That
//! keeps S16 round-trips exact while allowing per-band filtering headroom.

/// Highest sample rate the pipeline accepts (Hz).
pub const MAX_SAMPLE_RATE_HZ: usize = 48_000;

/// Maximum samples per channel in a 10 ms frame at [`MAX_SAMPLE_RATE_HZ`].
pub const MAX_SAMPLES_PER_CHANNEL_10MS: usize = MAX_SAMPLE_RATE_HZ / 100;

/// Convert a single FloatS16 sample back to S16, rounding to nearest.
#[inline]
pub fn float_s16_to_s16(v: f32) -> i16 {
    let v = v.clamp(-32768.0, 32767.0);
    (v + f32::copysign(0.5, v)) as i16
}

/// Widen a slice of S16 samples to FloatS16.
///
/// # Panics
///
/// Panics if `src` and `dest` have different lengths.
pub fn s16_to_float_s16_slice(src: &[i16], dest: &mut [f32]) {
    assert_eq!(src.len(), dest.len(), "slice length mismatch");
    for (d, &s) in dest.iter_mut().zip(src) {
        *d = f32::from(s);
    }
}

/// Convert a slice of FloatS16 samples to S16 with rounding.
///
/// # Panics
///
/// Panics if `src` and `dest` have different lengths.
pub fn float_s16_to_s16_slice(src: &[f32], dest: &mut [i16]) {
    assert_eq!(src.len(), dest.len(), "slice length mismatch");
    for (d, &s) in dest.iter_mut().zip(src) {
        *d = float_s16_to_s16(s);
    }
}

/// Extract one channel from an interleaved S16 frame into FloatS16.
///
/// `interleaved` holds `num_frames * num_channels` samples.
pub fn deinterleave_channel(
    interleaved: &[i16],
    channel: usize,
    num_channels: usize,
    dest: &mut [f32],
) {
    debug_assert!(channel < num_channels);
    debug_assert_eq!(interleaved.len(), dest.len() * num_channels);
    for (frame, d) in dest.iter_mut().enumerate() {
        *d = f32::from(interleaved[frame * num_channels + channel]);
    }
}

/// Write one FloatS16 channel into an interleaved S16 frame.
pub fn interleave_channel(
    src: &[f32],
    channel: usize,
    num_channels: usize,
    interleaved: &mut [i16],
) {
    debug_assert!(channel < num_channels);
    debug_assert_eq!(interleaved.len(), src.len() * num_channels);
    for (frame, &s) in src.iter().enumerate() {
        interleaved[frame * num_channels + channel] = float_s16_to_s16(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_s16_to_s16_rounds_to_nearest() {
        assert_eq!(float_s16_to_s16(0.4), 0);
        assert_eq!(float_s16_to_s16(0.6), 1);
        assert_eq!(float_s16_to_s16(-0.6), -1);
        assert_eq!(float_s16_to_s16(-0.4), 0);
    }

    #[test]
    fn float_s16_to_s16_saturates() {
        assert_eq!(float_s16_to_s16(40000.0), 32767);
        assert_eq!(float_s16_to_s16(-40000.0), -32768);
    }

    #[test]
    fn s16_round_trip_is_exact() {
        let src: Vec<i16> = vec![i16::MIN, -12345, -1, 0, 1, 12345, i16::MAX];
        let mut wide = vec![0.0f32; src.len()];
        let mut back = vec![0i16; src.len()];
        s16_to_float_s16_slice(&src, &mut wide);
        float_s16_to_s16_slice(&wide, &mut back);
        assert_eq!(src, back);
    }

    #[test]
    fn deinterleave_then_interleave_round_trips() {
        let interleaved: Vec<i16> = vec![10, -20, 11, -21, 12, -22];
        let mut ch0 = vec![0.0f32; 3];
        let mut ch1 = vec![0.0f32; 3];
        deinterleave_channel(&interleaved, 0, 2, &mut ch0);
        deinterleave_channel(&interleaved, 1, 2, &mut ch1);
        assert_eq!(ch0, [10.0, 11.0, 12.0]);
        assert_eq!(ch1, [-20.0, -21.0, -22.0]);

        let mut out = vec![0i16; 6];
        interleave_channel(&ch0, 0, 2, &mut out);
        interleave_channel(&ch1, 1, 2, &mut out);
        assert_eq!(out, interleaved);
    }
}
