//! High-pass filter applied to split band 0 of the capture stream.

use aec_common_audio::cascaded_biquad_filter::{BiQuadCoefficients, CascadedBiQuadFilter};

use crate::audio_buffer::AudioBuffer;

/// Cutoff near 50 Hz at 16 kHz. Band 0 never runs above 16 kHz, so this is
/// the only table; at 8 kHz the cutoff scales down to 25-ish Hz, which still
/// removes DC.
const COEFFICIENTS_16KHZ: [BiQuadCoefficients; 3] = [
    BiQuadCoefficients {
        b: [0.877_353_9_f32, -1.754_683_9_f32, 0.877_353_9_f32],
        a: [-1.881_687_3_f32, 0.888_058_5_f32],
    },
    BiQuadCoefficients {
        b: [1.0, -1.999_810_1_f32, 1.0],
        a: [-1.976_035_4_f32, 0.977_970_9_f32],
    },
    BiQuadCoefficients {
        b: [1.0, -1.999_669_2_f32, 1.0],
        a: [-1.994_265_8_f32, 0.995_486_2_f32],
    },
];

/// Per-channel cascaded biquad high-pass filter.
pub(crate) struct HighPassFilter {
    filters: Vec<CascadedBiQuadFilter>,
}

impl HighPassFilter {
    pub(crate) fn new(num_channels: usize) -> Self {
        Self {
            filters: (0..num_channels)
                .map(|_| CascadedBiQuadFilter::new(&COEFFICIENTS_16KHZ))
                .collect(),
        }
    }

    /// Filters split band 0 of every channel in place.
    pub(crate) fn process(&mut self, audio: &mut AudioBuffer) {
        debug_assert_eq!(self.filters.len(), audio.num_channels());
        for (filter, band) in self.filters.iter_mut().zip(audio.split_bands_mut()) {
            filter.process_in_place(band);
        }
    }

    pub(crate) fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }
}
