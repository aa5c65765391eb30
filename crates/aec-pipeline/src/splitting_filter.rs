//! Band splitting and merging for 32 kHz (2 bands) and 48 kHz (3 bands).
//!
//! Two-band operation uses an allpass-based QMF pair; three-band operation
//! delegates to the DCT-modulated filter bank. Both keep per-channel filter
//! state so consecutive 10 ms frames form a continuous signal.

use aec_common_audio::channel_buffer::ChannelBuffer;

use crate::three_band_filter_bank::{FULL_BAND_SIZE, SPLIT_BAND_SIZE, ThreeBandFilterBank};

const SAMPLES_PER_BAND: usize = 160;
const TWO_BAND_FRAME: usize = 2 * SAMPLES_PER_BAND;

const ALL_PASS_FILTER_1: [f32; 3] = [0.097_930_908_2, 0.564_300_537_1, 0.873_733_520_5];
const ALL_PASS_FILTER_2: [f32; 3] = [0.325_515_747_07, 0.748_626_708_98, 0.961_456_298_82];

/// One first-order allpass section: `y[n] = x[n-1] + a * (x[n] - y[n-1])`.
#[derive(Clone, Copy, Default)]
struct AllPassSection {
    coefficient: f32,
    last_input: f32,
    last_output: f32,
}

impl AllPassSection {
    fn process_in_place(&mut self, data: &mut [f32]) {
        for v in data.iter_mut() {
            let x = *v;
            let y = self.last_input + self.coefficient * (x - self.last_output);
            self.last_input = x;
            self.last_output = y;
            *v = y;
        }
    }
}

/// Three cascaded allpass sections forming one QMF branch.
#[derive(Clone, Copy)]
struct AllPassChain {
    sections: [AllPassSection; 3],
}

impl AllPassChain {
    fn new(coefficients: &[f32; 3]) -> Self {
        Self {
            sections: coefficients.map(|coefficient| AllPassSection {
                coefficient,
                ..Default::default()
            }),
        }
    }

    fn process_in_place(&mut self, data: &mut [f32]) {
        for section in &mut self.sections {
            section.process_in_place(data);
        }
    }
}

/// Per-channel QMF state: one chain pair for analysis, one for synthesis.
struct TwoBandState {
    split_odd: AllPassChain,
    split_even: AllPassChain,
    merge_sum: AllPassChain,
    merge_diff: AllPassChain,
}

impl TwoBandState {
    fn new() -> Self {
        Self {
            split_odd: AllPassChain::new(&ALL_PASS_FILTER_1),
            split_even: AllPassChain::new(&ALL_PASS_FILTER_2),
            merge_sum: AllPassChain::new(&ALL_PASS_FILTER_2),
            merge_diff: AllPassChain::new(&ALL_PASS_FILTER_1),
        }
    }

    /// QMF analysis of one 320-sample frame into two 160-sample bands.
    fn split(&mut self, input: &[f32], low: &mut [f32], high: &mut [f32]) {
        debug_assert_eq!(input.len(), TWO_BAND_FRAME);

        let mut odd = [0.0f32; SAMPLES_PER_BAND];
        let mut even = [0.0f32; SAMPLES_PER_BAND];
        for (i, pair) in input.chunks_exact(2).enumerate() {
            even[i] = pair[0];
            odd[i] = pair[1];
        }

        self.split_odd.process_in_place(&mut odd);
        self.split_even.process_in_place(&mut even);

        for i in 0..SAMPLES_PER_BAND {
            low[i] = (odd[i] + even[i]) * 0.5;
            high[i] = (odd[i] - even[i]) * 0.5;
        }
    }

    /// QMF synthesis of two 160-sample bands into one 320-sample frame.
    fn merge(&mut self, low: &[f32], high: &[f32], output: &mut [f32]) {
        debug_assert_eq!(output.len(), TWO_BAND_FRAME);

        let mut sum = [0.0f32; SAMPLES_PER_BAND];
        let mut diff = [0.0f32; SAMPLES_PER_BAND];
        for i in 0..SAMPLES_PER_BAND {
            sum[i] = low[i] + high[i];
            diff[i] = low[i] - high[i];
        }

        self.merge_sum.process_in_place(&mut sum);
        self.merge_diff.process_in_place(&mut diff);

        // Interleave with S16-range saturation.
        for (i, pair) in output.chunks_exact_mut(2).enumerate() {
            pair[0] = diff[i].clamp(-32_768.0, 32_767.0);
            pair[1] = sum[i].clamp(-32_768.0, 32_767.0);
        }
    }
}

enum BandFilters {
    Two(Vec<TwoBandState>),
    Three(Vec<ThreeBandFilterBank>),
}

/// Splits full-band channels into sub-bands and merges them back.
pub(crate) struct SplittingFilter {
    filters: BandFilters,
}

impl SplittingFilter {
    /// `num_bands` must be 2 or 3; single-band streams bypass splitting
    /// entirely and never construct one of these.
    pub(crate) fn new(num_channels: usize, num_bands: usize) -> Self {
        let filters = match num_bands {
            2 => BandFilters::Two((0..num_channels).map(|_| TwoBandState::new()).collect()),
            3 => BandFilters::Three(
                (0..num_channels)
                    .map(|_| ThreeBandFilterBank::new())
                    .collect(),
            ),
            _ => panic!("band splitting requires 2 or 3 bands, got {num_bands}"),
        };
        Self { filters }
    }

    /// Splits each channel of `data` into the bands of `bands`.
    pub(crate) fn split(&mut self, data: &ChannelBuffer<f32>, bands: &mut ChannelBuffer<f32>) {
        debug_assert_eq!(data.num_channels(), bands.num_channels());
        debug_assert_eq!(data.num_frames(), bands.num_frames());

        match &mut self.filters {
            BandFilters::Two(states) => {
                for (ch, state) in states.iter_mut().enumerate() {
                    let mut low = [0.0f32; SAMPLES_PER_BAND];
                    let mut high = [0.0f32; SAMPLES_PER_BAND];
                    state.split(data.bands(ch), &mut low, &mut high);
                    bands.channel_mut(0, ch).copy_from_slice(&low);
                    bands.channel_mut(1, ch).copy_from_slice(&high);
                }
            }
            BandFilters::Three(banks) => {
                for (ch, bank) in banks.iter_mut().enumerate() {
                    let input: &[f32; FULL_BAND_SIZE] = data
                        .bands(ch)
                        .try_into()
                        .expect("3-band frames are 480 samples");
                    let mut output = [[0.0f32; SPLIT_BAND_SIZE]; 3];
                    bank.split(input, &mut output);
                    for (band, samples) in output.iter().enumerate() {
                        bands.channel_mut(band, ch).copy_from_slice(samples);
                    }
                }
            }
        }
    }

    /// Merges the bands of `bands` back into the channels of `data`.
    pub(crate) fn merge(&mut self, bands: &ChannelBuffer<f32>, data: &mut ChannelBuffer<f32>) {
        debug_assert_eq!(data.num_channels(), bands.num_channels());
        debug_assert_eq!(data.num_frames(), bands.num_frames());

        match &mut self.filters {
            BandFilters::Two(states) => {
                for (ch, state) in states.iter_mut().enumerate() {
                    state.merge(bands.channel(0, ch), bands.channel(1, ch), data.bands_mut(ch));
                }
            }
            BandFilters::Three(banks) => {
                for (ch, bank) in banks.iter_mut().enumerate() {
                    let mut input = [[0.0f32; SPLIT_BAND_SIZE]; 3];
                    for (band, samples) in input.iter_mut().enumerate() {
                        samples.copy_from_slice(bands.channel(band, ch));
                    }
                    let output: &mut [f32; FULL_BAND_SIZE] = data
                        .bands_mut(ch)
                        .try_into()
                        .expect("3-band frames are 480 samples");
                    bank.merge(&input, output);
                }
            }
        }
    }
}
