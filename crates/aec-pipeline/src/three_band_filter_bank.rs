//! Three-band filter bank for 48 kHz frames.
//!
//! Decomposes a 480-sample full-band frame into three 160-sample bands
//! (0-8, 8-16, 16-24 kHz) with a sparse FIR prototype filter modulated by a
//! DCT, and merges them back. Two of the twelve polyphase branches have
//! all-zero filters and are skipped.

const SQRT_3: f32 = 1.732_050_8;

const NUM_BANDS: usize = 3;
const STRIDE: usize = 4;
const FILTER_SIZE: usize = 4;
/// Samples of input each branch filter remembers between frames.
const MEMORY_SIZE: usize = FILTER_SIZE * STRIDE - 1;

pub(crate) const FULL_BAND_SIZE: usize = 480;
pub(crate) const SPLIT_BAND_SIZE: usize = FULL_BAND_SIZE / NUM_BANDS;

const NUM_NON_ZERO_FILTERS: usize = 10;

#[rustfmt::skip]
static FILTER_COEFFS: [[f32; FILTER_SIZE]; NUM_NON_ZERO_FILTERS] = [
    [-0.00047749, -0.00496888, 0.16547118,  0.00425496],
    [-0.00173287, -0.01585778, 0.14989004,  0.00994113],
    [-0.00304815, -0.02536082, 0.12154542,  0.01157993],
    [-0.00346946, -0.02587886, 0.04760441,  0.00607594],
    [-0.00154717, -0.01136076, 0.01387458,  0.00186353],
    [ 0.00186353,  0.01387458,-0.01136076, -0.00154717],
    [ 0.00607594,  0.04760441,-0.02587886, -0.00346946],
    [ 0.00983212,  0.08543175,-0.02982767, -0.00383509],
    [ 0.00994113,  0.14989004,-0.01585778, -0.00173287],
    [ 0.00425496,  0.16547118,-0.00496888, -0.00047749],
];

#[rustfmt::skip]
const DCT_MODULATION: [[f32; NUM_BANDS]; NUM_NON_ZERO_FILTERS] = [
    [ 2.0,     2.0,    2.0],
    [ SQRT_3,  0.0,   -SQRT_3],
    [ 1.0,    -2.0,    1.0],
    [-1.0,     2.0,   -1.0],
    [-SQRT_3,  0.0,    SQRT_3],
    [-2.0,    -2.0,   -2.0],
    [-SQRT_3,  0.0,    SQRT_3],
    [-1.0,     2.0,   -1.0],
    [ 1.0,    -2.0,    1.0],
    [ SQRT_3,  0.0,   -SQRT_3],
];

/// Maps a polyphase branch index (0..12) to its row in the coefficient
/// tables, or `None` for the two all-zero branches.
fn non_zero_filter_index(branch: usize) -> Option<usize> {
    match branch {
        3 | 9 => None,
        0..3 => Some(branch),
        4..9 => Some(branch - 1),
        _ => Some(branch - 2),
    }
}

/// One sparse FIR branch: taps spaced `STRIDE` apart, with carry-over
/// memory so frames filter continuously.
struct SparseFirFilter {
    taps: &'static [f32; FILTER_SIZE],
    memory: [f32; MEMORY_SIZE],
}

impl SparseFirFilter {
    fn new(taps: &'static [f32; FILTER_SIZE]) -> Self {
        Self {
            taps,
            memory: [0.0; MEMORY_SIZE],
        }
    }

    /// Filters a subsampled block, reading `in_shift` samples further into
    /// the past to realize the branch's fractional delay.
    fn filter(
        &mut self,
        input: &[f32; SPLIT_BAND_SIZE],
        in_shift: usize,
        output: &mut [f32; SPLIT_BAND_SIZE],
    ) {
        debug_assert!(in_shift < STRIDE);

        // Memory followed by the new block gives every tap position a
        // non-negative index.
        let mut extended = [0.0f32; MEMORY_SIZE + SPLIT_BAND_SIZE];
        extended[..MEMORY_SIZE].copy_from_slice(&self.memory);
        extended[MEMORY_SIZE..].copy_from_slice(input);

        for (k, out) in output.iter_mut().enumerate() {
            let newest = MEMORY_SIZE + k - in_shift;
            *out = self
                .taps
                .iter()
                .enumerate()
                .map(|(i, &tap)| tap * extended[newest - i * STRIDE])
                .sum();
        }

        self.memory
            .copy_from_slice(&input[SPLIT_BAND_SIZE - MEMORY_SIZE..]);
    }
}

fn make_filters() -> Vec<SparseFirFilter> {
    FILTER_COEFFS.iter().map(SparseFirFilter::new).collect()
}

/// Analysis/synthesis filter bank for one channel of 48 kHz audio.
pub(crate) struct ThreeBandFilterBank {
    split_filters: Vec<SparseFirFilter>,
    merge_filters: Vec<SparseFirFilter>,
}

impl ThreeBandFilterBank {
    pub(crate) fn new() -> Self {
        Self {
            split_filters: make_filters(),
            merge_filters: make_filters(),
        }
    }

    /// Splits a 480-sample frame into three 160-sample bands.
    pub(crate) fn split(
        &mut self,
        input: &[f32; FULL_BAND_SIZE],
        output: &mut [[f32; SPLIT_BAND_SIZE]; NUM_BANDS],
    ) {
        for band in output.iter_mut() {
            band.fill(0.0);
        }

        for phase in 0..NUM_BANDS {
            // Every NUM_BANDS-th sample, phase-reversed so branch 0 sees the
            // newest polyphase component.
            let mut subsampled = [0.0f32; SPLIT_BAND_SIZE];
            for (k, v) in subsampled.iter_mut().enumerate() {
                *v = input[(NUM_BANDS - 1) - phase + NUM_BANDS * k];
            }

            for in_shift in 0..STRIDE {
                let Some(filter_index) = non_zero_filter_index(phase + in_shift * NUM_BANDS)
                else {
                    continue;
                };

                let mut filtered = [0.0f32; SPLIT_BAND_SIZE];
                self.split_filters[filter_index].filter(&subsampled, in_shift, &mut filtered);

                for (band, &modulation) in output.iter_mut().zip(&DCT_MODULATION[filter_index]) {
                    for (acc, &v) in band.iter_mut().zip(&filtered) {
                        *acc += modulation * v;
                    }
                }
            }
        }
    }

    /// Merges three 160-sample bands back into a 480-sample frame.
    pub(crate) fn merge(
        &mut self,
        input: &[[f32; SPLIT_BAND_SIZE]; NUM_BANDS],
        output: &mut [f32; FULL_BAND_SIZE],
    ) {
        output.fill(0.0);

        for phase in 0..NUM_BANDS {
            for in_shift in 0..STRIDE {
                let Some(filter_index) = non_zero_filter_index(phase + in_shift * NUM_BANDS)
                else {
                    continue;
                };

                // Demodulate the bands into this branch's subsampled input.
                let mut subsampled = [0.0f32; SPLIT_BAND_SIZE];
                for (band, &modulation) in input.iter().zip(&DCT_MODULATION[filter_index]) {
                    for (acc, &v) in subsampled.iter_mut().zip(band) {
                        *acc += modulation * v;
                    }
                }

                let mut filtered = [0.0f32; SPLIT_BAND_SIZE];
                self.merge_filters[filter_index].filter(&subsampled, in_shift, &mut filtered);

                // Upsample back onto the full-band grid.
                for (k, &v) in filtered.iter().enumerate() {
                    output[phase + NUM_BANDS * k] += NUM_BANDS as f32 * v;
                }
            }
        }
    }
}
