//! Stream format descriptor.

/// Sample rate and channel count of one audio stream, with the 10 ms frame
/// geometry derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    sample_rate_hz: usize,
    num_channels: usize,
}

impl StreamConfig {
    pub fn new(sample_rate_hz: usize, num_channels: usize) -> Self {
        Self {
            sample_rate_hz,
            num_channels,
        }
    }

    #[inline]
    pub fn sample_rate_hz(&self) -> usize {
        self.sample_rate_hz
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Samples per channel in a 10 ms frame.
    #[inline]
    pub fn num_frames(&self) -> usize {
        self.sample_rate_hz / 100
    }

    /// Total samples in one interleaved 10 ms frame.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_frames() * self.num_channels
    }
}
