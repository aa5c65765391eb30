//! Multi-channel, multi-band sample storage.
//!
//! One contiguous allocation, channel-major with the bands of a channel laid
//! out back to back:
//!
//! ```text
//! [ ch0_band0 | ch0_band1 | ch1_band0 | ch1_band1 ]
//! ```
//!
//! `bands(ch)` therefore yields the full-band view of a channel as a single
//! slice, while `channel(band, ch)` yields one band of one channel.

use derive_more::Debug;

/// Multi-channel, optionally multi-band audio buffer.
#[derive(Debug, Clone)]
pub struct ChannelBuffer<T> {
    #[debug(skip)]
    data: Vec<T>,
    num_frames: usize,
    num_frames_per_band: usize,
    num_channels: usize,
    num_bands: usize,
}

impl<T: Clone + Default> ChannelBuffer<T> {
    /// Create a new zero-initialized buffer.
    ///
    /// # Panics
    ///
    /// Panics if any dimension is zero or `num_frames` is not divisible by
    /// `num_bands`.
    pub fn new(num_frames: usize, num_channels: usize, num_bands: usize) -> Self {
        assert!(num_bands > 0, "num_bands must be > 0");
        assert!(num_channels > 0, "num_channels must be > 0");
        assert!(
            num_frames.is_multiple_of(num_bands),
            "num_frames ({num_frames}) must be divisible by num_bands ({num_bands})"
        );
        Self {
            data: vec![T::default(); num_frames * num_channels],
            num_frames,
            num_frames_per_band: num_frames / num_bands,
            num_channels,
            num_bands,
        }
    }
}

impl<T> ChannelBuffer<T> {
    /// Total frames per channel across all bands.
    #[inline]
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Frames in each band.
    #[inline]
    pub fn num_frames_per_band(&self) -> usize {
        self.num_frames_per_band
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    #[inline]
    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    #[inline]
    fn offset(&self, band: usize, channel: usize) -> usize {
        debug_assert!(band < self.num_bands);
        debug_assert!(channel < self.num_channels);
        channel * self.num_frames + band * self.num_frames_per_band
    }

    /// One band of one channel.
    #[inline]
    pub fn channel(&self, band: usize, channel: usize) -> &[T] {
        let start = self.offset(band, channel);
        &self.data[start..start + self.num_frames_per_band]
    }

    /// Mutable view of one band of one channel.
    #[inline]
    pub fn channel_mut(&mut self, band: usize, channel: usize) -> &mut [T] {
        let start = self.offset(band, channel);
        &mut self.data[start..start + self.num_frames_per_band]
    }

    /// All bands of a channel, concatenated (the full-band signal).
    #[inline]
    pub fn bands(&self, channel: usize) -> &[T] {
        debug_assert!(channel < self.num_channels);
        let start = channel * self.num_frames;
        &self.data[start..start + self.num_frames]
    }

    /// Mutable full-band view of a channel.
    #[inline]
    pub fn bands_mut(&mut self, channel: usize) -> &mut [T] {
        debug_assert!(channel < self.num_channels);
        let start = channel * self.num_frames;
        &mut self.data[start..start + self.num_frames]
    }

    /// Mutable slices of a given band for every channel at once.
    ///
    /// Used when a per-band operation needs simultaneous access to all
    /// channels (e.g. handing split-band data to the echo-control engine).
    pub fn band_channels_mut(&mut self, band: usize) -> Vec<&mut [T]> {
        assert!(band < self.num_bands);
        let per_band = self.num_frames_per_band;
        let band_start = band * per_band;
        self.data
            .chunks_mut(self.num_frames)
            .map(|ch| &mut ch[band_start..band_start + per_band])
            .collect()
    }

    /// Raw access to the underlying storage.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable raw access to the underlying storage.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}
