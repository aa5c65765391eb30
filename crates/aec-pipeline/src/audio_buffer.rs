//! Deinterleaved FloatS16 storage for one stream's 10 ms frame.

use aec_common_audio::audio_util::{deinterleave_channel, interleave_channel};
use aec_common_audio::channel_buffer::ChannelBuffer;

use crate::splitting_filter::SplittingFilter;

/// Number of frequency bands a stream at `sample_rate_hz` is split into.
///
/// Per-band processing happens at 16 kHz or below, so 32 kHz gets a QMF
/// pair and 48 kHz the three-band bank; 8 and 16 kHz stay single-band.
pub(crate) fn bands_for_rate(sample_rate_hz: usize) -> usize {
    match sample_rate_hz {
        32_000 => 2,
        48_000 => 3,
        _ => 1,
    }
}

/// Per-channel FloatS16 audio for one 10 ms frame, with an optional
/// split-band view.
///
/// The full-band samples live in `data`. For multi-band rates,
/// [`split_into_frequency_bands`](Self::split_into_frequency_bands) fills
/// `split_data` and [`merge_frequency_bands`](Self::merge_frequency_bands)
/// folds it back; single-band streams alias the two views so band 0 is
/// always the signal the engine should see.
pub struct AudioBuffer {
    data: ChannelBuffer<f32>,
    split_data: Option<ChannelBuffer<f32>>,
    splitting_filter: Option<SplittingFilter>,
}

impl AudioBuffer {
    pub fn new(sample_rate_hz: usize, num_channels: usize) -> Self {
        let num_frames = sample_rate_hz / 100;
        let num_bands = bands_for_rate(sample_rate_hz);
        let (split_data, splitting_filter) = if num_bands > 1 {
            (
                Some(ChannelBuffer::new(num_frames, num_channels, num_bands)),
                Some(SplittingFilter::new(num_channels, num_bands)),
            )
        } else {
            (None, None)
        };
        Self {
            data: ChannelBuffer::new(num_frames, num_channels, 1),
            split_data,
            splitting_filter,
        }
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.data.num_frames()
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.data.num_channels()
    }

    /// Samples per channel in each band.
    pub fn num_frames_per_band(&self) -> usize {
        match &self.split_data {
            Some(split) => split.num_frames_per_band(),
            None => self.data.num_frames(),
        }
    }

    /// Widens an interleaved S16 frame into the per-channel storage.
    pub fn copy_from_frame(&mut self, interleaved: &[i16]) {
        let num_channels = self.num_channels();
        debug_assert_eq!(interleaved.len(), self.num_frames() * num_channels);
        for ch in 0..num_channels {
            deinterleave_channel(interleaved, ch, num_channels, self.data.bands_mut(ch));
        }
    }

    /// Narrows the per-channel storage back into an interleaved S16 frame.
    pub fn copy_to_frame(&self, interleaved: &mut [i16]) {
        let num_channels = self.num_channels();
        debug_assert_eq!(interleaved.len(), self.num_frames() * num_channels);
        for ch in 0..num_channels {
            interleave_channel(self.data.bands(ch), ch, num_channels, interleaved);
        }
    }

    /// Decomposes the full-band signal into frequency bands. A no-op for
    /// single-band streams.
    pub fn split_into_frequency_bands(&mut self) {
        if let (Some(filter), Some(split)) = (&mut self.splitting_filter, &mut self.split_data) {
            filter.split(&self.data, split);
        }
    }

    /// Recomposes the full-band signal from its frequency bands. A no-op
    /// for single-band streams.
    pub fn merge_frequency_bands(&mut self) {
        if let (Some(filter), Some(split)) = (&mut self.splitting_filter, &mut self.split_data) {
            filter.merge(split, &mut self.data);
        }
    }

    /// Band 0 of one channel.
    pub fn split_band(&self, channel: usize) -> &[f32] {
        match &self.split_data {
            Some(split) => split.channel(0, channel),
            None => self.data.bands(channel),
        }
    }

    /// Band 0 of every channel, immutably.
    pub fn split_bands(&self) -> Vec<&[f32]> {
        (0..self.num_channels())
            .map(|ch| self.split_band(ch))
            .collect()
    }

    /// Band 0 of every channel, mutably.
    pub fn split_bands_mut(&mut self) -> Vec<&mut [f32]> {
        match &mut self.split_data {
            Some(split) => split.band_channels_mut(0),
            None => self.data.band_channels_mut(0),
        }
    }

    /// The full-band samples of one channel.
    pub fn channel(&self, channel: usize) -> &[f32] {
        self.data.bands(channel)
    }

    /// Mutable full-band samples of one channel.
    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        self.data.bands_mut(channel)
    }
}
