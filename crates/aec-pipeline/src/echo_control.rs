//! The seam between the frame pipeline and the echo-control engine.

use aec_engine::{CancellerConfig, SubbandCanceller};

use crate::audio_buffer::AudioBuffer;

/// Operations the pipeline needs from an echo-control engine.
///
/// The session drives these in a fixed per-frame order (render analysis,
/// capture analysis, delay update, capture processing) and never looks past
/// this trait, so tests can swap in a recording fake to pin that order.
pub trait EchoControl {
    /// Inspects the split render frame before it is merged back.
    fn analyze_render(&mut self, render: &mut AudioBuffer);

    /// Inspects the capture frame before any processing touches it.
    fn analyze_capture(&mut self, capture: &mut AudioBuffer);

    /// Refreshes the render-to-capture buffering delay, in samples at the
    /// session's native rate.
    fn set_audio_buffer_delay(&mut self, delay_samples: usize);

    /// Cancels echo in the split capture frame in place. When
    /// `linear_output` is given, also writes the cancelled 16 kHz linear
    /// signal into it.
    fn process_capture(&mut self, capture: &mut AudioBuffer, linear_output: Option<&mut AudioBuffer>);
}

/// Adapts [`SubbandCanceller`] to the [`EchoControl`] seam.
///
/// The canceller works on band 0 at the band rate, so the native-rate delay
/// from the caller is rescaled before it is handed down.
pub(crate) struct SubbandEchoControl {
    canceller: SubbandCanceller,
    native_frame_len: usize,
    band_frame_len: usize,
}

impl SubbandEchoControl {
    pub(crate) fn new(
        sample_rate_hz: usize,
        num_capture_channels: usize,
        initial_delay_samples: usize,
    ) -> Self {
        let native_frame_len = sample_rate_hz / 100;
        let band_frame_len = sample_rate_hz.min(16_000) / 100;
        let canceller = SubbandCanceller::new(
            band_frame_len,
            num_capture_channels,
            CancellerConfig::default(),
        );
        let mut this = Self {
            canceller,
            native_frame_len,
            band_frame_len,
        };
        this.set_audio_buffer_delay(initial_delay_samples);
        this
    }

    fn to_band_samples(&self, native_samples: usize) -> usize {
        native_samples * self.band_frame_len / self.native_frame_len
    }
}

impl EchoControl for SubbandEchoControl {
    fn analyze_render(&mut self, render: &mut AudioBuffer) {
        self.canceller.analyze_render(&render.split_bands());
    }

    fn analyze_capture(&mut self, capture: &mut AudioBuffer) {
        // Runs before the capture split, so saturation is judged on the
        // full-band signal rather than a stale band view.
        let channels: Vec<&[f32]> = (0..capture.num_channels())
            .map(|ch| capture.channel(ch))
            .collect();
        self.canceller.analyze_capture(&channels);
    }

    fn set_audio_buffer_delay(&mut self, delay_samples: usize) {
        let band_delay = self.to_band_samples(delay_samples);
        self.canceller.set_audio_buffer_delay(band_delay);
    }

    fn process_capture(
        &mut self,
        capture: &mut AudioBuffer,
        linear_output: Option<&mut AudioBuffer>,
    ) {
        let mut bands = capture.split_bands_mut();
        let linear = linear_output.map(|buffer| buffer.channel_mut(0));
        self.canceller.process_capture(&mut bands, linear);
    }
}
