//! Sub-band echo canceller state machine.

use tracing::warn;

use crate::adaptive_filter::FrequencyDomainFilter;
use crate::config::CancellerConfig;
use crate::render_history::RenderHistory;

/// Absolute sample value at which the capture frame counts as saturated.
const SATURATION_THRESHOLD: f32 = 32_700.0;

/// Mean render power below which adaptation pauses. Values are in the
/// [-32768, 32768] float range, so this is well under quantization noise.
const SILENCE_POWER: f32 = 1e-3;

/// Frequency-domain echo canceller for the lowest band of a split-band
/// capture stream.
///
/// Callers drive it once per 10 ms tick in a fixed order: render analysis,
/// capture analysis, delay update, capture processing. Each capture channel
/// has its own adaptive filter; the render signal is downmixed to mono
/// before entering the shared history.
pub struct SubbandCanceller {
    frame_len: usize,
    history: RenderHistory,
    filters: Vec<FrequencyDomainFilter>,
    /// Alignment delay in samples at the band rate.
    delay_samples: usize,
    max_delay_samples: usize,
    capture_saturated: bool,
    render_downmix: Vec<f32>,
    render_window: Vec<f32>,
    echo: Vec<f32>,
    error: Vec<f32>,
}

impl SubbandCanceller {
    /// Creates a canceller for `num_capture_channels` channels of
    /// `frame_len`-sample band frames.
    pub fn new(frame_len: usize, num_capture_channels: usize, config: CancellerConfig) -> Self {
        assert!(frame_len > 0);
        assert!(num_capture_channels > 0);
        let history = RenderHistory::new(frame_len, config.render_history_frames);
        let max_delay_samples = history.capacity() - 2 * frame_len;
        Self {
            frame_len,
            history,
            filters: (0..num_capture_channels)
                .map(|_| {
                    FrequencyDomainFilter::new(frame_len, config.step_size, config.regularization)
                })
                .collect(),
            delay_samples: 0,
            max_delay_samples,
            capture_saturated: false,
            render_downmix: vec![0.0; frame_len],
            render_window: vec![0.0; 2 * frame_len],
            echo: vec![0.0; frame_len],
            error: vec![0.0; frame_len],
        }
    }

    /// Records a render frame. `band0` holds one `frame_len` slice per
    /// render channel; multi-channel render is downmixed to mono.
    pub fn analyze_render(&mut self, band0: &[&[f32]]) {
        assert!(!band0.is_empty());
        let gain = 1.0 / band0.len() as f32;
        self.render_downmix.fill(0.0);
        for channel in band0 {
            assert_eq!(channel.len(), self.frame_len);
            for (acc, &v) in self.render_downmix.iter_mut().zip(channel.iter()) {
                *acc += v * gain;
            }
        }
        self.history.push_frame(&self.render_downmix);
    }

    /// Inspects the capture frame before any processing touches it. The
    /// slices may be full-band (any length).
    ///
    /// A frame with samples at or beyond full scale marks the capture as
    /// saturated, which freezes adaptation for this tick.
    pub fn analyze_capture(&mut self, channels: &[&[f32]]) {
        self.capture_saturated = channels
            .iter()
            .flat_map(|channel| channel.iter())
            .any(|&v| v.abs() >= SATURATION_THRESHOLD);
    }

    /// Updates the render-to-capture alignment delay, in samples at the
    /// band rate. Applied as given on the next `process_capture` call, with
    /// no smoothing; delays beyond what the render history can cover are
    /// clamped.
    pub fn set_audio_buffer_delay(&mut self, delay_samples: usize) {
        self.delay_samples = delay_samples.min(self.max_delay_samples);
        if self.delay_samples != delay_samples {
            warn!(
                delay_samples,
                clamped = self.delay_samples,
                "audio buffer delay exceeds render history, clamping"
            );
        }
    }

    /// Subtracts the echo estimate from each capture channel in place.
    ///
    /// When `linear_output` is given, the cancelled first channel is copied
    /// into its head and the remainder is zeroed.
    pub fn process_capture(
        &mut self,
        band0: &mut [&mut [f32]],
        linear_output: Option<&mut [f32]>,
    ) {
        assert_eq!(band0.len(), self.filters.len());

        self.history
            .segment(self.delay_samples, &mut self.render_window);
        let render_power = self
            .render_window
            .iter()
            .map(|v| v * v)
            .sum::<f32>()
            / self.render_window.len() as f32;
        let adapt = !self.capture_saturated && render_power > SILENCE_POWER;

        for (channel, filter) in band0.iter_mut().zip(self.filters.iter_mut()) {
            assert_eq!(channel.len(), self.frame_len);
            filter.estimate_echo(&self.render_window, &mut self.echo);
            for ((err, &input), &echo) in
                self.error.iter_mut().zip(channel.iter()).zip(self.echo.iter())
            {
                *err = input - echo;
            }
            if adapt {
                filter.adapt(&self.error);
            }
            channel.copy_from_slice(&self.error);
        }

        if let Some(linear) = linear_output {
            assert!(linear.len() >= self.frame_len);
            linear[..self.frame_len].copy_from_slice(&band0[0]);
            linear[self.frame_len..].fill(0.0);
        }

        self.capture_saturated = false;
    }
}
