//! Session lifecycle and the per-frame processing pipeline.

use tracing::warn;

use crate::audio_buffer::AudioBuffer;
use crate::config::{SUPPORTED_SAMPLE_RATES_HZ, SessionConfig};
use crate::echo_control::{EchoControl, SubbandEchoControl};
use crate::error::{ConfigError, ProcessError};
use crate::high_pass_filter::HighPassFilter;
use crate::stream_config::StreamConfig;

/// Rate of the linear cancellation output, independent of the native rate.
pub const LINEAR_OUTPUT_RATE_HZ: usize = 16_000;
/// Samples in one mono 10 ms linear output frame.
pub const LINEAR_OUTPUT_SAMPLES: usize = LINEAR_OUTPUT_RATE_HZ / 100;

/// One echo-cancellation session.
///
/// Owns the reference and capture frame buffers, the high-pass filter, and
/// the echo-control engine. All resources are released on drop; sessions
/// shared across a C boundary get an explicit destroy call instead (see the
/// `ffi` module).
pub struct Session {
    stream_config: StreamConfig,
    render_buffer: AudioBuffer,
    capture_buffer: AudioBuffer,
    /// Present when the session exports the 16 kHz linear output.
    linear_buffer: Option<AudioBuffer>,
    high_pass_filter: HighPassFilter,
    echo_control: Box<dyn EchoControl>,
}

impl Session {
    /// Creates a session with the default sub-band canceller engine.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        Self::validate(&config)?;
        let echo_control = Box::new(SubbandEchoControl::new(
            config.sample_rate_hz,
            config.num_channels,
            config.initial_buffer_delay,
        ));
        Self::with_echo_control(config, echo_control)
    }

    /// Creates a session around a caller-supplied echo-control engine.
    pub fn with_echo_control(
        config: SessionConfig,
        echo_control: Box<dyn EchoControl>,
    ) -> Result<Self, ConfigError> {
        Self::validate(&config)?;
        let stream_config = StreamConfig::new(config.sample_rate_hz, config.num_channels);
        let linear_buffer = config
            .export_linear_output
            .then(|| AudioBuffer::new(LINEAR_OUTPUT_RATE_HZ, 1));
        Ok(Self {
            stream_config,
            render_buffer: AudioBuffer::new(config.sample_rate_hz, config.num_channels),
            capture_buffer: AudioBuffer::new(config.sample_rate_hz, config.num_channels),
            linear_buffer,
            high_pass_filter: HighPassFilter::new(config.num_channels),
            echo_control,
        })
    }

    fn validate(config: &SessionConfig) -> Result<(), ConfigError> {
        if !SUPPORTED_SAMPLE_RATES_HZ.contains(&config.sample_rate_hz) {
            return Err(ConfigError::UnsupportedSampleRate {
                sample_rate_hz: config.sample_rate_hz,
            });
        }
        if config.num_channels == 0 {
            return Err(ConfigError::NoChannels);
        }
        Ok(())
    }

    #[inline]
    pub fn sample_rate_hz(&self) -> usize {
        self.stream_config.sample_rate_hz()
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.stream_config.num_channels()
    }

    /// Total interleaved samples each frame of this session holds.
    #[inline]
    pub fn samples_per_frame(&self) -> usize {
        self.stream_config.num_samples()
    }

    /// Processes one 10 ms frame.
    ///
    /// `reference` and `capture` each hold one interleaved frame at the
    /// native rate; `delay_samples` is this call's reference-to-capture
    /// buffering delay, applied as given. The cancelled full-band frame is
    /// written to `output`, and the mono 16 kHz linear output to
    /// `linear_output` when the session was created with export enabled.
    ///
    /// All sizes are validated up front; on error, no state changes and no
    /// output buffer is written.
    pub fn process_frame(
        &mut self,
        reference: &[i16],
        capture: &[i16],
        delay_samples: usize,
        output: &mut [i16],
        linear_output: Option<&mut [i16]>,
    ) -> Result<(), ProcessError> {
        let expected = self.stream_config.num_samples();
        for actual in [reference.len(), capture.len(), output.len()] {
            if actual != expected {
                return Err(ProcessError::BadFrameSize { expected, actual });
            }
        }
        let linear_output = match (linear_output, &self.linear_buffer) {
            (Some(dest), Some(_)) => {
                if dest.len() != LINEAR_OUTPUT_SAMPLES {
                    return Err(ProcessError::BadLinearOutputSize {
                        expected: LINEAR_OUTPUT_SAMPLES,
                        actual: dest.len(),
                    });
                }
                Some(dest)
            }
            (Some(_), None) => {
                warn!("linear output requested on a session without export enabled");
                None
            }
            (None, _) => None,
        };

        // The reference side: ingest, split, hand to the engine, merge back
        // so the buffer holds a full-band signal again.
        self.render_buffer.copy_from_frame(reference);
        self.capture_buffer.copy_from_frame(capture);
        self.render_buffer.split_into_frequency_bands();
        self.echo_control.analyze_render(&mut self.render_buffer);
        self.render_buffer.merge_frequency_bands();

        // The capture side. Analysis sees the raw signal; the high-pass
        // filter then cleans band 0 before cancellation.
        self.echo_control.analyze_capture(&mut self.capture_buffer);
        self.capture_buffer.split_into_frequency_bands();
        self.high_pass_filter.process(&mut self.capture_buffer);
        self.echo_control.set_audio_buffer_delay(delay_samples);
        self.echo_control
            .process_capture(&mut self.capture_buffer, self.linear_buffer.as_mut());
        self.capture_buffer.merge_frequency_bands();

        self.capture_buffer.copy_to_frame(output);
        if let (Some(dest), Some(linear)) = (linear_output, &self.linear_buffer) {
            linear.copy_to_frame(dest);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use test_strategy::{Arbitrary, proptest};

    use super::*;

    fn config(sample_rate_hz: usize, num_channels: usize) -> SessionConfig {
        SessionConfig {
            sample_rate_hz,
            num_channels,
            ..SessionConfig::default()
        }
    }

    fn noise_frame(len: usize, seed: u64) -> Vec<i16> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                (state >> 48) as i16 / 4
            })
            .collect()
    }

    #[test]
    fn creates_at_every_supported_rate() {
        for rate in SUPPORTED_SAMPLE_RATES_HZ {
            for channels in [1, 2, 4] {
                let session = Session::new(config(rate, channels)).unwrap();
                assert_eq!(session.samples_per_frame(), rate / 100 * channels);
            }
        }
    }

    #[test]
    fn rejects_unsupported_rate() {
        assert_eq!(
            Session::new(config(44_100, 1)).err(),
            Some(ConfigError::UnsupportedSampleRate {
                sample_rate_hz: 44_100
            })
        );
    }

    #[test]
    fn rejects_zero_channels() {
        assert!(matches!(
            Session::new(config(16_000, 0)).map(|_| ()),
            Err(ConfigError::NoChannels)
        ));
    }

    #[test]
    fn bad_frame_size_leaves_output_untouched() {
        let mut session = Session::new(config(16_000, 1)).unwrap();
        let reference = vec![0i16; 100];
        let capture = vec![0i16; 160];
        let mut output = vec![77i16; 160];

        let err = session
            .process_frame(&reference, &capture, 0, &mut output, None)
            .unwrap_err();
        assert_eq!(
            err,
            ProcessError::BadFrameSize {
                expected: 160,
                actual: 100
            }
        );
        assert!(output.iter().all(|&v| v == 77));
    }

    #[test]
    fn silence_in_silence_out_at_every_rate() {
        for rate in SUPPORTED_SAMPLE_RATES_HZ {
            let mut session = Session::new(config(rate, 1)).unwrap();
            let frame = vec![0i16; rate / 100];
            let mut output = vec![1i16; rate / 100];
            for _ in 0..20 {
                session
                    .process_frame(&frame, &frame, 0, &mut output, None)
                    .unwrap();
                assert!(
                    output.iter().all(|&v| v == 0),
                    "rate {rate}: non-zero output for silent input"
                );
            }
        }
    }

    #[test]
    fn linear_output_is_fixed_shape_at_every_rate() {
        for rate in SUPPORTED_SAMPLE_RATES_HZ {
            let mut session = Session::new(SessionConfig {
                export_linear_output: true,
                ..config(rate, 1)
            })
            .unwrap();
            let reference = noise_frame(rate / 100, 3);
            let capture = noise_frame(rate / 100, 4);
            let mut output = vec![0i16; rate / 100];
            let mut linear = vec![0i16; LINEAR_OUTPUT_SAMPLES];
            session
                .process_frame(&reference, &capture, 0, &mut output, Some(&mut linear))
                .unwrap();

            // A wrongly sized destination is rejected without processing.
            let mut too_small = vec![0i16; 80];
            let err = session
                .process_frame(
                    &reference,
                    &capture,
                    0,
                    &mut output,
                    Some(&mut too_small),
                )
                .unwrap_err();
            assert_eq!(
                err,
                ProcessError::BadLinearOutputSize {
                    expected: LINEAR_OUTPUT_SAMPLES,
                    actual: 80
                }
            );
        }
    }

    #[test]
    fn linear_destination_without_export_is_ignored() {
        let mut session = Session::new(config(16_000, 1)).unwrap();
        let frame = noise_frame(160, 9);
        let mut output = vec![0i16; 160];
        let mut linear = vec![1234i16; LINEAR_OUTPUT_SAMPLES];
        session
            .process_frame(&frame, &frame, 0, &mut output, Some(&mut linear))
            .unwrap();
        assert!(linear.iter().all(|&v| v == 1234));
    }

    #[test]
    fn cancels_echo_end_to_end() {
        let mut session = Session::new(config(16_000, 1)).unwrap();
        let mut output = vec![0i16; 160];
        let mut in_energy = 0.0f64;
        let mut out_energy = 0.0f64;

        // Capture is the reference itself: a zero-delay echo path.
        for frame_no in 0..300 {
            let frame = noise_frame(160, 1000 + frame_no);
            session
                .process_frame(&frame, &frame, 0, &mut output, None)
                .unwrap();
            in_energy = frame.iter().map(|&v| f64::from(v).powi(2)).sum();
            out_energy = output.iter().map(|&v| f64::from(v).powi(2)).sum();
        }
        assert!(
            out_energy < 0.3 * in_energy,
            "echo not attenuated: in={in_energy}, out={out_energy}"
        );
    }

    #[test]
    fn sessions_are_independent() {
        let frames: Vec<Vec<i16>> = (0..10).map(|i| noise_frame(160, 50 + i)).collect();

        // Reference run: one session alone.
        let mut alone = Session::new(config(16_000, 1)).unwrap();
        let mut expected = Vec::new();
        for frame in &frames {
            let mut output = vec![0i16; 160];
            alone
                .process_frame(frame, frame, 16, &mut output, None)
                .unwrap();
            expected.push(output);
        }

        // Same inputs with a second session interleaved between calls.
        let mut first = Session::new(config(16_000, 1)).unwrap();
        let mut second = Session::new(config(16_000, 2)).unwrap();
        for (i, frame) in frames.iter().enumerate() {
            let mut output = vec![0i16; 160];
            first
                .process_frame(frame, frame, 16, &mut output, None)
                .unwrap();
            assert_eq!(output, expected[i], "frame {i} diverged");

            let stereo = noise_frame(320, 400 + i as u64);
            let mut stereo_out = vec![0i16; 320];
            second
                .process_frame(&stereo, &stereo, 0, &mut stereo_out, None)
                .unwrap();
        }
    }

    #[derive(Debug, Clone, Copy, Arbitrary)]
    enum Rate {
        R8,
        R16,
        R32,
        R48,
    }

    impl Rate {
        fn get(self) -> usize {
            match self {
                Self::R8 => 8_000,
                Self::R16 => 16_000,
                Self::R32 => 32_000,
                Self::R48 => 48_000,
            }
        }
    }

    #[proptest]
    fn output_always_fills_exactly_one_frame(
        rate: Rate,
        #[strategy(1usize..4)] channels: usize,
        seed: u64,
        #[strategy(0usize..5000)] delay: usize,
    ) {
        let rate = rate.get();
        let mut session = Session::new(config(rate, channels)).unwrap();
        let samples = rate / 100 * channels;

        let reference = noise_frame(samples, seed);
        let capture = noise_frame(samples, seed ^ 0xffff);
        let mut output = vec![0i16; samples];
        session
            .process_frame(&reference, &capture, delay, &mut output, None)
            .unwrap();
    }

    /// Records every engine call so the pipeline ordering can be pinned.
    struct RecordingEchoControl {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl EchoControl for RecordingEchoControl {
        fn analyze_render(&mut self, _render: &mut AudioBuffer) {
            self.calls.borrow_mut().push("analyze_render".into());
        }

        fn analyze_capture(&mut self, _capture: &mut AudioBuffer) {
            self.calls.borrow_mut().push("analyze_capture".into());
        }

        fn set_audio_buffer_delay(&mut self, delay_samples: usize) {
            self.calls
                .borrow_mut()
                .push(format!("set_delay({delay_samples})"));
        }

        fn process_capture(
            &mut self,
            _capture: &mut AudioBuffer,
            linear_output: Option<&mut AudioBuffer>,
        ) {
            self.calls
                .borrow_mut()
                .push(format!("process_capture(linear={})", linear_output.is_some()));
        }
    }

    #[test]
    fn engine_calls_follow_the_pipeline_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let fake = Box::new(RecordingEchoControl {
            calls: Rc::clone(&calls),
        });
        let mut session = Session::with_echo_control(
            SessionConfig {
                export_linear_output: true,
                ..config(48_000, 1)
            },
            fake,
        )
        .unwrap();

        let frame = noise_frame(480, 77);
        let mut output = vec![0i16; 480];
        let mut linear = vec![0i16; LINEAR_OUTPUT_SAMPLES];
        session
            .process_frame(&frame, &frame, 123, &mut output, Some(&mut linear))
            .unwrap();

        assert_eq!(
            *calls.borrow(),
            vec![
                "analyze_render".to_string(),
                "analyze_capture".to_string(),
                "set_delay(123)".to_string(),
                "process_capture(linear=true)".to_string(),
            ]
        );
    }

    #[test]
    fn engine_sees_no_linear_buffer_without_export() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let fake = Box::new(RecordingEchoControl {
            calls: Rc::clone(&calls),
        });
        let mut session = Session::with_echo_control(config(16_000, 1), fake).unwrap();

        let frame = noise_frame(160, 78);
        let mut output = vec![0i16; 160];
        session
            .process_frame(&frame, &frame, 0, &mut output, None)
            .unwrap();

        assert_eq!(
            calls.borrow().last().unwrap(),
            "process_capture(linear=false)"
        );
    }
}
