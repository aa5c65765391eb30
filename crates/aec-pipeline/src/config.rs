//! Session configuration.

/// Sample rates a session can be created at.
pub const SUPPORTED_SAMPLE_RATES_HZ: [usize; 4] = [8_000, 16_000, 32_000, 48_000];

/// Configuration for [`Session::new`](crate::Session::new).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Native rate of both the reference and capture streams.
    pub sample_rate_hz: usize,
    /// Channel count of both streams.
    pub num_channels: usize,
    /// Whether to produce the 16 kHz linear cancellation output alongside
    /// the full processed output.
    pub export_linear_output: bool,
    /// Initial reference-to-capture buffering delay in samples, used until
    /// the first `process_frame` call supplies a fresh value.
    pub initial_buffer_delay: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 16_000,
            num_channels: 1,
            export_linear_output: false,
            initial_buffer_delay: 0,
        }
    }
}
