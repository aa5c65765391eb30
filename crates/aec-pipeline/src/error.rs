//! Error types for session creation and per-frame processing.

use derive_more::{Display, Error};

/// Rejected [`SessionConfig`](crate::SessionConfig).
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The sample rate is not one of the supported rates.
    #[display("unsupported sample rate: {sample_rate_hz} Hz")]
    UnsupportedSampleRate { sample_rate_hz: usize },

    /// Streams need at least one channel.
    #[display("at least one channel is required")]
    NoChannels,
}

/// Rejected `process_frame` invocation. The session state and all output
/// buffers are left untouched when one of these is returned.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProcessError {
    /// An input or output frame did not hold exactly one 10 ms frame.
    #[display("frame holds {actual} samples, expected {expected}")]
    BadFrameSize { expected: usize, actual: usize },

    /// The linear output buffer did not hold exactly 160 samples.
    #[display("linear output holds {actual} samples, expected {expected}")]
    BadLinearOutputSize { expected: usize, actual: usize },
}
