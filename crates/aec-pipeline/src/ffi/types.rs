//! C-compatible type definitions for the echo cancellation C API.
//!
//! All types here are `#[repr(C)]` or opaque and safe to pass across FFI
//! boundaries.

use crate::config::SessionConfig;
use crate::error::ProcessError;
use crate::session::Session;

/// Error codes returned by C API functions.
///
/// `0` = success, negative = error.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AecError {
    /// Operation succeeded.
    None = 0,
    /// Null pointer passed to a function that requires non-null.
    NullPointer = -1,
    /// Internal error (panic caught at FFI boundary).
    Internal = -2,
    /// A frame buffer did not hold exactly one 10 ms frame.
    BadFrameSize = -3,
    /// The linear output buffer did not hold exactly 160 samples.
    BadLinearOutputSize = -4,
    /// The delay argument was negative.
    BadDelay = -5,
}

impl From<ProcessError> for AecError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::BadFrameSize { .. } => AecError::BadFrameSize,
            ProcessError::BadLinearOutputSize { .. } => AecError::BadLinearOutputSize,
        }
    }
}

/// Flat session configuration.
///
/// Obtain a default-initialized instance via `aec_config_default()`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AecConfig {
    /// Native rate of both streams: 8000, 16000, 32000 or 48000.
    pub sample_rate_hz: i32,
    /// Channel count of both streams, at least 1.
    pub num_channels: i32,
    /// Produce the mono 16 kHz linear output alongside the processed frame.
    pub export_linear_output: bool,
    /// Initial reference-to-capture delay in samples at the native rate.
    pub initial_buffer_delay: i32,
}

impl AecConfig {
    pub(crate) fn from_rust(config: &SessionConfig) -> Self {
        Self {
            sample_rate_hz: config.sample_rate_hz as i32,
            num_channels: config.num_channels as i32,
            export_linear_output: config.export_linear_output,
            initial_buffer_delay: config.initial_buffer_delay as i32,
        }
    }

    /// Negative rate or channel fields map to zero, which `Session::new`
    /// rejects; only the delay is clamped rather than rejected.
    pub(crate) fn to_rust(self) -> SessionConfig {
        SessionConfig {
            sample_rate_hz: self.sample_rate_hz.max(0) as usize,
            num_channels: self.num_channels.max(0) as usize,
            export_linear_output: self.export_linear_output,
            initial_buffer_delay: self.initial_buffer_delay.max(0) as usize,
        }
    }
}

/// Opaque session handle. Created by `aec_create()`, freed by
/// `aec_destroy()`.
pub struct AecSession {
    pub(crate) inner: Session,
}
