//! Frame-synchronous acoustic echo cancellation pipeline.
//!
//! A [`Session`] consumes matched 10 ms frames of the rendered (reference)
//! and captured signals at a shared native rate, drives the band splitter,
//! high-pass filter and echo-control engine in a fixed order, and emits the
//! cancelled frame. Sessions created with linear-output export additionally
//! produce a mono 16 kHz view of the cancelled signal each tick, regardless
//! of the native rate.
//!
//! The engine is consumed through the [`EchoControl`] trait;
//! [`Session::new`] wires in the sub-band canceller from `aec-engine`, and
//! [`Session::with_echo_control`] accepts any other implementation.
//!
//! The `ffi` module exposes the same lifecycle over a C ABI.

mod audio_buffer;
mod config;
mod echo_control;
mod error;
pub mod ffi;
mod high_pass_filter;
mod session;
mod splitting_filter;
mod stream_config;
mod three_band_filter_bank;

pub use audio_buffer::AudioBuffer;
pub use config::{SUPPORTED_SAMPLE_RATES_HZ, SessionConfig};
pub use echo_control::EchoControl;
pub use error::{ConfigError, ProcessError};
pub use session::{LINEAR_OUTPUT_RATE_HZ, LINEAR_OUTPUT_SAMPLES, Session};
pub use stream_config::StreamConfig;
