//! Echo-control engine for the AEC frame pipeline.
//!
//! The pipeline hands this engine split-band audio once per 10 ms tick, in a
//! fixed order: render analysis, capture analysis, delay update, capture
//! processing. The engine keeps a history of the mono-downmixed render
//! signal, aligns it with the capture stream using the caller-supplied
//! buffering delay, and subtracts a frequency-domain echo estimate from the
//! lowest band of each capture channel.
//!
//! The adaptive filter is a single-partition overlap-save NLMS filter;
//! adaptation freezes while the microphone is saturated or the aligned
//! render segment is silent.

#![deny(unsafe_code)]

mod adaptive_filter;
mod config;
mod render_history;

mod canceller;

pub use canceller::SubbandCanceller;
pub use config::CancellerConfig;
