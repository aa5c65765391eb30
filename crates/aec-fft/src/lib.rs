//! Fixed-size spectral transforms for the AEC pipeline.
//!
//! [`SpectralTransform`] wraps the `realfft`/`rustfft` backends behind the
//! narrow forward/inverse contract the adaptive filter relies on: exact-size
//! buffers, an immutable transform descriptor, and a round-trip that
//! reproduces the input within floating-point tolerance.

#![deny(unsafe_code)]

mod spectral;

pub use spectral::{SpectralTransform, TransformKind};
