//! Forward/inverse transform wrapper with a fixed descriptor.

use std::sync::Arc;

use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Whether the transform operates on real samples or interleaved complex ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    /// Input is `size` real samples; the spectrum is packed into `size`
    /// floats as `[DC, Nyquist, re1, im1, re2, im2, ...]`.
    Real,
    /// Input is `size` floats interpreted as `size / 2` interleaved complex
    /// values `[re0, im0, re1, im1, ...]`.
    Complex,
}

enum Backend {
    Real {
        forward: Arc<dyn RealToComplex<f32>>,
        inverse: Arc<dyn ComplexToReal<f32>>,
        spectrum: Vec<Complex<f32>>,
        time: Vec<f32>,
    },
    Complex {
        forward: Arc<dyn Fft<f32>>,
        inverse: Arc<dyn Fft<f32>>,
        values: Vec<Complex<f32>>,
        scratch: Vec<Complex<f32>>,
    },
}

/// Fixed-size forward/inverse spectral transform.
///
/// The transform size and kind are set once at construction and immutable
/// afterwards. Both [`forward`](Self::forward) and
/// [`inverse`](Self::inverse) require input and output slices of exactly the
/// configured size; anything else is a fatal precondition failure, since the
/// adaptive filter's correctness depends on exact-size transforms.
///
/// Forward followed by inverse reproduces the original block to within
/// floating-point tolerance (the inverse carries the `1/N` normalization).
pub struct SpectralTransform {
    size: usize,
    kind: TransformKind,
    backend: Backend,
}

impl SpectralTransform {
    /// Plans a transform of `size` floats.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or odd. Both kinds use an even packed
    /// layout: real mode pairs spectrum bins, complex mode pairs re/im.
    pub fn new(size: usize, kind: TransformKind) -> Self {
        assert!(size > 0, "transform size must be non-zero");
        assert!(
            size.is_multiple_of(2),
            "transform size must be even, got {size}"
        );

        let backend = match kind {
            TransformKind::Real => {
                let mut planner = RealFftPlanner::<f32>::new();
                Backend::Real {
                    forward: planner.plan_fft_forward(size),
                    inverse: planner.plan_fft_inverse(size),
                    spectrum: vec![Complex::default(); size / 2 + 1],
                    time: vec![0.0; size],
                }
            }
            TransformKind::Complex => {
                let mut planner = FftPlanner::<f32>::new();
                let forward = planner.plan_fft_forward(size / 2);
                let inverse = planner.plan_fft_inverse(size / 2);
                let scratch_len = forward
                    .get_inplace_scratch_len()
                    .max(inverse.get_inplace_scratch_len());
                Backend::Complex {
                    forward,
                    inverse,
                    values: vec![Complex::default(); size / 2],
                    scratch: vec![Complex::default(); scratch_len],
                }
            }
        };

        Self {
            size,
            kind,
            backend,
        }
    }

    /// The configured transform size in floats.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    /// Transforms a time-domain block into its frequency-domain
    /// representation.
    ///
    /// # Panics
    ///
    /// Panics unless `input.len() == output.len() == size`.
    pub fn forward(&mut self, input: &[f32], output: &mut [f32]) {
        self.check_lengths(input, output);
        match &mut self.backend {
            Backend::Real {
                forward,
                spectrum,
                time,
                ..
            } => {
                time.copy_from_slice(input);
                forward
                    .process(time, spectrum)
                    .expect("buffer lengths fixed at construction");
                pack_half_spectrum(spectrum, output);
            }
            Backend::Complex {
                forward,
                values,
                scratch,
                ..
            } => {
                floats_to_complex(input, values);
                forward.process_with_scratch(values, scratch);
                complex_to_floats(values, output);
            }
        }
    }

    /// Performs the matching inverse transform, including `1/N`
    /// normalization so that forward-then-inverse round-trips.
    ///
    /// # Panics
    ///
    /// Panics unless `input.len() == output.len() == size`.
    pub fn inverse(&mut self, input: &[f32], output: &mut [f32]) {
        self.check_lengths(input, output);
        match &mut self.backend {
            Backend::Real {
                inverse,
                spectrum,
                time,
                ..
            } => {
                unpack_half_spectrum(input, spectrum);
                inverse
                    .process(spectrum, time)
                    .expect("buffer lengths fixed at construction");
                let scale = 1.0 / self.size as f32;
                for (out, &v) in output.iter_mut().zip(time.iter()) {
                    *out = v * scale;
                }
            }
            Backend::Complex {
                inverse,
                values,
                scratch,
                ..
            } => {
                floats_to_complex(input, values);
                inverse.process_with_scratch(values, scratch);
                let scale = 1.0 / (self.size / 2) as f32;
                for v in values.iter_mut() {
                    *v *= scale;
                }
                complex_to_floats(values, output);
            }
        }
    }

    #[inline]
    fn check_lengths(&self, input: &[f32], output: &[f32]) {
        assert_eq!(
            input.len(),
            self.size,
            "input length must equal the transform size"
        );
        assert_eq!(
            output.len(),
            self.size,
            "output length must equal the transform size"
        );
    }
}

/// Packs the `N/2 + 1` half spectrum into `N` floats:
/// `[DC, Nyquist, re1, im1, ...]`. DC and Nyquist of a real signal are
/// purely real, so nothing is lost.
fn pack_half_spectrum(spectrum: &[Complex<f32>], packed: &mut [f32]) {
    let half = spectrum.len() - 1;
    packed[0] = spectrum[0].re;
    packed[1] = spectrum[half].re;
    for (bin, value) in spectrum[1..half].iter().enumerate() {
        packed[2 + 2 * bin] = value.re;
        packed[3 + 2 * bin] = value.im;
    }
}

fn unpack_half_spectrum(packed: &[f32], spectrum: &mut [Complex<f32>]) {
    let half = spectrum.len() - 1;
    spectrum[0] = Complex::new(packed[0], 0.0);
    spectrum[half] = Complex::new(packed[1], 0.0);
    for (bin, value) in spectrum[1..half].iter_mut().enumerate() {
        *value = Complex::new(packed[2 + 2 * bin], packed[3 + 2 * bin]);
    }
}

fn floats_to_complex(interleaved: &[f32], values: &mut [Complex<f32>]) {
    for (value, pair) in values.iter_mut().zip(interleaved.chunks_exact(2)) {
        *value = Complex::new(pair[0], pair[1]);
    }
}

fn complex_to_floats(values: &[Complex<f32>], interleaved: &mut [f32]) {
    for (value, pair) in values.iter().zip(interleaved.chunks_exact_mut(2)) {
        pair[0] = value.re;
        pair[1] = value.im;
    }
}
