//! Single-partition frequency-domain adaptive filter.

use aec_fft::{SpectralTransform, TransformKind};

/// Overlap-save NLMS filter working on packed half-spectra.
///
/// The filter spans `frame_len` time-domain taps inside a `2 * frame_len`
/// transform window. [`estimate_echo`](Self::estimate_echo) consumes a
/// render window of `2 * frame_len` samples and produces the `frame_len`
/// echo samples aligned with the current capture frame;
/// [`adapt`](Self::adapt) then updates the weights from the residual error.
pub struct FrequencyDomainFilter {
    fft: SpectralTransform,
    frame_len: usize,
    step_size: f32,
    regularization: f32,
    /// Filter weights, packed like the forward transform output.
    weights: Vec<f32>,
    /// Render spectrum of the last `estimate_echo` call.
    render_spectrum: Vec<f32>,
    spectrum_scratch: Vec<f32>,
    time_scratch: Vec<f32>,
}

impl FrequencyDomainFilter {
    pub fn new(frame_len: usize, step_size: f32, regularization: f32) -> Self {
        let window = 2 * frame_len;
        Self {
            fft: SpectralTransform::new(window, TransformKind::Real),
            frame_len,
            step_size,
            regularization,
            weights: vec![0.0; window],
            render_spectrum: vec![0.0; window],
            spectrum_scratch: vec![0.0; window],
            time_scratch: vec![0.0; window],
        }
    }

    /// Filters the render window through the current weights.
    ///
    /// `render_window` holds `2 * frame_len` delay-aligned render samples,
    /// oldest first; `echo_out` receives the `frame_len` echo samples for
    /// the current capture frame. The render spectrum is retained for the
    /// next [`adapt`](Self::adapt) call.
    pub fn estimate_echo(&mut self, render_window: &[f32], echo_out: &mut [f32]) {
        assert_eq!(render_window.len(), 2 * self.frame_len);
        assert_eq!(echo_out.len(), self.frame_len);

        self.fft.forward(render_window, &mut self.render_spectrum);
        multiply_packed(
            &self.weights,
            &self.render_spectrum,
            &mut self.spectrum_scratch,
        );
        self.fft
            .inverse(&self.spectrum_scratch, &mut self.time_scratch);

        // Overlap-save: only the second half of the circular convolution is
        // a valid linear convolution result.
        echo_out.copy_from_slice(&self.time_scratch[self.frame_len..]);
    }

    /// NLMS weight update from the residual `error` of the last estimate.
    ///
    /// The error block is zero-padded into the first half of the window to
    /// match the overlap-save output positions, and the updated weights are
    /// re-constrained to `frame_len` causal taps. The step is normalized by
    /// the render window's mean per-bin power; dividing each bin by its own
    /// instantaneous power lets momentarily weak bins blow the update up.
    pub fn adapt(&mut self, error: &[f32]) {
        assert_eq!(error.len(), self.frame_len);

        self.time_scratch[..self.frame_len].fill(0.0);
        self.time_scratch[self.frame_len..].copy_from_slice(error);
        self.fft
            .forward(&self.time_scratch, &mut self.spectrum_scratch);

        let window = self.weights.len();
        // Sum of squares over the packed spectrum is the total bin power.
        let mean_power = self
            .render_spectrum
            .iter()
            .map(|v| v * v)
            .sum::<f32>()
            / (window / 2) as f32;
        let scale = self.step_size / (mean_power + self.regularization);

        // DC and Nyquist are purely real in the packed layout.
        for bin in 0..2 {
            self.weights[bin] += scale * self.render_spectrum[bin] * self.spectrum_scratch[bin];
        }
        for bin in (2..window).step_by(2) {
            let (xr, xi) = (self.render_spectrum[bin], self.render_spectrum[bin + 1]);
            let (er, ei) = (self.spectrum_scratch[bin], self.spectrum_scratch[bin + 1]);
            // conj(X) * E
            let gr = xr * er + xi * ei;
            let gi = xr * ei - xi * er;
            self.weights[bin] += scale * gr;
            self.weights[bin + 1] += scale * gi;
        }

        self.constrain_weights();
    }

    /// Zeroes the non-causal half of the time-domain weights.
    fn constrain_weights(&mut self) {
        self.fft.inverse(&self.weights, &mut self.time_scratch);
        self.time_scratch[self.frame_len..].fill(0.0);
        self.fft.forward(&self.time_scratch, &mut self.weights);
    }

    pub fn reset(&mut self) {
        self.weights.fill(0.0);
        self.render_spectrum.fill(0.0);
    }
}

/// Packed-layout complex multiply: `out = a * b` bin by bin, with the DC and
/// Nyquist slots multiplied as reals.
fn multiply_packed(a: &[f32], b: &[f32], out: &mut [f32]) {
    out[0] = a[0] * b[0];
    out[1] = a[1] * b[1];
    for bin in (2..a.len()).step_by(2) {
        out[bin] = a[bin] * b[bin] - a[bin + 1] * b[bin + 1];
        out[bin + 1] = a[bin] * b[bin + 1] + a[bin + 1] * b[bin];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(len: usize, seed: u64) -> Vec<f32> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                ((state >> 33) as f32 / (1u64 << 31) as f32) - 1.0
            })
            .collect()
    }

    #[test]
    fn zero_weights_estimate_zero_echo() {
        let mut filter = FrequencyDomainFilter::new(80, 0.25, 1e-3);
        let render = noise(160, 7);
        let mut echo = [1.0f32; 80];
        filter.estimate_echo(&render, &mut echo);
        for &v in &echo {
            assert!(v.abs() < 1e-6);
        }
    }

    #[test]
    fn converges_on_identity_echo_path() {
        // Echo equals the aligned render segment. The filter should learn a
        // unit tap and drive the residual toward zero.
        let frame_len = 80;
        let mut filter = FrequencyDomainFilter::new(frame_len, 0.5, 1e-6);
        let stream = noise(frame_len * 220, 42);

        let mut residual_energy = f32::MAX;
        for frame in 20..220 {
            let end = frame * frame_len;
            let window = &stream[end - 2 * frame_len..end];
            let capture = &stream[end - frame_len..end];

            let mut echo = vec![0.0f32; frame_len];
            filter.estimate_echo(window, &mut echo);
            let error: Vec<f32> = capture
                .iter()
                .zip(&echo)
                .map(|(c, e)| c - e)
                .collect();
            filter.adapt(&error);
            residual_energy = error.iter().map(|v| v * v).sum::<f32>() / frame_len as f32;
        }

        let signal_energy =
            stream.iter().map(|v| v * v).sum::<f32>() / stream.len() as f32;
        assert!(
            residual_energy < 0.01 * signal_energy,
            "residual {residual_energy} vs signal {signal_energy}"
        );
    }

    #[test]
    fn long_white_noise_run_stays_bounded() {
        // Identity echo path driven for many blocks. The residual must
        // stay finite throughout and end up small, not walk off.
        let frame_len = 80;
        let mut filter = FrequencyDomainFilter::new(frame_len, 0.5, 1e-6);
        let stream = noise(frame_len * 1000, 9);

        let mut residual_energy = f32::MAX;
        for frame in 2..1000 {
            let end = frame * frame_len;
            let window = &stream[end - 2 * frame_len..end];
            let capture = &stream[end - frame_len..end];

            let mut echo = vec![0.0f32; frame_len];
            filter.estimate_echo(window, &mut echo);
            let error: Vec<f32> = capture
                .iter()
                .zip(&echo)
                .map(|(c, e)| c - e)
                .collect();
            assert!(
                error.iter().all(|v| v.is_finite()),
                "non-finite residual at frame {frame}"
            );
            filter.adapt(&error);
            residual_energy = error.iter().map(|v| v * v).sum::<f32>() / frame_len as f32;
        }

        let signal_energy =
            stream.iter().map(|v| v * v).sum::<f32>() / stream.len() as f32;
        assert!(residual_energy < 0.05 * signal_energy);
    }

    #[test]
    fn reset_forgets_adaptation() {
        let frame_len = 80;
        let mut filter = FrequencyDomainFilter::new(frame_len, 0.5, 1e-6);
        let render = noise(2 * frame_len, 3);

        let mut echo = vec![0.0f32; frame_len];
        filter.estimate_echo(&render, &mut echo);
        filter.adapt(&render[frame_len..]);
        filter.reset();

        filter.estimate_echo(&render, &mut echo);
        for &v in &echo {
            assert!(v.abs() < 1e-6);
        }
    }
}
