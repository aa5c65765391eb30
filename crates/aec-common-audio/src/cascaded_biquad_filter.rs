//! Cascaded biquad (IIR) filter, direct form 1.

/// Coefficients for one second-order section.
///
/// Transfer function: `(b0 + b1 z^-1 + b2 z^-2) / (1 + a1 z^-1 + a2 z^-2)`,
/// with `b = [b0, b1, b2]` and `a = [a1, a2]`.
#[derive(Debug, Clone, Copy)]
pub struct BiQuadCoefficients {
    pub b: [f32; 3],
    pub a: [f32; 2],
}

#[derive(Debug, Clone)]
struct BiQuad {
    coefficients: BiQuadCoefficients,
    x: [f32; 2],
    y: [f32; 2],
}

impl BiQuad {
    fn new(coefficients: BiQuadCoefficients) -> Self {
        Self {
            coefficients,
            x: [0.0; 2],
            y: [0.0; 2],
        }
    }

    fn reset(&mut self) {
        self.x = [0.0; 2];
        self.y = [0.0; 2];
    }

    fn process_in_place(&mut self, samples: &mut [f32]) {
        let BiQuadCoefficients { b, a } = self.coefficients;
        let [mut x0, mut x1] = self.x;
        let [mut y0, mut y1] = self.y;
        for v in samples.iter_mut() {
            let input = *v;
            *v = b[0] * input + b[1] * x0 + b[2] * x1 - a[0] * y0 - a[1] * y1;
            x1 = x0;
            x0 = input;
            y1 = y0;
            y0 = *v;
        }
        self.x = [x0, x1];
        self.y = [y0, y1];
    }
}

/// Runs a signal through a series of second-order sections.
#[derive(Debug, Clone)]
pub struct CascadedBiQuadFilter {
    sections: Vec<BiQuad>,
}

impl CascadedBiQuadFilter {
    pub fn new(coefficients: &[BiQuadCoefficients]) -> Self {
        Self {
            sections: coefficients.iter().copied().map(BiQuad::new).collect(),
        }
    }

    /// Filters `samples` in place through all sections.
    pub fn process_in_place(&mut self, samples: &mut [f32]) {
        for section in &mut self.sections {
            section.process_in_place(samples);
        }
    }

    /// Clears all section state.
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lowpass() -> BiQuadCoefficients {
        BiQuadCoefficients {
            b: [0.25, 0.5, 0.25],
            a: [0.1, 0.2],
        }
    }

    #[test]
    fn impulse_response_starts_at_b0() {
        let mut filter = CascadedBiQuadFilter::new(&[lowpass()]);
        let mut samples = [1.0, 0.0, 0.0, 0.0];
        filter.process_in_place(&mut samples);
        assert!((samples[0] - 0.25).abs() < 1e-6);
        assert!(samples[1] != 0.0);
    }

    #[test]
    fn empty_cascade_is_passthrough() {
        let mut filter = CascadedBiQuadFilter::new(&[]);
        let mut samples = [1.0, 2.0, 3.0];
        filter.process_in_place(&mut samples);
        assert_eq!(samples, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn reset_makes_processing_repeatable() {
        let mut filter = CascadedBiQuadFilter::new(&[lowpass(), lowpass()]);
        let input = [1.0, 1.0, 1.0, 1.0];

        let mut first = input;
        filter.process_in_place(&mut first);
        filter.reset();
        let mut second = input;
        filter.process_in_place(&mut second);

        for (a, b) in first.iter().zip(second.iter()) {
            assert!((a - b).abs() < 1e-6, "{a} != {b}");
        }
    }

    #[test]
    fn cascading_applies_sections_in_series() {
        let mut one = CascadedBiQuadFilter::new(&[lowpass()]);
        let mut two = CascadedBiQuadFilter::new(&[lowpass(), lowpass()]);

        let mut a = [1.0, 0.0, 0.0, 0.0];
        one.process_in_place(&mut a);
        // Run the single-section output through a fresh section by hand.
        let mut expected = a;
        CascadedBiQuadFilter::new(&[lowpass()]).process_in_place(&mut expected);

        let mut b = [1.0, 0.0, 0.0, 0.0];
        two.process_in_place(&mut b);

        for (x, y) in expected.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-6, "{x} != {y}");
        }
    }
}
