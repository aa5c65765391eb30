//! Engine tuning parameters.

/// Configuration for [`SubbandCanceller`](crate::SubbandCanceller).
#[derive(Debug, Clone, Copy)]
pub struct CancellerConfig {
    /// NLMS step size per adaptation, in (0, 1].
    pub step_size: f32,
    /// Added to the mean render power in the NLMS denominator.
    pub regularization: f32,
    /// Capacity of the render history, in 10 ms frames.
    pub render_history_frames: usize,
}

impl Default for CancellerConfig {
    fn default() -> Self {
        Self {
            step_size: 0.25,
            regularization: 1e-3,
            render_history_frames: 100,
        }
    }
}
