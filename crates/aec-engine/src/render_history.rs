//! Ring buffer of recent render frames.

/// History of the mono-downmixed render signal, stored as a contiguous ring
/// of 10 ms frames.
///
/// The canceller aligns capture against this history with a delay expressed
/// in samples: a delay of `d` selects the window that ends `d` samples
/// before the most recently pushed sample.
pub struct RenderHistory {
    samples: Vec<f32>,
    frame_len: usize,
    /// Index of the slot the next frame will be written to.
    next_frame: usize,
    /// Total samples pushed since construction, saturating at capacity.
    filled: usize,
}

impl RenderHistory {
    pub fn new(frame_len: usize, capacity_frames: usize) -> Self {
        assert!(frame_len > 0);
        assert!(capacity_frames > 0);
        Self {
            samples: vec![0.0; frame_len * capacity_frames],
            frame_len,
            next_frame: 0,
            filled: 0,
        }
    }

    /// Number of samples the history can hold.
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn push_frame(&mut self, frame: &[f32]) {
        assert_eq!(frame.len(), self.frame_len);
        let start = self.next_frame * self.frame_len;
        self.samples[start..start + self.frame_len].copy_from_slice(frame);
        self.next_frame = (self.next_frame + 1) % (self.samples.len() / self.frame_len);
        self.filled = (self.filled + self.frame_len).min(self.samples.len());
    }

    /// Copies the window of `out.len()` samples ending `delay` samples
    /// before the newest pushed sample into `out`, oldest first.
    ///
    /// Positions that fall outside the recorded history read as zero.
    pub fn segment(&self, delay: usize, out: &mut [f32]) {
        let window = out.len();
        let newest_end = self.next_frame * self.frame_len;
        for (i, slot) in out.iter_mut().enumerate() {
            // Offset back from the write position; the oldest requested
            // sample sits delay + window samples behind it.
            let back = delay + window - i;
            if back > self.filled {
                *slot = 0.0;
                continue;
            }
            let idx = (newest_end + self.samples.len() - back) % self.samples.len();
            *slot = self.samples[idx];
        }
    }

    pub fn reset(&mut self) {
        self.samples.fill(0.0);
        self.next_frame = 0;
        self.filled = 0;
    }
}
