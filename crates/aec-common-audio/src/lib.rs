//! Shared audio primitives for the AEC pipeline.

pub mod audio_util;
pub mod cascaded_biquad_filter;
pub mod channel_buffer;
