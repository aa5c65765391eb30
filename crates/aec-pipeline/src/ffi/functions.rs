//! The exported `extern "C"` functions.

use std::slice;

use crate::config::SessionConfig;
use crate::session::{LINEAR_OUTPUT_SAMPLES, Session};

use super::panic_guard::{ffi_guard, ffi_guard_ptr};
use super::types::{AecConfig, AecError, AecSession};

/// Returns a pointer to a static null-terminated version string.
///
/// The returned pointer is valid for the lifetime of the process.
#[unsafe(no_mangle)]
pub extern "C" fn aec_version() -> *const std::ffi::c_char {
    c"0.1.0".as_ptr()
}

/// Returns a default-initialized configuration.
#[unsafe(no_mangle)]
pub extern "C" fn aec_config_default() -> AecConfig {
    AecConfig::from_rust(&SessionConfig::default())
}

/// Creates a new echo cancellation session.
///
/// Returns `NULL` if the configuration is invalid, or on allocation
/// failure or internal error. The caller owns the returned pointer and
/// must free it with [`aec_destroy()`].
#[unsafe(no_mangle)]
pub extern "C" fn aec_create(config: AecConfig) -> *mut AecSession {
    ffi_guard_ptr! {
        match Session::new(config.to_rust()) {
            Ok(session) => Box::into_raw(Box::new(AecSession { inner: session })),
            Err(err) => {
                tracing::error!(%err, "session creation rejected");
                std::ptr::null_mut()
            }
        }
    }
}

/// Processes one 10 ms frame through the session.
///
/// `frame_size` is the number of samples **per channel** and must equal the
/// session's sample rate divided by 100. `reference`, `capture` and
/// `output` each point at `frame_size * num_channels` interleaved 16-bit
/// samples. `linear_output` may be `NULL`; when non-null it points at 160
/// samples (320 bytes) that receive the mono 16 kHz linear output of
/// sessions created with export enabled. `delay` is this call's
/// reference-to-capture buffering delay in samples.
///
/// On any error no output buffer is written.
#[unsafe(no_mangle)]
pub extern "C" fn aec_process_frame(
    session: *mut AecSession,
    reference: *const i16,
    capture: *const i16,
    output: *mut i16,
    linear_output: *mut i16,
    frame_size: usize,
    delay: i32,
) -> AecError {
    ffi_guard! {
        if session.is_null() || reference.is_null() || capture.is_null() || output.is_null() {
            return AecError::NullPointer;
        }
        if delay < 0 {
            return AecError::BadDelay;
        }
        // Safety: the caller guarantees the handle came from aec_create and
        // is not aliased, and that the sample pointers are valid for
        // frame_size * num_channels (resp. 160) samples.
        let session = unsafe { &mut (*session).inner };
        let samples = frame_size * session.num_channels();
        let reference = unsafe { slice::from_raw_parts(reference, samples) };
        let capture = unsafe { slice::from_raw_parts(capture, samples) };
        let output = unsafe { slice::from_raw_parts_mut(output, samples) };
        let linear_output = if linear_output.is_null() {
            None
        } else {
            Some(unsafe { slice::from_raw_parts_mut(linear_output, LINEAR_OUTPUT_SAMPLES) })
        };

        match session.process_frame(reference, capture, delay as usize, output, linear_output) {
            Ok(()) => AecError::None,
            Err(err) => err.into(),
        }
    }
}

/// Destroys a session and frees its memory.
///
/// Passing `NULL` is a safe no-op. After this call the pointer is invalid.
#[unsafe(no_mangle)]
pub extern "C" fn aec_destroy(session: *mut AecSession) {
    if !session.is_null() {
        // Safety: we created this pointer via Box::into_raw in aec_create,
        // and the caller guarantees single ownership.
        let _ = unsafe { Box::from_raw(session) };
    }
}
