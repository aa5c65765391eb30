//! Keeps panics from unwinding across `extern "C"`.
//!
//! Unwinding out of an `extern "C"` function is undefined behaviour, so
//! each exported function runs its body inside one of these macros and a
//! panic becomes an error value the C caller can inspect instead.

/// Guards a body that yields an [`AecError`](super::types::AecError);
/// a panic yields `AecError::Internal`.
macro_rules! ffi_guard {
    ($($body:tt)*) => {{
        use std::panic;
        use std::panic::AssertUnwindSafe;

        match panic::catch_unwind(AssertUnwindSafe(move || { $($body)* })) {
            Ok(result) => result,
            Err(_) => $crate::ffi::types::AecError::Internal,
        }
    }};
}

/// Guards a body that yields a raw pointer; a panic yields null.
macro_rules! ffi_guard_ptr {
    ($($body:tt)*) => {{
        use std::panic;
        use std::panic::AssertUnwindSafe;
        use std::ptr;

        match panic::catch_unwind(AssertUnwindSafe(move || { $($body)* })) {
            Ok(result) => result,
            Err(_) => ptr::null_mut(),
        }
    }};
}

pub(crate) use ffi_guard;
pub(crate) use ffi_guard_ptr;
