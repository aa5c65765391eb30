//! C ABI for driving sessions from non-Rust callers.
//!
//! A [`Session`](crate::Session) crosses the boundary as the opaque
//! [`AecSession`](types::AecSession) handle returned by `aec_create` and
//! released by `aec_destroy`. Exported functions carry the `aec_` prefix,
//! the `#[repr(C)]` types the `Aec` prefix.
//!
//! Handles carry no synchronization: calls touching the same handle must
//! be serialized by the caller.

pub mod types;

pub mod functions;
mod panic_guard;
