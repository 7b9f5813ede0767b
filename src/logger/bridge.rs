//! Native log callback trampolines.
//!
//! The driver calls `void CALLBACK logger(level, DWORD64 timestamp, LPCWSTR)`.
//! How the 64-bit timestamp lands in registers and stack slots depends on
//! the architecture, so each [`CallbackShape`] has its own trampoline with
//! an explicit argument list matching that layout.

use std::ffi::c_void;
use std::panic::{AssertUnwindSafe, catch_unwind};

use super::{LogEvent, LogLevel, LogSink, current_prefix, current_sink, forward};
use crate::driver::wide::from_wide_ptr;

/// Argument layout of the native log callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackShape {
    /// 32-bit x86: the timestamp occupies two consecutive stack slots.
    SplitTimestamp,
    /// 32-bit ARM: 64-bit arguments are 8-byte aligned, so a padding
    /// register precedes the two timestamp halves.
    PaddedSplitTimestamp,
    /// 64-bit targets: the timestamp fits in one register.
    WideTimestamp,
}

impl CallbackShape {
    /// Returns the shape for the architecture this crate was built for.
    #[must_use]
    pub const fn for_target() -> Self {
        if cfg!(target_arch = "x86") {
            Self::SplitTimestamp
        } else if cfg!(target_arch = "arm") {
            Self::PaddedSplitTimestamp
        } else {
            Self::WideTimestamp
        }
    }

    /// Returns the address of the trampoline implementing this shape.
    #[must_use]
    pub fn trampoline(self) -> *const c_void {
        match self {
            Self::SplitTimestamp => split_timestamp_trampoline as *const c_void,
            Self::PaddedSplitTimestamp => padded_split_timestamp_trampoline as *const c_void,
            Self::WideTimestamp => wide_timestamp_trampoline as *const c_void,
        }
    }
}

/// Trampoline for [`CallbackShape::SplitTimestamp`].
///
/// # Safety
///
/// `message` must be null or a NUL-terminated UTF-16 string.
pub unsafe extern "system" fn split_timestamp_trampoline(
    level: i32,
    timestamp_low: u32,
    timestamp_high: u32,
    message: *const u16,
) {
    // SAFETY: forwarded to the caller.
    unsafe {
        dispatch(
            level,
            LogEvent::join_timestamp(timestamp_low, timestamp_high),
            message,
        );
    }
}

/// Trampoline for [`CallbackShape::PaddedSplitTimestamp`].
///
/// # Safety
///
/// `message` must be null or a NUL-terminated UTF-16 string.
pub unsafe extern "system" fn padded_split_timestamp_trampoline(
    level: i32,
    _padding: u32,
    timestamp_low: u32,
    timestamp_high: u32,
    message: *const u16,
) {
    // SAFETY: forwarded to the caller.
    unsafe {
        dispatch(
            level,
            LogEvent::join_timestamp(timestamp_low, timestamp_high),
            message,
        );
    }
}

/// Trampoline for [`CallbackShape::WideTimestamp`].
///
/// # Safety
///
/// `message` must be null or a NUL-terminated UTF-16 string.
pub unsafe extern "system" fn wide_timestamp_trampoline(
    level: i32,
    timestamp: u64,
    message: *const u16,
) {
    // SAFETY: forwarded to the caller.
    unsafe { dispatch(level, timestamp, message) };
}

/// Builds the event and hands it to the installed sink.
///
/// # Safety
///
/// `message` must be null or a NUL-terminated UTF-16 string.
unsafe fn dispatch(level: i32, timestamp: u64, message: *const u16) {
    // SAFETY: forwarded to the caller.
    let message = unsafe { from_wide_ptr(message) };
    let event = LogEvent::new(LogLevel::from_native(level), timestamp, message);

    let Some(sink) = current_sink() else {
        return;
    };
    deliver(&event, &current_prefix(), sink.as_ref());
}

/// Forwards `event` to `sink`, containing any panic inside the sink.
///
/// Unwinding out of an `extern "system"` function aborts the process, and
/// the driver thread has no way to handle a Rust panic anyway.
pub(crate) fn deliver(event: &LogEvent, prefix: &str, sink: &dyn LogSink) {
    let _ = catch_unwind(AssertUnwindSafe(|| forward(event, prefix, sink)));
}
