//! Driver log bridge.
//!
//! The driver reports diagnostics through a single process-wide callback.
//! This module provides:
//! - Normalized events ([`LogEvent`], [`LogLevel`])
//! - Pluggable destinations ([`LogSink`], [`TracingSink`], [`WriterSink`])
//! - Per-architecture callback trampolines ([`CallbackShape`])
//! - The post-load hook registering the callback ([`install`])
//!
//! # Threading
//!
//! The callback runs on threads owned by the driver. It only reads the
//! installed sink and prefix, never touches the library load path, and
//! never lets a failure escape back into the driver.

mod bridge;
mod event;
mod sink;


use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

pub use bridge::{
    CallbackShape, padded_split_timestamp_trampoline, split_timestamp_trampoline,
    wide_timestamp_trampoline,
};
pub use event::{FILETIME_TICK_NANOS, FILETIME_UNIX_EPOCH_OFFSET, LogEvent, LogLevel};
pub use sink::{DiscardSink, LogSink, TRACING_TARGET, TracingSink, WriterSink};

use crate::driver::{DriverLibrary, symbol};

type SetLoggerFn = unsafe extern "system" fn(callback: *const std::ffi::c_void);

/// Installed sink; `None` means [`TracingSink`].
static SINK: RwLock<Option<Arc<dyn LogSink>>> = RwLock::new(None);

/// Text prepended to every driver line.
static PREFIX: RwLock<String> = RwLock::new(String::new());

/// Replaces the process-wide sink for driver log lines.
pub fn set_sink(sink: Arc<dyn LogSink>) {
    *SINK.write().unwrap_or_else(PoisonError::into_inner) = Some(sink);
}

/// Sets the text prepended to every driver log line.
pub fn set_prefix(prefix: impl Into<String>) {
    *PREFIX.write().unwrap_or_else(PoisonError::into_inner) = prefix.into();
}

/// Returns the installed sink, or `None` if its lock is poisoned.
fn current_sink() -> Option<Arc<dyn LogSink>> {
    let guard = SINK.read().ok()?;
    Some(guard.clone().unwrap_or_else(|| Arc::new(TracingSink)))
}

fn current_prefix() -> String {
    PREFIX
        .read()
        .map(|prefix| prefix.clone())
        .unwrap_or_default()
}

/// Formats `event` and writes it to `sink`.
///
/// Sinks that support timestamps receive [`LogEvent::unix_nanos`]; others
/// get the plain line.
pub fn forward(event: &LogEvent, prefix: &str, sink: &dyn LogSink) {
    let line = format!("{prefix}{}", event.message);
    if sink.supports_timestamps() {
        sink.write_timestamped(event.level, &line, event.unix_nanos());
    } else {
        sink.write_line(event.level, &line);
    }
}

/// Registers the trampoline for this architecture with `library`.
///
/// Used as the post-load hook of driver bindings, so `library` is already
/// loaded. Failure is logged and otherwise ignored: adapters still work
/// without driver logs.
pub fn install(library: &DriverLibrary) {
    let shape = CallbackShape::for_target();

    match library.resolve(symbol::SET_LOGGER) {
        Ok(proc) => {
            // SAFETY: signature matches `WintunSetLogger` in wintun.h.
            let set_logger: SetLoggerFn = unsafe { proc.cast() };
            // SAFETY: the trampoline matches the callback layout for this
            // architecture and lives for the whole process.
            unsafe { set_logger(shape.trampoline()) };
            debug!(?shape, library = library.path(), "Installed driver log callback");
        }
        Err(e) => warn!("Driver log callback not installed: {e}"),
    }
}
