//! Destinations for driver log lines.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use super::LogLevel;

/// Target under which [`TracingSink`] emits driver events.
pub const TRACING_TARGET: &str = "wintun";

/// Destination for driver log lines.
///
/// Sinks are called from threads owned by the driver. Implementations must
/// not block for long and should swallow their own I/O errors.
pub trait LogSink: Send + Sync {
    /// Writes a plain line.
    fn write_line(&self, level: LogLevel, line: &str);

    /// Returns true if the sink wants the event timestamp.
    ///
    /// When true, [`write_timestamped`](Self::write_timestamped) is called
    /// instead of [`write_line`](Self::write_line).
    fn supports_timestamps(&self) -> bool {
        false
    }

    /// Writes a line together with its timestamp in Unix nanoseconds.
    fn write_timestamped(&self, level: LogLevel, line: &str, unix_nanos: i64) {
        let _ = unix_nanos;
        self.write_line(level, line);
    }
}

/// Forwards driver lines to `tracing` under the `wintun` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write_line(&self, level: LogLevel, line: &str) {
        match level {
            LogLevel::Info => tracing::info!(target: TRACING_TARGET, "{line}"),
            LogLevel::Warn => tracing::warn!(target: TRACING_TARGET, "{line}"),
            LogLevel::Error => tracing::error!(target: TRACING_TARGET, "{line}"),
        }
    }

    fn supports_timestamps(&self) -> bool {
        true
    }

    fn write_timestamped(&self, level: LogLevel, line: &str, unix_nanos: i64) {
        match level {
            LogLevel::Info => tracing::info!(target: TRACING_TARGET, unix_nanos, "{line}"),
            LogLevel::Warn => tracing::warn!(target: TRACING_TARGET, unix_nanos, "{line}"),
            LogLevel::Error => tracing::error!(target: TRACING_TARGET, unix_nanos, "{line}"),
        }
    }
}

/// Writes plain lines to any writer.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    /// Wraps `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn write_line(&self, _level: LogLevel, line: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(writer, "{line}");
    }
}

/// Drops every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl LogSink for DiscardSink {
    fn write_line(&self, _level: LogLevel, _line: &str) {}
}
