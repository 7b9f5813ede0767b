//! Normalized driver log events.

use std::fmt;

/// 100 ns ticks between the FILETIME epoch (1601-01-01) and the Unix epoch.
pub const FILETIME_UNIX_EPOCH_OFFSET: i64 = 116_444_736_000_000_000;

/// Nanoseconds per FILETIME tick.
pub const FILETIME_TICK_NANOS: i64 = 100;

/// Severity of a driver log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Informational message.
    Info,
    /// Warning.
    Warn,
    /// Error.
    Error,
}

impl LogLevel {
    /// Maps the driver's `WINTUN_LOGGER_LEVEL` value.
    ///
    /// Values the driver does not define are treated as errors, so they
    /// are never filtered out.
    #[must_use]
    pub const fn from_native(raw: i32) -> Self {
        match raw {
            0 => Self::Info,
            1 => Self::Warn,
            _ => Self::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A log event emitted by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Severity.
    pub level: LogLevel,
    /// FILETIME timestamp: 100 ns ticks since 1601-01-01 UTC.
    pub timestamp: u64,
    /// Message text.
    pub message: String,
}

impl LogEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(level: LogLevel, timestamp: u64, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp,
            message: message.into(),
        }
    }

    /// Joins a timestamp that arrived as two 32-bit halves.
    #[must_use]
    pub const fn join_timestamp(low: u32, high: u32) -> u64 {
        ((high as u64) << 32) | low as u64
    }

    /// Returns the timestamp as nanoseconds since the Unix epoch.
    ///
    /// Timestamps outside the representable range wrap rather than panic,
    /// since this runs on the driver's callback thread.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)] // FILETIME values fit in i64 until the year 30828
    pub const fn unix_nanos(&self) -> i64 {
        (self.timestamp as i64)
            .wrapping_sub(FILETIME_UNIX_EPOCH_OFFSET)
            .wrapping_mul(FILETIME_TICK_NANOS)
    }
}
