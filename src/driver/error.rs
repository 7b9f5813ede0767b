//! Error types for the driver layer.

use thiserror::Error;

/// Error type for binding to the driver library.
///
/// Load failures and missing entry points are separate variants so callers
/// can tell "driver not installed next to the executable" apart from
/// "library present but too old for this entry point".
#[derive(Debug, Error)]
pub enum BindError {
    /// The library itself could not be loaded.
    #[error("Failed to load '{path}': {source}")]
    LibraryLoad {
        /// Path or file name that was passed to the loader.
        path: String,
        /// Underlying loader error.
        #[source]
        source: libloading::Error,
    },

    /// The library loaded, but does not export the requested symbol.
    #[error("Symbol '{symbol}' not found in '{library}'")]
    SymbolNotFound {
        /// Library the lookup ran against.
        library: String,
        /// Requested export name.
        symbol: String,
        /// Underlying loader error, absent when the export resolved to null.
        #[source]
        source: Option<libloading::Error>,
    },
}

/// Error type for calls into the driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The entry point could not be bound.
    #[error(transparent)]
    Binding(#[from] BindError),

    /// The driver reported failure through its return sentinel.
    #[error("{operation} failed: {source}")]
    Native {
        /// Entry point that failed.
        operation: &'static str,
        /// The OS error captured right after the call.
        #[source]
        source: std::io::Error,
    },

    /// A string argument cannot be passed as a wide C string.
    #[error("Invalid argument '{value}': contains an interior NUL character")]
    InteriorNul {
        /// The rejected argument.
        value: String,
    },

    /// A Windows API call outside the driver failed.
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApi(#[from] windows::core::Error),
}

impl DriverError {
    /// Creates a `Native` error from the calling thread's last OS error.
    #[must_use]
    pub fn last_os_error(operation: &'static str) -> Self {
        Self::Native {
            operation,
            source: std::io::Error::last_os_error(),
        }
    }

    /// Returns the raw OS error code for native failures.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::Native { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}
