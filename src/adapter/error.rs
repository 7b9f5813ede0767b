//! Error types for adapter operations.

use thiserror::Error;

use crate::driver::DriverError;

/// Error type for adapter and driver-management operations.
///
/// Each variant names the operation and keeps the [`DriverError`] with the
/// native detail as its source. Nothing is retried.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Creating an adapter failed.
    #[error("Failed to create adapter '{name}': {source}")]
    Create {
        /// Requested adapter name.
        name: String,
        /// Underlying driver error.
        #[source]
        source: DriverError,
    },

    /// Opening an existing adapter failed.
    #[error("Failed to open adapter '{name}': {source}")]
    Open {
        /// Requested adapter name.
        name: String,
        /// Underlying driver error.
        #[source]
        source: DriverError,
    },

    /// Releasing an adapter handle failed.
    #[error("Failed to close adapter '{name}': {source}")]
    Close {
        /// Adapter name.
        name: String,
        /// Underlying driver error.
        #[source]
        source: DriverError,
    },

    /// Removing the driver failed, typically because adapters are in use.
    #[error("Failed to uninstall driver: {0}")]
    Uninstall(#[source] DriverError),

    /// Querying the running driver version failed.
    #[error("Failed to query driver version: {0}")]
    Version(#[source] DriverError),
}

impl AdapterError {
    /// Returns the underlying driver error.
    #[must_use]
    pub const fn driver_error(&self) -> &DriverError {
        match self {
            Self::Create { source, .. } | Self::Open { source, .. } | Self::Close { source, .. } => {
                source
            }
            Self::Uninstall(source) | Self::Version(source) => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn native(code: i32) -> DriverError {
        DriverError::Native {
            operation: "WintunOpenAdapter",
            source: std::io::Error::from_raw_os_error(code),
        }
    }

    #[test]
    fn open_error_names_adapter() {
        let error = AdapterError::Open {
            name: "TestAdapter".to_string(),
            source: native(2),
        };

        assert!(error.to_string().starts_with("Failed to open adapter 'TestAdapter'"));
    }

    #[test]
    fn source_chain_reaches_driver_error() {
        let error = AdapterError::Version(native(2));

        let source = error.source().unwrap();
        assert!(source.to_string().contains("WintunOpenAdapter failed"));
    }

    #[test]
    fn driver_error_exposes_os_code() {
        let error = AdapterError::Uninstall(native(5));
        assert_eq!(error.driver_error().raw_os_error(), Some(5));
    }
}
