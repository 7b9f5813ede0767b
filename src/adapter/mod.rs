//! Adapter handle lifecycle.
//!
//! This module provides:
//! - The entry object for driver operations ([`Wintun`])
//! - Owned adapter handles with guaranteed release ([`Adapter`])
//! - Interface identifiers ([`Luid`])
//!
//! # Ownership
//!
//! An [`Adapter`] owns its native handle. [`Adapter::close`] consumes the
//! adapter, so a closed handle cannot be used again. If an adapter is
//! dropped without being closed, `Drop` performs the same release as a
//! safety net; prefer `close` where release timing matters.

mod error;
mod luid;

#[cfg(test)]
pub(crate) mod test_fixtures;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

pub use error::AdapterError;
pub use luid::Luid;

use crate::driver::{self, Driver, DriverVersion, NativeDriver, RawHandle};
use crate::guid::Guid;

/// Maximum adapter name length, in UTF-16 units, enforced by the driver.
pub const ADAPTER_NAME_MAX: usize = 128;

/// Entry point for driver operations.
///
/// # Example
///
/// ```no_run
/// use wintun_ctl::adapter::Wintun;
/// use wintun_ctl::guid::Guid;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let wintun = Wintun::new();
/// let guid = Guid::from_name("Office VPN");
/// let adapter = wintun.create_adapter("Office VPN", "Wintun", Some(&guid))?;
/// println!("LUID {}", adapter.luid());
/// adapter.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Wintun {
    driver: Arc<dyn Driver>,
}

impl fmt::Debug for Wintun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wintun").finish_non_exhaustive()
    }
}

impl Default for Wintun {
    fn default() -> Self {
        Self::new()
    }
}

impl Wintun {
    /// Uses `wintun.dll` through the process-wide binding.
    #[must_use]
    pub fn new() -> Self {
        Self::with_driver(Arc::new(NativeDriver::new(&driver::WINTUN)))
    }

    /// Uses the driver library at `path`.
    #[must_use]
    pub fn with_library(path: &str) -> Self {
        Self::with_driver(Arc::new(NativeDriver::new(driver::library_for(path))))
    }

    /// Uses an arbitrary [`Driver`] implementation.
    #[must_use]
    pub fn with_driver(driver: Arc<dyn Driver>) -> Self {
        Self { driver }
    }

    /// Creates a new adapter.
    ///
    /// `name` is the cosmetic name, `tunnel_type` the adapter type (usually
    /// `"Wintun"`). `requested_guid` pins the adapter GUID, which makes the
    /// network location profile stable across re-creations; with `None`
    /// the system picks a random GUID and a new profile is created every
    /// time. See [`Guid::from_name`].
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Create`] with the native error detail.
    pub fn create_adapter(
        &self,
        name: &str,
        tunnel_type: &str,
        requested_guid: Option<&Guid>,
    ) -> Result<Adapter, AdapterError> {
        let handle = self
            .driver
            .create_adapter(name, tunnel_type, requested_guid)
            .map_err(|source| AdapterError::Create {
                name: name.to_string(),
                source,
            })?;

        debug!(name, tunnel_type, handle = handle.get(), "Created adapter");
        Ok(Adapter::new(name, handle, Arc::clone(&self.driver)))
    }

    /// Opens an existing adapter by name.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Open`] with the native error detail.
    pub fn open_adapter(&self, name: &str) -> Result<Adapter, AdapterError> {
        let handle = self
            .driver
            .open_adapter(name)
            .map_err(|source| AdapterError::Open {
                name: name.to_string(),
                source,
            })?;

        debug!(name, handle = handle.get(), "Opened adapter");
        Ok(Adapter::new(name, handle, Arc::clone(&self.driver)))
    }

    /// Removes the driver from the system.
    ///
    /// Fails while any adapter is in use anywhere on the system, not just
    /// in this process.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Uninstall`] with the native error detail.
    pub fn uninstall(&self) -> Result<(), AdapterError> {
        self.driver.delete_driver().map_err(AdapterError::Uninstall)
    }

    /// Returns the version of the currently loaded driver.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Version`] if no driver is loaded.
    pub fn running_version(&self) -> Result<DriverVersion, AdapterError> {
        self.driver
            .running_driver_version()
            .map_err(AdapterError::Version)
    }
}

/// An open adapter handle.
///
/// Created by [`Wintun::create_adapter`] or [`Wintun::open_adapter`];
/// released by [`close`](Self::close) or, failing that, on drop.
pub struct Adapter {
    name: String,
    handle: RawHandle,
    /// True until the handle has been handed back to the driver.
    armed: bool,
    driver: Arc<dyn Driver>,
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter")
            .field("name", &self.name)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Adapter {
    fn new(name: &str, handle: RawHandle, driver: Arc<dyn Driver>) -> Self {
        Self {
            name: name.to_string(),
            handle,
            armed: true,
            driver,
        }
    }

    /// Returns the name the adapter was created or opened with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the native handle.
    #[must_use]
    pub const fn raw_handle(&self) -> RawHandle {
        self.handle
    }

    /// Returns the adapter's LUID; zero if the driver cannot report it.
    #[must_use]
    pub fn luid(&self) -> Luid {
        Luid::new(self.driver.adapter_luid(self.handle))
    }

    /// Releases the handle.
    ///
    /// The drop safety net is disarmed first, so the handle is never
    /// released twice even if this call fails.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Close`] if the close entry point cannot be
    /// bound.
    pub fn close(mut self) -> Result<(), AdapterError> {
        self.armed = false;
        self.driver
            .close_adapter(self.handle)
            .map_err(|source| AdapterError::Close {
                name: std::mem::take(&mut self.name),
                source,
            })
    }
}

impl Drop for Adapter {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;

        debug!(name = %self.name, handle = self.handle.get(), "Adapter dropped without close, releasing");
        if let Err(e) = self.driver.close_adapter(self.handle) {
            warn!(name = %self.name, "Failed to release adapter on drop: {e}");
        }
    }
}
