//! Binding to the Wintun driver library.
//!
//! This module provides:
//! - The lazily loaded library and per-symbol resolution ([`DriverLibrary`])
//! - The driver seam used by adapter operations ([`Driver`])
//! - The production implementation over the library ([`NativeDriver`])
//! - The process-wide binding for `wintun.dll` ([`WINTUN`])
//!
//! # Lifecycle
//!
//! Library bindings are process-wide and never torn down. The first
//! successful load of [`WINTUN`] installs the driver log callback
//! (see [`crate::logger`]) before the triggering call proceeds.

mod error;
mod library;
mod native;
mod version;
pub mod wide;


use std::collections::BTreeMap;
use std::ffi::c_void;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

pub use error::{BindError, DriverError};
pub use library::{DriverLibrary, LoadHook, Proc};
pub use native::NativeDriver;
pub use version::DriverVersion;

use crate::guid::Guid;

/// Default file name of the driver library.
pub const WINTUN_DLL: &str = "wintun.dll";

/// Export names of the driver library.
pub mod symbol {
    /// Creates a new adapter.
    pub const CREATE_ADAPTER: &str = "WintunCreateAdapter";
    /// Opens an existing adapter by name.
    pub const OPEN_ADAPTER: &str = "WintunOpenAdapter";
    /// Releases an adapter handle.
    pub const CLOSE_ADAPTER: &str = "WintunCloseAdapter";
    /// Removes the driver package from the system.
    pub const DELETE_DRIVER: &str = "WintunDeleteDriver";
    /// Queries the LUID of an adapter.
    pub const GET_ADAPTER_LUID: &str = "WintunGetAdapterLUID";
    /// Queries the version of the loaded driver.
    pub const GET_RUNNING_DRIVER_VERSION: &str = "WintunGetRunningDriverVersion";
    /// Registers the log callback.
    pub const SET_LOGGER: &str = "WintunSetLogger";
}

/// Process-wide binding for [`WINTUN_DLL`].
pub static WINTUN: DriverLibrary = DriverLibrary::new(WINTUN_DLL, Some(crate::logger::install));

/// Bindings for non-default library paths, leaked on first use.
static CUSTOM_LIBRARIES: Mutex<BTreeMap<String, &'static DriverLibrary>> =
    Mutex::new(BTreeMap::new());

/// Returns the process-wide binding for `path`.
///
/// [`WINTUN_DLL`] maps to [`WINTUN`]; any other path gets its own binding,
/// created once and reused for every later call with the same path. Each
/// binding installs the driver log callback on its first load.
pub fn library_for(path: &str) -> &'static DriverLibrary {
    if path == WINTUN_DLL {
        return &WINTUN;
    }

    let mut libraries = CUSTOM_LIBRARIES
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    libraries.entry(path.to_string()).or_insert_with(|| {
        let path: &'static str = Box::leak(path.to_string().into_boxed_str());
        Box::leak(Box::new(DriverLibrary::new(
            path,
            Some(crate::logger::install),
        )))
    })
}

/// Adapter handle returned by the driver. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(NonZeroUsize);

impl RawHandle {
    /// Wraps a raw handle value; zero (the failure sentinel) yields `None`.
    #[must_use]
    pub const fn new(raw: usize) -> Option<Self> {
        match NonZeroUsize::new(raw) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Returns the handle value.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// Returns the handle as the pointer type the driver expects.
    #[must_use]
    pub const fn as_ptr(self) -> *mut c_void {
        self.0.get() as *mut c_void
    }
}

/// Operations the driver library exposes.
///
/// [`NativeDriver`] is the production implementation. The trait exists so
/// the adapter lifecycle can run against other implementations, for
/// example an in-memory driver in tests.
///
/// # Contract
///
/// - `create_adapter` / `open_adapter` return a handle the caller owns
/// - `close_adapter` is called at most once per handle
/// - Failures carry the native error detail; nothing is retried
pub trait Driver: Send + Sync {
    /// Creates an adapter named `name` with the given tunnel type.
    ///
    /// `requested_guid` pins the adapter GUID (and with it the network
    /// location profile); `None` lets the system pick one at random.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] if the entry point is unavailable or the
    /// driver refuses the request.
    fn create_adapter(
        &self,
        name: &str,
        tunnel_type: &str,
        requested_guid: Option<&Guid>,
    ) -> Result<RawHandle, DriverError>;

    /// Opens an existing adapter by name.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] if the entry point is unavailable or no such
    /// adapter exists.
    fn open_adapter(&self, name: &str) -> Result<RawHandle, DriverError>;

    /// Releases `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] only if the entry point is unavailable.
    fn close_adapter(&self, handle: RawHandle) -> Result<(), DriverError>;

    /// Returns the LUID of the adapter, or zero if it cannot be queried.
    fn adapter_luid(&self, handle: RawHandle) -> u64;

    /// Removes the driver from the system.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] if the entry point is unavailable or any
    /// adapter is still in use anywhere on the system.
    fn delete_driver(&self) -> Result<(), DriverError>;

    /// Returns the version of the loaded driver.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] if the entry point is unavailable or no
    /// driver is loaded.
    fn running_driver_version(&self) -> Result<DriverVersion, DriverError>;
}
