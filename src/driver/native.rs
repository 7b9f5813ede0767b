//! [`Driver`] implementation calling the driver library's exports.

use std::ffi::c_void;

use tracing::{debug, warn};

use super::wide::to_wide;
use super::{Driver, DriverError, DriverLibrary, DriverVersion, RawHandle, symbol};
use crate::guid::Guid;

type CreateAdapterFn =
    unsafe extern "system" fn(name: *const u16, tunnel_type: *const u16, guid: *const Guid) -> *mut c_void;
type OpenAdapterFn = unsafe extern "system" fn(name: *const u16) -> *mut c_void;
type CloseAdapterFn = unsafe extern "system" fn(adapter: *mut c_void);
type DeleteDriverFn = unsafe extern "system" fn() -> i32;
type GetAdapterLuidFn = unsafe extern "system" fn(adapter: *mut c_void, luid: *mut u64);
type GetRunningDriverVersionFn = unsafe extern "system" fn() -> u32;

/// Driver backed by a [`DriverLibrary`].
///
/// Every call resolves its entry point first, so a library that lacks one
/// export still serves the others.
#[derive(Debug, Clone, Copy)]
pub struct NativeDriver {
    library: &'static DriverLibrary,
}

impl NativeDriver {
    /// Creates a driver over `library`.
    #[must_use]
    pub const fn new(library: &'static DriverLibrary) -> Self {
        Self { library }
    }

    /// Returns the underlying library binding.
    #[must_use]
    pub const fn library(&self) -> &'static DriverLibrary {
        self.library
    }

    /// Resolves `name` as an entry point of type `F`.
    ///
    /// # Safety
    ///
    /// `F` must match the export's native signature.
    unsafe fn entry<F: Copy>(&self, name: &'static str) -> Result<F, DriverError> {
        let proc = self.library.resolve(name)?;
        // SAFETY: forwarded to the caller.
        Ok(unsafe { proc.cast::<F>() })
    }
}

impl Driver for NativeDriver {
    fn create_adapter(
        &self,
        name: &str,
        tunnel_type: &str,
        requested_guid: Option<&Guid>,
    ) -> Result<RawHandle, DriverError> {
        let name16 = to_wide(name)?;
        let tunnel_type16 = to_wide(tunnel_type)?;
        // SAFETY: signature matches `WintunCreateAdapter` in wintun.h.
        let create = unsafe { self.entry::<CreateAdapterFn>(symbol::CREATE_ADAPTER)? };

        let guid_ptr = requested_guid.map_or(std::ptr::null(), std::ptr::from_ref);
        // SAFETY: both strings are NUL-terminated and outlive the call; the
        // GUID pointer is null or points to a live `repr(C)` GUID.
        let raw = unsafe { create(name16.as_ptr(), tunnel_type16.as_ptr(), guid_ptr) };

        RawHandle::new(raw as usize).ok_or_else(|| DriverError::last_os_error(symbol::CREATE_ADAPTER))
    }

    fn open_adapter(&self, name: &str) -> Result<RawHandle, DriverError> {
        let name16 = to_wide(name)?;
        // SAFETY: signature matches `WintunOpenAdapter` in wintun.h.
        let open = unsafe { self.entry::<OpenAdapterFn>(symbol::OPEN_ADAPTER)? };

        // SAFETY: `name16` is NUL-terminated and outlives the call.
        let raw = unsafe { open(name16.as_ptr()) };

        RawHandle::new(raw as usize).ok_or_else(|| DriverError::last_os_error(symbol::OPEN_ADAPTER))
    }

    fn close_adapter(&self, handle: RawHandle) -> Result<(), DriverError> {
        // SAFETY: signature matches `WintunCloseAdapter` in wintun.h.
        let close = unsafe { self.entry::<CloseAdapterFn>(symbol::CLOSE_ADAPTER)? };

        // SAFETY: the handle came from create/open and the caller releases
        // it at most once.
        unsafe { close(handle.as_ptr()) };
        debug!(handle = handle.get(), "Closed adapter handle");
        Ok(())
    }

    fn adapter_luid(&self, handle: RawHandle) -> u64 {
        // SAFETY: signature matches `WintunGetAdapterLUID` in wintun.h.
        let get_luid = match unsafe { self.entry::<GetAdapterLuidFn>(symbol::GET_ADAPTER_LUID) } {
            Ok(f) => f,
            Err(e) => {
                warn!("Cannot query adapter LUID: {e}");
                return 0;
            }
        };

        let mut luid = 0u64;
        // SAFETY: the handle is live and `luid` is a valid NET_LUID-sized slot.
        unsafe { get_luid(handle.as_ptr(), &raw mut luid) };
        luid
    }

    fn delete_driver(&self) -> Result<(), DriverError> {
        // SAFETY: signature matches `WintunDeleteDriver` in wintun.h.
        let delete = unsafe { self.entry::<DeleteDriverFn>(symbol::DELETE_DRIVER)? };

        // SAFETY: takes no arguments.
        if unsafe { delete() } == 0 {
            return Err(DriverError::last_os_error(symbol::DELETE_DRIVER));
        }
        Ok(())
    }

    fn running_driver_version(&self) -> Result<DriverVersion, DriverError> {
        // SAFETY: signature matches `WintunGetRunningDriverVersion` in wintun.h.
        let get_version =
            unsafe { self.entry::<GetRunningDriverVersionFn>(symbol::GET_RUNNING_DRIVER_VERSION)? };

        // SAFETY: takes no arguments.
        match unsafe { get_version() } {
            0 => Err(DriverError::last_os_error(symbol::GET_RUNNING_DRIVER_VERSION)),
            raw => Ok(DriverVersion::from_raw(raw)),
        }
    }
}
