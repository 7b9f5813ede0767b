//! Locally unique interface identifiers.

use std::fmt;

/// The 64-bit locally unique identifier Windows assigns to an interface.
///
/// Layout (`NET_LUID_LH`): bits 0-23 reserved, bits 24-47 the per-type
/// index, bits 48-63 the interface type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Luid(u64);

impl Luid {
    /// Wraps a raw LUID value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns true if the driver reported no LUID.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns the `IF_TYPE_*` interface type.
    #[must_use]
    pub const fn if_type(self) -> u16 {
        (self.0 >> 48) as u16
    }

    /// Returns the per-type interface index.
    #[must_use]
    pub const fn net_luid_index(self) -> u32 {
        ((self.0 >> 24) & 0x00FF_FFFF) as u32
    }
}

impl fmt::Display for Luid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(windows)]
mod windows_ext {
    use windows::Win32::Foundation::NO_ERROR;
    use windows::Win32::NetworkManagement::IpHelper::{
        ConvertInterfaceLuidToAlias, ConvertInterfaceLuidToIndex,
    };
    use windows::Win32::NetworkManagement::Ndis::{IF_MAX_STRING_SIZE, NET_LUID_LH};
    use windows::core::PCWSTR;

    use super::Luid;
    use crate::driver::DriverError;

    impl Luid {
        const fn as_net_luid(self) -> NET_LUID_LH {
            NET_LUID_LH { Value: self.0 }
        }

        /// Returns the interface index used by the routing APIs.
        ///
        /// # Errors
        ///
        /// Returns [`DriverError::WindowsApi`] if no interface has this LUID.
        pub fn interface_index(self) -> Result<u32, DriverError> {
            let luid = self.as_net_luid();
            let mut index = 0u32;

            // SAFETY: both pointers are valid for the duration of the call.
            let result = unsafe { ConvertInterfaceLuidToIndex(&raw const luid, &raw mut index) };
            if result != NO_ERROR {
                return Err(windows::core::Error::from(result).into());
            }

            Ok(index)
        }

        /// Returns the interface alias (the name shown in network settings).
        ///
        /// # Errors
        ///
        /// Returns [`DriverError::WindowsApi`] if no interface has this LUID.
        pub fn alias(self) -> Result<String, DriverError> {
            let luid = self.as_net_luid();
            let mut buf = [0u16; IF_MAX_STRING_SIZE as usize + 1];

            // SAFETY: `luid` is valid and `buf` is sized per the API contract.
            let result = unsafe { ConvertInterfaceLuidToAlias(&raw const luid, &mut buf) };
            if result != NO_ERROR {
                return Err(windows::core::Error::from(result).into());
            }

            // SAFETY: the API NUL-terminates the alias within `buf`.
            let alias = unsafe { PCWSTR::from_raw(buf.as_ptr()).as_wide() };
            Ok(String::from_utf16_lossy(alias))
        }
    }
}
