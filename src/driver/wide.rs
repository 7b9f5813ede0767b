//! UTF-16 string marshaling for driver entry points.

use super::DriverError;

/// Encodes `value` as a NUL-terminated UTF-16 buffer.
///
/// # Errors
///
/// Returns [`DriverError::InteriorNul`] if `value` contains a NUL character,
/// which would silently truncate the string on the native side.
pub fn to_wide(value: &str) -> Result<Vec<u16>, DriverError> {
    if value.contains('\0') {
        return Err(DriverError::InteriorNul {
            value: value.to_string(),
        });
    }

    Ok(value.encode_utf16().chain(std::iter::once(0)).collect())
}

/// Decodes a NUL-terminated UTF-16 string, replacing invalid sequences.
///
/// A null pointer decodes to an empty string.
///
/// # Safety
///
/// `ptr` must be null or point to a readable, NUL-terminated UTF-16 buffer.
#[cfg(windows)]
pub unsafe fn from_wide_ptr(ptr: *const u16) -> String {
    let wide = windows::core::PCWSTR::from_raw(ptr);
    if wide.is_null() {
        return String::new();
    }

    // SAFETY: the caller guarantees a NUL terminator within the buffer.
    String::from_utf16_lossy(unsafe { wide.as_wide() })
}

/// Decodes a NUL-terminated UTF-16 string, replacing invalid sequences.
///
/// A null pointer decodes to an empty string.
///
/// # Safety
///
/// `ptr` must be null or point to a readable, NUL-terminated UTF-16 buffer.
#[cfg(not(windows))]
pub unsafe fn from_wide_ptr(ptr: *const u16) -> String {
    if ptr.is_null() {
        return String::new();
    }

    let mut len = 0;
    // SAFETY: the caller guarantees a NUL terminator within the buffer.
    while unsafe { *ptr.add(len) } != 0 {
        len += 1;
    }

    // SAFETY: `len` units before the terminator were just read.
    let units = unsafe { std::slice::from_raw_parts(ptr, len) };
    String::from_utf16_lossy(units)
}
