//! Name-derived adapter GUIDs.
//!
//! Passing the same [`Guid`] to adapter creation every time makes Windows
//! reuse the same network location (NLA) profile for the adapter, instead of
//! minting a fresh "Network 2", "Network 3", ... on each run.

use std::fmt;
use std::str::FromStr;

use sha1::{Digest, Sha1};
use thiserror::Error;

/// Version marker placed in the top nibble of `data3`.
const NAME_BASED_VERSION: u16 = 5;

/// A 128-bit identifier with the native `GUID` field layout.
///
/// The struct is `repr(C)` so a pointer to it can be handed directly to
/// driver entry points expecting `const GUID *`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guid {
    /// First 4 bytes, little-endian.
    pub data1: u32,
    /// Next 2 bytes, little-endian.
    pub data2: u16,
    /// Next 2 bytes, little-endian. Top nibble holds the version.
    pub data3: u16,
    /// Last 8 bytes, raw. Top bits of `data4[0]` hold the variant.
    pub data4: [u8; 8],
}

impl Guid {
    /// Derives a stable version-5-style GUID from `name`.
    ///
    /// The first 16 bytes of the SHA-1 digest of the name's UTF-8 bytes are
    /// laid out as a GUID, then the version and variant bits are forced.
    /// The same name always yields the same GUID.
    ///
    /// # Example
    ///
    /// ```
    /// use wintun_ctl::guid::Guid;
    ///
    /// let a = Guid::from_name("Office VPN");
    /// let b = Guid::from_name("Office VPN");
    /// assert_eq!(a, b);
    /// assert_eq!(a.version(), 5);
    /// assert!(a.is_rfc4122_variant());
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let hash = Sha1::digest(name.as_bytes());

        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&hash[8..16]);

        let mut guid = Self {
            data1: u32::from_le_bytes([hash[0], hash[1], hash[2], hash[3]]),
            data2: u16::from_le_bytes([hash[4], hash[5]]),
            data3: u16::from_le_bytes([hash[6], hash[7]]),
            data4,
        };

        guid.data3 = (guid.data3 & 0x0FFF) | (NAME_BASED_VERSION << 12);
        guid.data4[0] = (guid.data4[0] & 0x3F) | 0x80;

        guid
    }

    /// Returns the version nibble.
    #[must_use]
    pub const fn version(&self) -> u8 {
        (self.data3 >> 12) as u8
    }

    /// Returns true if the variant bits are `10` (RFC 4122).
    #[must_use]
    pub const fn is_rfc4122_variant(&self) -> bool {
        self.data4[0] & 0xC0 == 0x80
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}}}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7],
        )
    }
}

/// Error returned when a GUID string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid GUID '{value}': expected XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX")]
pub struct ParseGuidError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for Guid {
    type Err = ParseGuidError;

    /// Parses the registry form, with or without surrounding braces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseGuidError {
            value: s.to_string(),
        };

        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(trimmed);

        let groups: Vec<&str> = body.split('-').collect();
        let lengths = [8, 4, 4, 4, 12];
        if groups.len() != lengths.len()
            || groups
                .iter()
                .zip(lengths)
                .any(|(g, len)| g.len() != len || !g.bytes().all(|b| b.is_ascii_hexdigit()))
        {
            return Err(err());
        }

        let data1 = u32::from_str_radix(groups[0], 16).map_err(|_| err())?;
        let data2 = u16::from_str_radix(groups[1], 16).map_err(|_| err())?;
        let data3 = u16::from_str_radix(groups[2], 16).map_err(|_| err())?;

        let tail = format!("{}{}", groups[3], groups[4]);
        let mut data4 = [0u8; 8];
        for (i, byte) in data4.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&tail[i * 2..i * 2 + 2], 16).map_err(|_| err())?;
        }

        Ok(Self {
            data1,
            data2,
            data3,
            data4,
        })
    }
}

#[cfg(windows)]
impl From<Guid> for windows::core::GUID {
    fn from(guid: Guid) -> Self {
        Self {
            data1: guid.data1,
            data2: guid.data2,
            data3: guid.data3,
            data4: guid.data4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod from_name {
        use super::*;

        #[test]
        fn same_name_same_guid() {
            assert_eq!(Guid::from_name("TestAdapter"), Guid::from_name("TestAdapter"));
        }

        #[test]
        fn different_names_differ() {
            assert_ne!(Guid::from_name("TestAdapter"), Guid::from_name("TestAdapter2"));
            assert_ne!(Guid::from_name("a"), Guid::from_name("A"));
        }

        #[test]
        fn matches_known_sha1_layout() {
            // SHA-1("TestAdapter") = ffc6d179 9bca e14a 2ddec680d4c9ccc4 ...
            let guid = Guid::from_name("TestAdapter");

            assert_eq!(guid.data1, 0x79D1_C6FF);
            assert_eq!(guid.data2, 0xCA9B);
            assert_eq!(guid.data3, 0x5AE1);
            assert_eq!(guid.data4, [0xAD, 0xDE, 0xC6, 0x80, 0xD4, 0xC9, 0xCC, 0xC4]);
        }

        #[test]
        fn empty_name_is_valid_input() {
            let guid = Guid::from_name("");
            assert_eq!(guid.to_string(), "{EEA339DA-6B5E-5D4B-B255-BFEF95601890}");
        }

        #[test]
        fn version_and_variant_fixed_for_any_input() {
            let names = (0..512).map(|i| format!("adapter-{i}"));
            for name in names.chain(["", "Wintun", "日本語", "\0"].map(String::from)) {
                let guid = Guid::from_name(&name);
                assert_eq!(guid.version(), 5, "version for {name:?}");
                assert!(guid.is_rfc4122_variant(), "variant for {name:?}");
            }
        }
    }

    mod formatting {
        use super::*;

        #[test]
        fn display_uses_registry_form() {
            assert_eq!(
                Guid::from_name("Wintun").to_string(),
                "{CD902A80-9517-5BE6-BB11-D47C983FA66E}"
            );
        }

        #[test]
        fn parse_accepts_display_output() {
            let guid = Guid::from_name("TestAdapter");
            let parsed: Guid = guid.to_string().parse().unwrap();
            assert_eq!(parsed, guid);
        }

        #[test]
        fn parse_accepts_unbraced_lowercase() {
            let parsed: Guid = "cd902a80-9517-5be6-bb11-d47c983fa66e".parse().unwrap();
            assert_eq!(parsed, Guid::from_name("Wintun"));
        }

        #[test]
        fn parse_rejects_malformed() {
            for bad in [
                "",
                "{}",
                "CD902A80-9517-5BE6-BB11",
                "CD902A80-9517-5BE6-BB11-D47C983FA66",
                "CD902A80-9517-5BE6-BB11-D47C983FA66EE",
                "GD902A80-9517-5BE6-BB11-D47C983FA66E",
                "{CD902A80-9517-5BE6-BB11-D47C983FA66E",
                "+D902A80-9517-5BE6-BB11-D47C983FA66E",
            ] {
                let err = bad.parse::<Guid>().unwrap_err();
                assert_eq!(err.value, bad);
            }
        }
    }
}
