//! Decoding of property values
//!
//! Property values are opaque byte strings; their interpretation depends
//! on the property. The conversions here cover the encodings this crate's
//! consumers need: single big-endian integers, nul-terminated strings,
//! and flat sequences of 32-bit cells.

use crate::fdt::structure::property::Property;
use crate::fdt::swizzle::swizzle32;
use core::ffi::CStr;
use core::mem;
use thiserror_no_std::Error;

/// The raw property value has the wrong length for the requested type
#[derive(Debug, Error, Eq, PartialEq)]
#[error("The raw property value has an invalid length")]
pub struct InvalidValueLength;

/// Errors decoding a `<string>` encoded property value
#[derive(Debug, Error, Eq, PartialEq)]
pub enum StringValueError {
    #[error("The raw property value is not nul-terminated")]
    NoNulTerminator,
    #[error("The raw property value is not valid UTF-8")]
    Utf8Error,
}

impl TryFrom<&Property<'_>> for u32 {
    type Error = InvalidValueLength;

    fn try_from(prop: &Property<'_>) -> Result<Self, Self::Error> {
        let bytes = prop.value.try_into().map_err(|_| InvalidValueLength)?;
        Ok(u32::from_be_bytes(bytes))
    }
}

impl TryFrom<&Property<'_>> for u64 {
    type Error = InvalidValueLength;

    fn try_from(prop: &Property<'_>) -> Result<Self, Self::Error> {
        let bytes = prop.value.try_into().map_err(|_| InvalidValueLength)?;
        Ok(u64::from_be_bytes(bytes))
    }
}

impl<'blob> TryFrom<&Property<'blob>> for &'blob str {
    type Error = StringValueError;

    fn try_from(prop: &Property<'blob>) -> Result<Self, Self::Error> {
        let cstr = CStr::from_bytes_with_nul(prop.value)
            .map_err(|_| StringValueError::NoNulTerminator)?;
        cstr.to_str().map_err(|_| StringValueError::Utf8Error)
    }
}

/// An iterator over the 32-bit cells of a property value.
///
/// Multi-cell quantities (addresses, sizes) store their most significant
/// cell first; composing two cells as `(hi << 32) | lo` therefore yields
/// the encoded 64-bit value. Trailing bytes that do not fill a whole cell
/// are ignored.
#[derive(Debug, Clone)]
pub struct Cells<'blob> {
    buf: &'blob [u8],
}

impl<'blob> Property<'blob> {
    /// View the value as a sequence of 32-bit cells
    pub fn cells(&self) -> Cells<'blob> {
        Cells { buf: self.value }
    }
}

impl Iterator for Cells<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        let cell = self.buf.get(..mem::size_of::<u32>())?;
        let cell = swizzle32(u32::from_ne_bytes(cell.try_into().unwrap()));
        self.buf = &self.buf[mem::size_of::<u32>()..];
        Some(cell)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn u32_decoding_checks_the_length() {
        let prop = Property {
            name: "cell",
            value: &[0x12, 0x34, 0x56, 0x78],
        };
        assert_eq!(u32::try_from(&prop), Ok(0x12345678));

        let short = Property {
            name: "cell",
            value: &[1, 2],
        };
        assert_eq!(u32::try_from(&short), Err(InvalidValueLength));
    }

    #[test]
    fn u64_decoding_checks_the_length() {
        let prop = Property {
            name: "wide",
            value: &0x4000_0000u64.to_be_bytes(),
        };
        assert_eq!(u64::try_from(&prop), Ok(0x4000_0000));
        assert_eq!(u32::try_from(&prop), Err(InvalidValueLength));
    }

    #[test]
    fn string_decoding_requires_a_nul_terminator() {
        let prop = Property {
            name: "device_type",
            value: b"memory\0",
        };
        assert_eq!(<&str>::try_from(&prop), Ok("memory"));

        let bad = Property {
            name: "device_type",
            value: b"memory",
        };
        assert_eq!(<&str>::try_from(&bad), Err(StringValueError::NoNulTerminator));
    }

    #[test]
    fn cells_iterate_most_significant_first() {
        let mut value = [0u8; 16];
        value[0..8].copy_from_slice(&0x4000_0000u64.to_be_bytes());
        value[8..16].copy_from_slice(&0x2000_0000u64.to_be_bytes());
        let prop = Property {
            name: "reg",
            value: &value,
        };

        let mut cells = prop.cells();
        assert_eq!(cells.next(), Some(0x0));
        assert_eq!(cells.next(), Some(0x4000_0000));
        assert_eq!(cells.next(), Some(0x0));
        assert_eq!(cells.next(), Some(0x2000_0000));
        assert_eq!(cells.next(), None);
    }

    #[test]
    fn trailing_partial_cell_is_ignored() {
        let prop = Property {
            name: "reg",
            value: &[0, 0, 0, 1, 0xff],
        };
        assert_eq!(prop.cells().count(), 1);
    }
}
