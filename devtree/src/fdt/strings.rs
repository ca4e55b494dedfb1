//! Handling of the *strings* block
//!
//! Property names are not stored inline in the structure block. Instead
//! each property carries a byte offset into this block, which holds
//! concatenated nul-terminated strings.

use core::ffi::CStr;
use thiserror_no_std::Error;

/// Errors that can occur when resolving a string offset
#[derive(Debug, Error, Eq, PartialEq)]
pub enum StringsError {
    /// The offset lies outside the strings block
    #[error("No string could be found at offset {0} in a strings block of size {1}")]
    OutOfBounds(usize, usize),
    /// There was data at the offset but no nul terminator before the block ended
    #[error("The string at offset {0} is not nul-terminated")]
    Unterminated(usize),
}

/// A view of the strings block, resolving byte offsets to property names
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Strings<'blob> {
    buf: &'blob [u8],
}

impl<'blob> Strings<'blob> {
    pub(crate) fn from_buffer(buf: &'blob [u8]) -> Self {
        Self { buf }
    }

    /// Resolve the string starting at `offset` into the block
    pub fn get(&self, offset: usize) -> Result<&'blob CStr, StringsError> {
        let tail = self
            .buf
            .get(offset..)
            .ok_or(StringsError::OutOfBounds(offset, self.buf.len()))?;
        CStr::from_bytes_until_nul(tail).map_err(|_| StringsError::Unterminated(offset))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn resolves_offsets_into_the_block() {
        let strings = Strings::from_buffer(b"compatible\0reg\0");
        assert_eq!(strings.get(0).unwrap().to_str(), Ok("compatible"));
        assert_eq!(strings.get(11).unwrap().to_str(), Ok("reg"));
        // offsets may point into the middle of a stored string
        assert_eq!(strings.get(12).unwrap().to_str(), Ok("eg"));
    }

    #[test]
    fn rejects_offsets_past_the_block() {
        let strings = Strings::from_buffer(b"reg\0");
        assert_eq!(strings.get(17), Err(StringsError::OutOfBounds(17, 4)));
    }

    #[test]
    fn rejects_unterminated_data() {
        let strings = Strings::from_buffer(b"reg\0cpus");
        assert_eq!(strings.get(4), Err(StringsError::Unterminated(4)));
    }
}
