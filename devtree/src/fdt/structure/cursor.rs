//! Bounds-checked access to the structure block token stream
//!
//! All raw reads go through [`Cursor`]. Every read checks the remaining
//! span first, so a damaged blob surfaces as [`StructureError::Truncated`]
//! instead of an out-of-bounds access.

use crate::fdt::structure::{StructureError, FDT_NOP};
use crate::fdt::swizzle::swizzle32;
use core::mem;

const TOKEN_SIZE: usize = mem::size_of::<u32>();

/// A position within the structure block.
///
/// Cursors are cheap to copy; node handles hold one pointing just past
/// the node's name, ready to scan its property list.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct Cursor<'blob> {
    buf: &'blob [u8],
    pos: usize,
}

impl<'blob> Cursor<'blob> {
    pub(crate) fn new(buf: &'blob [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Read the 32-bit big-endian word at the cursor and advance past it
    pub(crate) fn take_u32(&mut self) -> Result<u32, StructureError> {
        let end = self
            .pos
            .checked_add(TOKEN_SIZE)
            .ok_or(StructureError::Truncated)?;
        let word = self
            .buf
            .get(self.pos..end)
            .ok_or(StructureError::Truncated)?;
        self.pos = end;
        Ok(swizzle32(u32::from_ne_bytes(word.try_into().unwrap())))
    }

    /// Read the next token tag, skipping any number of NOP tokens.
    ///
    /// Returns the tag together with the offset it was found at.
    pub(crate) fn take_token(&mut self) -> Result<(usize, u32), StructureError> {
        loop {
            let offset = self.pos;
            let tag = self.take_u32()?;
            if tag != FDT_NOP {
                return Ok((offset, tag));
            }
        }
    }

    /// Read the nul-terminated name following a BEGIN_NODE token and
    /// advance past it and its padding, up to the next token boundary.
    pub(crate) fn take_name(&mut self) -> Result<&'blob str, StructureError> {
        let tail = self.buf.get(self.pos..).ok_or(StructureError::Truncated)?;
        let len = tail
            .iter()
            .position(|b| *b == 0)
            .ok_or(StructureError::Truncated)?;
        let name = core::str::from_utf8(&tail[..len]).map_err(|_| StructureError::InvalidName)?;
        self.pos += len + 1;
        self.align();
        Ok(name)
    }

    /// Read `len` raw value bytes and advance past them and their padding
    pub(crate) fn take_bytes(&mut self, len: usize) -> Result<&'blob [u8], StructureError> {
        let end = self.pos.checked_add(len).ok_or(StructureError::Truncated)?;
        let bytes = self.buf.get(self.pos..end).ok_or(StructureError::Truncated)?;
        self.pos = end;
        self.align();
        Ok(bytes)
    }

    /// Advance past `len` bytes and any padding without looking at them
    pub(crate) fn skip_bytes(&mut self, len: usize) -> Result<(), StructureError> {
        let end = self.pos.checked_add(len).ok_or(StructureError::Truncated)?;
        if end > self.buf.len() {
            return Err(StructureError::Truncated);
        }
        self.pos = end;
        self.align();
        Ok(())
    }

    fn align(&mut self) {
        self.pos = (self.pos + TOKEN_SIZE - 1) & !(TOKEN_SIZE - 1);
    }
}
