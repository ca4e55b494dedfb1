//! Handling of the memory reservation block
//!
//! Firmware marks physical memory ranges a kernel must not hand to its
//! allocator (its own data structures, the blob itself on some boards).
//! The block is a list of (address, size) pairs of big-endian 64-bit
//! values, terminated by an entry where both are zero.

use crate::fdt::swizzle::swizzle64;
use core::mem;
use thiserror_no_std::Error;

const ENTRY_SIZE: usize = 2 * mem::size_of::<u64>();

/// A single reserved region of physical memory
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MemoryReservation {
    /// Physical address where the reservation starts
    pub address: u64,
    /// Length of the reservation in bytes
    pub size: u64,
}

/// The memory reservation block does not have the required shape
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ReservationError {
    /// The block runs past the end of the blob without a zero terminator entry
    #[error("The memory reservation block is not terminated by a zero entry")]
    NoTerminator,
}

/// Iterator over the reserved regions listed in a blob.
///
/// Constructed by [`DeviceTree`](crate::fdt::DeviceTree); construction
/// validates that a terminator entry exists within the blob, so iteration
/// itself cannot fail.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MemoryReservations<'blob> {
    buf: &'blob [u8],
}

impl<'blob> MemoryReservations<'blob> {
    pub(crate) fn from_buffer(buf: &'blob [u8]) -> Result<Self, ReservationError> {
        // measure the block up front so that iteration stays infallible
        let mut entries = 0;
        loop {
            let offset = entries * ENTRY_SIZE;
            let entry = buf
                .get(offset..offset + ENTRY_SIZE)
                .ok_or(ReservationError::NoTerminator)?;
            if entry.iter().all(|b| *b == 0) {
                break;
            }
            entries += 1;
        }

        Ok(Self {
            buf: &buf[..entries * ENTRY_SIZE],
        })
    }
}

impl Iterator for MemoryReservations<'_> {
    type Item = MemoryReservation;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buf.is_empty() {
            return None;
        }

        let read_u64 = |bytes: &[u8]| swizzle64(u64::from_ne_bytes(bytes.try_into().unwrap()));
        let address = read_u64(&self.buf[..mem::size_of::<u64>()]);
        let size = read_u64(&self.buf[mem::size_of::<u64>()..ENTRY_SIZE]);
        self.buf = &self.buf[ENTRY_SIZE..];

        Some(MemoryReservation { address, size })
    }
}
