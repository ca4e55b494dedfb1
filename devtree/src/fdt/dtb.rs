//! Handling of the blob as a whole

use crate::fdt::header::{FdtHeader, HeaderError};
use crate::fdt::reservations::{MemoryReservations, ReservationError};
use crate::fdt::strings::Strings;
use crate::fdt::structure::walk::{self, NameMatch, Node};
use crate::fdt::structure::StructureError;
use thiserror_no_std::Error;

/// The error that can occur when slicing a blob into its blocks
#[derive(Debug, Error, Eq, PartialEq)]
pub enum DtbError {
    /// The blob header could not be parsed
    #[error("Could not parse the blob header: {0}")]
    Header(#[from] HeaderError),
    /// The buffer is smaller than the total size the header declares
    #[error("The buffer is smaller than the total size the blob header declares")]
    NotEnoughData,
    /// A block offset or size in the header points outside the blob
    #[error("The {0} block lies outside the blob")]
    BlockOutOfRange(&'static str),
    /// The memory reservation block could not be parsed
    #[error("Could not parse the memory reservation block: {0}")]
    Reservations(#[from] ReservationError),
}

/// A device tree blob sliced into its blocks and ready to be searched.
///
/// Everything borrows the underlying buffer: handles returned from
/// searches become invalid when the mapping holding the blob goes away.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeviceTree<'blob> {
    /// The decoded blob header
    pub header: FdtHeader,
    struct_buf: &'blob [u8],
    strings: Strings<'blob>,
    reservations: MemoryReservations<'blob>,
}

impl<'blob> DeviceTree<'blob> {
    /// Try to parse a device tree blob from a buffer
    pub fn from_buffer(buf: &'blob [u8]) -> Result<Self, DtbError> {
        let header = FdtHeader::from_buffer(buf)?;
        let blob = buf
            .get(..header.totalsize as usize)
            .ok_or(DtbError::NotEnoughData)?;

        let struct_buf = block(blob, header.off_dt_struct, Some(header.size_dt_struct))
            .ok_or(DtbError::BlockOutOfRange("structure"))?;
        let strings_buf = block(blob, header.off_dt_strings, Some(header.size_dt_strings))
            .ok_or(DtbError::BlockOutOfRange("strings"))?;
        let rsv_buf = block(blob, header.off_mem_rsvmap, None)
            .ok_or(DtbError::BlockOutOfRange("memory reservation"))?;

        Ok(Self {
            header,
            struct_buf,
            strings: Strings::from_buffer(strings_buf),
            reservations: MemoryReservations::from_buffer(rsv_buf)?,
        })
    }

    /// Try to parse a device tree blob from a raw memory location, e.g.
    /// the mapped physical address where firmware placed it.
    ///
    /// # Safety
    /// The pointer must be valid and the backing memory must stay
    /// readable and unchanged for the lifetime of the returned value, for
    /// at least as many bytes as the blob header declares.
    pub unsafe fn from_ptr(ptr: *const u8) -> Result<Self, DtbError> {
        let header = FdtHeader::from_ptr(ptr)?;
        let buf = core::slice::from_raw_parts(ptr, header.totalsize as usize);
        Self::from_buffer(buf)
    }

    /// Find the first node whose name equals `name`, depth-first in
    /// pre-order over the whole tree.
    ///
    /// Node names include their unit address, so `memory` will not match
    /// a node named `memory@40000000`; see [`find_node_prefix`](Self::find_node_prefix)
    /// for that.
    pub fn find_node(&self, name: &str) -> Result<Option<Node<'blob>>, StructureError> {
        walk::find_node(self.struct_buf, self.strings, name, NameMatch::Exact)
    }

    /// Find the first node whose name starts with `prefix`, depth-first
    /// in pre-order over the whole tree.
    pub fn find_node_prefix(&self, prefix: &str) -> Result<Option<Node<'blob>>, StructureError> {
        walk::find_node(self.struct_buf, self.strings, prefix, NameMatch::Prefix)
    }

    /// The physical memory regions firmware declared as reserved
    pub fn memory_reservations(&self) -> MemoryReservations<'blob> {
        self.reservations.clone()
    }

    /// Log the whole tree at debug level, one line per node and property
    pub fn dump(&self) -> Result<(), StructureError> {
        walk::dump_tree(self.struct_buf, self.strings)
    }
}

fn block(blob: &[u8], offset: u32, size: Option<u32>) -> Option<&[u8]> {
    let start = offset as usize;
    match size {
        Some(size) => blob.get(start..start.checked_add(size as usize)?),
        None => blob.get(start..),
    }
}
