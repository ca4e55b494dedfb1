//! Flattened Device Tree (DTB) handling
//!
//! A device tree blob is a single, linear, pointerless encoding of the
//! hardware description tree. It starts with a small fixed-size header
//! (see [Spec Section 5.2](https://devicetree-specification.readthedocs.io/en/latest/chapter5-flattened-format.html#header))
//! followed by three variable sized sections:
//!
//! - the memory reservation block (see [Spec Section 5.3](https://devicetree-specification.readthedocs.io/en/latest/chapter5-flattened-format.html#sect-fdt-memory-reservation-block)),
//! - the structure block (see [Spec Section 5.4](https://devicetree-specification.readthedocs.io/en/latest/chapter5-flattened-format.html#sect-fdt-structure-block)),
//! - and the strings block (see [Spec Section 5.5](https://devicetree-specification.readthedocs.io/en/latest/chapter5-flattened-format.html#sect-fdt-strings-block)).
//!
//! The structure block is a stream of 4-byte aligned, big-endian tokens
//! describing nodes and their properties. [`DeviceTree`] slices the blob
//! into these blocks and offers depth-first search over the token stream.

mod dtb;
mod header;
mod reservations;
mod strings;
mod structure;
pub mod swizzle;

pub use dtb::{DeviceTree, DtbError};
pub use header::{FdtHeader, HeaderError};
pub use reservations::{MemoryReservation, MemoryReservations, ReservationError};
pub use strings::{Strings, StringsError};
pub use structure::property::Property;
pub use structure::value::{Cells, InvalidValueLength, StringValueError};
pub use structure::walk::{Node, MAX_NODE_DEPTH};
pub use structure::StructureError;
