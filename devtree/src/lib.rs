//! Library for reading the [Flattened Device Tree](https://devicetree-specification.readthedocs.io/en/latest/chapter5-flattened-format.html)
//! blob that firmware hands to a kernel at boot.
//!
//! The blob is parsed in place: no allocator is required and every handle
//! returned by this crate borrows the underlying buffer. All multi-byte
//! values on the wire are big-endian.
//!
//! # Example
//!
//! ```rust
//! # use align_data::{include_aligned, Align64};
//! # use devtree::fdt::DeviceTree;
//! # static DTB: &[u8] = include_aligned!(Align64, "../test/data/sample.dtb");
//! let dt = DeviceTree::from_buffer(DTB).unwrap();
//! let memory = dt.find_node_prefix("memory").unwrap().unwrap();
//! assert_eq!(memory.name, "memory@40000000");
//! ```
#![no_std]

pub mod fdt;
