//! Boot-time discovery of the installed physical memory layout
//!
//! Very early in boot, before any memory manager exists, the kernel needs
//! to know how much RAM the machine has and where it ends. Firmware
//! describes both through the device tree blob it leaves at a fixed,
//! platform-defined physical address. This crate maps that blob through
//! an injected platform hook, parses it with [`devtree`], and extracts
//! the memory geometry from the `memory` node's `reg` property.
//!
//! Memory geometry is required for everything that follows, so the
//! discovery entry point does not return an error: if the blob cannot be
//! parsed or lacks a memory description, the platform's halt hook is
//! invoked and boot ends there.
#![no_std]

use devtree::fdt::{DeviceTree, StructureError};
use thiserror_no_std::Error;

/// Physical address where firmware places the blob on QEMU's virt
/// machine, the boot convention this crate defaults to.
pub const DEFAULT_DTB_ADDR: u64 = 0x4000_0000;

/// Boot-convention parameters, injected rather than compiled in so the
/// discovery path can run against synthetic blobs in tests
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct BootConfig {
    /// Physical address of the device tree blob
    pub dtb_addr: u64,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            dtb_addr: DEFAULT_DTB_ADDR,
        }
    }
}

/// Platform services the discovery path depends on.
///
/// At this boot stage there is no scheduler and no allocator; both hooks
/// are expected to complete immediately.
pub trait BootHooks {
    /// Make a physical address accessible and return a pointer to it
    fn map_physical(&self, addr: u64) -> *const u8;

    /// Stop the boot entirely. Must not return.
    fn halt(&self, reason: &str) -> !;
}

/// Why memory geometry could not be read from a parsed device tree
#[derive(Debug, Error, Eq, PartialEq)]
pub enum GeometryError {
    /// No node whose name starts with `memory` exists in the tree
    #[error("The device tree does not describe a memory node")]
    NoMemoryNode,
    /// The memory node carries no `reg` property
    #[error("The memory node has no reg property")]
    NoRegProperty,
    /// The `reg` value is shorter than 2 address cells plus 2 size cells
    #[error("The reg property is too short for 2 address and 2 size cells")]
    ShortRegProperty,
    /// base + size does not fit in a physical address
    #[error("The memory region wraps past the end of the address space")]
    AddressOverflow,
    /// The structure block is damaged
    #[error("The device tree is malformed: {0}")]
    Malformed(#[from] StructureError),
}

/// The installed physical memory layout
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct MemoryGeometry {
    /// Total installed memory in bytes
    pub size: u64,
    /// Highest physical address implied by the memory region, i.e. the
    /// region's base plus its size
    pub phys_limit: u64,
}

/// Read the memory geometry out of a parsed device tree.
///
/// The memory node is matched by name prefix because its unit name
/// carries the base address (e.g. `memory@40000000`). The `reg` value is
/// decoded under the fixed convention of 2 address cells followed by
/// 2 size cells, most significant cell first. `#address-cells` and
/// `#size-cells` declarations are not consulted; a tree using different
/// widths will be misread, which is a known limitation of this stage.
pub fn memory_geometry(dt: &DeviceTree<'_>) -> Result<MemoryGeometry, GeometryError> {
    log::trace!("searching for memory node in device tree");
    let node = dt
        .find_node_prefix("memory")?
        .ok_or(GeometryError::NoMemoryNode)?;
    log::trace!("found memory node {}", node.name);

    let reg = node
        .find_property("reg")?
        .ok_or(GeometryError::NoRegProperty)?;

    let mut cells = reg.cells();
    let mut cell = || {
        cells
            .next()
            .map(u64::from)
            .ok_or(GeometryError::ShortRegProperty)
    };
    let base = cell()? << 32 | cell()?;
    let size = cell()? << 32 | cell()?;

    let phys_limit = base
        .checked_add(size)
        .ok_or(GeometryError::AddressOverflow)?;
    log::trace!("memory base = {base:#x} size = {size:#x} limit = {phys_limit:#x}");

    Ok(MemoryGeometry { size, phys_limit })
}

/// Map the blob from its boot-convention address and determine the
/// memory geometry, halting the boot on any failure.
pub fn discover<H: BootHooks>(config: &BootConfig, hooks: &H) -> MemoryGeometry {
    let ptr = hooks.map_physical(config.dtb_addr);

    // Safety: the platform hook promises this is where firmware placed
    // the blob, and the mapping outlives this function.
    let dt = match unsafe { DeviceTree::from_ptr(ptr) } {
        Ok(dt) => dt,
        Err(err) => {
            log::error!("cannot parse device tree blob at {:#x}: {}", config.dtb_addr, err);
            hooks.halt("invalid device tree blob");
        }
    };

    for reservation in dt.memory_reservations() {
        log::debug!(
            "firmware reserved memory at {:#x} len={:#x}",
            reservation.address,
            reservation.size
        );
    }

    match memory_geometry(&dt) {
        Ok(geometry) => geometry,
        Err(err) => {
            log::error!("cannot determine memory geometry: {}", err);
            hooks.halt("no usable memory description in the device tree");
        }
    }
}
