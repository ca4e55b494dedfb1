//! Byte-order normalization
//!
//! Every multi-byte value in a device tree blob is stored big-endian,
//! regardless of the host. Readers load raw words from the blob and pass
//! them through these functions to obtain host-order values.

/// Convert a 16-bit value from wire order (big-endian) to host order.
pub const fn swizzle16(v: u16) -> u16 {
    u16::from_be(v)
}

/// Convert a 32-bit value from wire order (big-endian) to host order.
pub const fn swizzle32(v: u32) -> u32 {
    u32::from_be(v)
}

/// Convert a 64-bit value from wire order (big-endian) to host order.
pub const fn swizzle64(v: u64) -> u64 {
    u64::from_be(v)
}
