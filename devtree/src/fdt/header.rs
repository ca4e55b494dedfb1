use core::mem;
use static_assertions::const_assert_eq;
use thiserror_no_std::Error;

pub(crate) const HEADER_MAGIC: u32 = 0xd00dfeed;

/// Version 17 producers declare backwards compatibility with version 16.
const SUPPORTED_LAST_COMP_VERSION: u32 = 16;

/// Size in bytes of the on-wire header: ten big-endian 32-bit fields.
pub(crate) const HEADER_SIZE: usize = 10 * mem::size_of::<u32>();
const_assert_eq!(HEADER_SIZE, 40);

/// Errors that can occur when reading the header at the start of a blob
#[derive(Debug, Error, Eq, PartialEq)]
pub enum HeaderError {
    /// The buffer does not start with the DTB magic value
    #[error("The buffer does not start with the DTB magic value (got {0:#010x})")]
    BadMagic(u32),
    /// The buffer is smaller than the fixed header
    #[error("The buffer is too small to hold a DTB header")]
    BufferTooSmall,
    /// The blob declares a version this library does not understand
    #[error("The blob is encoded as version {0} (last compatible version {1}) which is not supported")]
    UnsupportedVersion(u32, u32),
    /// The blob is not placed on an 8-byte boundary as the format requires
    #[error("The blob is not aligned to an 8-byte boundary")]
    Misaligned,
}

/// The fixed-layout header at the start of every device tree blob,
/// decoded into host byte order.
///
/// The struct and strings offsets locate the two blocks this crate walks;
/// the remaining fields are carried for completeness and validation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FdtHeader {
    /// Always `0xd00dfeed` in a valid blob
    pub magic: u32,
    /// Total size in bytes of the blob, all blocks and padding included
    pub totalsize: u32,
    /// Offset in bytes from the blob start to the structure block
    pub off_dt_struct: u32,
    /// Offset in bytes from the blob start to the strings block
    pub off_dt_strings: u32,
    /// Offset in bytes from the blob start to the memory reservation block
    pub off_mem_rsvmap: u32,
    /// Format version, 17 for blobs this library targets
    pub version: u32,
    /// Lowest format version the blob is backwards compatible with
    pub last_comp_version: u32,
    /// Physical ID of the boot CPU
    pub boot_cpuid_phys: u32,
    /// Length in bytes of the strings block
    pub size_dt_strings: u32,
    /// Length in bytes of the structure block
    pub size_dt_struct: u32,
}

impl FdtHeader {
    /// Try to read and validate a header from the start of a buffer
    pub fn from_buffer(buf: &[u8]) -> Result<Self, HeaderError> {
        if buf.len() < HEADER_SIZE {
            return Err(HeaderError::BufferTooSmall);
        }

        let mut words = buf[..HEADER_SIZE]
            .chunks_exact(mem::size_of::<u32>())
            .map(|word| u32::from_be_bytes(word.try_into().unwrap()));
        let mut next = || words.next().unwrap();

        let header = Self {
            magic: next(),
            totalsize: next(),
            off_dt_struct: next(),
            off_dt_strings: next(),
            off_mem_rsvmap: next(),
            version: next(),
            last_comp_version: next(),
            boot_cpuid_phys: next(),
            size_dt_strings: next(),
            size_dt_struct: next(),
        };
        header.validate()
    }

    /// Try to read a header from a raw memory location
    ///
    /// # Safety
    /// The pointer must be valid and the backing memory readable for at
    /// least 40 bytes after it.
    pub unsafe fn from_ptr(ptr: *const u8) -> Result<Self, HeaderError> {
        if ptr as usize % 8 != 0 {
            return Err(HeaderError::Misaligned);
        }
        let buf = core::slice::from_raw_parts(ptr, HEADER_SIZE);
        Self::from_buffer(buf)
    }

    fn validate(self) -> Result<Self, HeaderError> {
        if self.magic != HEADER_MAGIC {
            Err(HeaderError::BadMagic(self.magic))
        } else if self.last_comp_version != SUPPORTED_LAST_COMP_VERSION {
            Err(HeaderError::UnsupportedVersion(
                self.version,
                self.last_comp_version,
            ))
        } else {
            Ok(self)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[repr(C, align(8))]
    struct AlignedBuffer<const LENGTH: usize>(pub [u8; LENGTH]);

    fn valid_header_bytes() -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&HEADER_MAGIC.to_be_bytes());
        buf[4..8].copy_from_slice(&(HEADER_SIZE as u32).to_be_bytes()); // totalsize
        buf[20..24].copy_from_slice(&17u32.to_be_bytes()); // version
        buf[24..28].copy_from_slice(&16u32.to_be_bytes()); // last compatible version
        buf
    }

    #[test]
    fn fails_if_buffer_too_small() {
        assert_eq!(
            FdtHeader::from_buffer(&[0u8; 7]),
            Err(HeaderError::BufferTooSmall)
        );
    }

    #[test]
    fn fails_with_bad_magic() {
        let mut buf = valid_header_bytes();
        buf[0] = 0xff;
        assert_eq!(
            FdtHeader::from_buffer(&buf),
            Err(HeaderError::BadMagic(0xff0dfeed))
        );
    }

    #[test]
    fn fails_with_unsupported_version() {
        let mut buf = valid_header_bytes();
        buf[24..28].copy_from_slice(&2u32.to_be_bytes());
        assert_eq!(
            FdtHeader::from_buffer(&buf),
            Err(HeaderError::UnsupportedVersion(17, 2))
        );
    }

    #[test]
    fn reads_all_fields() {
        let mut buf = valid_header_bytes();
        buf[8..12].copy_from_slice(&72u32.to_be_bytes()); // off_dt_struct
        buf[12..16].copy_from_slice(&120u32.to_be_bytes()); // off_dt_strings
        buf[16..20].copy_from_slice(&40u32.to_be_bytes()); // off_mem_rsvmap

        let header = FdtHeader::from_buffer(&buf).unwrap();
        assert_eq!(header.magic, HEADER_MAGIC);
        assert_eq!(header.off_dt_struct, 72);
        assert_eq!(header.off_dt_strings, 120);
        assert_eq!(header.off_mem_rsvmap, 40);
        assert_eq!(header.version, 17);
        assert_eq!(header.last_comp_version, 16);
    }

    #[test]
    fn from_ptr_rejects_misaligned_blobs() {
        let buf = AlignedBuffer([0u8; HEADER_SIZE + 1]);
        let ptr = unsafe { buf.0.as_ptr().add(1) };
        assert_eq!(
            unsafe { FdtHeader::from_ptr(ptr) },
            Err(HeaderError::Misaligned)
        );
    }

    #[test]
    fn from_ptr_reads_an_aligned_header() {
        let mut buf = AlignedBuffer([0u8; HEADER_SIZE]);
        buf.0.copy_from_slice(&valid_header_bytes());

        let header = unsafe { FdtHeader::from_ptr(buf.0.as_ptr()) }.unwrap();
        assert_eq!(header.magic, HEADER_MAGIC);
        assert_eq!(header.version, 17);
    }
}
