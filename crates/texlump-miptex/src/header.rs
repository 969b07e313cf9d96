//! On-disk miptex header.

use zerocopy::byteorder::{LittleEndian, I32, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::{MIP_LEVELS, NAME_FIELD_LEN};

/// Size of [`RawMiptexHeader`] in bytes.
pub const HEADER_SIZE: usize = std::mem::size_of::<RawMiptexHeader>();

/// Miptex record header as stored in the lump.
///
/// All multi-byte fields are little-endian regardless of host.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct RawMiptexHeader {
    /// NUL-terminated texture name.
    pub name: [u8; NAME_FIELD_LEN],
    /// Width of mip level 0.
    pub width: U32<LittleEndian>,
    /// Height of mip level 0.
    pub height: U32<LittleEndian>,
    /// Offset of each mip level from the start of the record, or -1.
    pub offsets: [I32<LittleEndian>; MIP_LEVELS],
}

impl RawMiptexHeader {
    /// Sentinel stored in `offsets` for an absent mip level.
    pub const ABSENT_OFFSET: i32 = -1;

    /// Offset of `level` as a host integer, `None` when absent.
    pub fn mip_offset(&self, level: usize) -> Option<i32> {
        let offset = self.offsets.get(level)?.get();
        (offset >= 0).then_some(offset)
    }
}
